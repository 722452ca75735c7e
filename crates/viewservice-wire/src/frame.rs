//! Length-prefixed framing.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{WireError, WireResult};

/// Leading bytes of every frame.
pub const FRAME_MAGIC: [u8; 4] = *b"VSVC";

/// Current protocol version.
pub const PROTOCOL_VERSION: u16 = 1;

/// Magic (4) + version (2) + payload length (4).
pub const FRAME_HEADER_SIZE: usize = 10;

/// Upper bound on a frame payload. Views are tiny; anything near this is
/// garbage or hostile.
pub const MAX_FRAME_SIZE: usize = 64 * 1024;

/// One framed message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub version: u16,
    pub payload: Bytes,
}

impl Frame {
    /// Creates a frame at the current protocol version.
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            payload: payload.into(),
        }
    }

    /// Appends the encoded frame to `buf`.
    pub fn encode(&self, buf: &mut BytesMut) -> WireResult<()> {
        if self.payload.len() > MAX_FRAME_SIZE {
            return Err(WireError::FrameTooLarge {
                size: self.payload.len(),
                max: MAX_FRAME_SIZE,
            });
        }

        buf.reserve(FRAME_HEADER_SIZE + self.payload.len());
        buf.put_slice(&FRAME_MAGIC);
        buf.put_u16(self.version);
        buf.put_u32(self.payload.len() as u32);
        buf.put_slice(&self.payload);
        Ok(())
    }

    /// Encodes the frame into a fresh buffer.
    pub fn encode_to_bytes(&self) -> WireResult<Bytes> {
        let mut buf = BytesMut::with_capacity(FRAME_HEADER_SIZE + self.payload.len());
        self.encode(&mut buf)?;
        Ok(buf.freeze())
    }

    /// Takes one complete frame off the front of `buf`.
    ///
    /// Returns `Ok(None)` and leaves `buf` untouched while the frame is
    /// incomplete. Header errors are reported as soon as the header is
    /// available, without waiting for the payload.
    pub fn decode(buf: &mut BytesMut) -> WireResult<Option<Self>> {
        if buf.len() < FRAME_HEADER_SIZE {
            return Ok(None);
        }

        let mut header = &buf[..FRAME_HEADER_SIZE];
        let mut magic = [0u8; 4];
        header.copy_to_slice(&mut magic);
        if magic != FRAME_MAGIC {
            return Err(WireError::InvalidMagic(magic));
        }
        let version = header.get_u16();
        let len = header.get_u32() as usize;
        if len > MAX_FRAME_SIZE {
            return Err(WireError::FrameTooLarge {
                size: len,
                max: MAX_FRAME_SIZE,
            });
        }

        if buf.len() < FRAME_HEADER_SIZE + len {
            return Ok(None);
        }

        buf.advance(FRAME_HEADER_SIZE);
        let payload = buf.split_to(len).freeze();
        Ok(Some(Self { version, payload }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_waits_for_complete_frame() {
        let encoded = Frame::new(vec![1u8, 2, 3, 4]).encode_to_bytes().unwrap();

        for cut in 0..encoded.len() {
            let mut partial = BytesMut::from(&encoded[..cut]);
            assert!(Frame::decode(&mut partial).unwrap().is_none());
            assert_eq!(partial.len(), cut);
        }
    }

    #[test]
    fn decode_consumes_one_frame_at_a_time() {
        let mut buf = BytesMut::new();
        Frame::new(vec![1u8]).encode(&mut buf).unwrap();
        Frame::new(vec![2u8, 2]).encode(&mut buf).unwrap();

        let first = Frame::decode(&mut buf).unwrap().unwrap();
        assert_eq!(&first.payload[..], &[1]);
        let second = Frame::decode(&mut buf).unwrap().unwrap();
        assert_eq!(&second.payload[..], &[2, 2]);
        assert!(buf.is_empty());
        assert!(Frame::decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn bad_magic_is_rejected() {
        let mut buf = BytesMut::from(&b"HTTP/1.1 200"[..]);
        assert!(matches!(
            Frame::decode(&mut buf),
            Err(WireError::InvalidMagic(m)) if &m == b"HTTP"
        ));
    }

    #[test]
    fn oversized_length_is_rejected_from_header_alone() {
        let mut buf = BytesMut::new();
        buf.put_slice(&FRAME_MAGIC);
        buf.put_u16(PROTOCOL_VERSION);
        buf.put_u32((MAX_FRAME_SIZE + 1) as u32);

        assert!(matches!(
            Frame::decode(&mut buf),
            Err(WireError::FrameTooLarge { .. })
        ));
    }

    #[test]
    fn oversized_payload_is_not_encoded() {
        let frame = Frame::new(vec![0u8; MAX_FRAME_SIZE + 1]);
        let mut buf = BytesMut::new();
        assert!(frame.encode(&mut buf).is_err());
        assert!(buf.is_empty());
    }
}
