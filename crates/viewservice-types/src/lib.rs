//! # viewservice-types: Core types for the view service
//!
//! This crate contains the value types shared by every part of the system:
//! - Server identities ([`ServerId`])
//! - View sequence numbers ([`ViewNumber`])
//! - Role assignments ([`View`], [`Role`])

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

// ============================================================================
// Server identity
// ============================================================================

/// Identity of a replica server, as reported in its heartbeats.
///
/// Identities are opaque to the view service; replica servers conventionally
/// use their own listen address (`host:port`). An identity is never empty:
/// an empty role slot is represented by `Option::<ServerId>::None`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServerId(String);

impl ServerId {
    /// Creates an identity, returning `None` for an empty string.
    pub fn parse(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        if id.is_empty() { None } else { Some(Self(id)) }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ServerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<ServerId> for String {
    fn from(id: ServerId) -> Self {
        id.0
    }
}

impl AsRef<str> for ServerId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// View number
// ============================================================================

/// Monotonic sequence number of a view.
///
/// `ViewNumber::ZERO` means "no view has been assigned yet".
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ViewNumber(u64);

impl ViewNumber {
    pub const ZERO: ViewNumber = ViewNumber(0);

    pub fn new(n: u64) -> Self {
        Self(n)
    }

    /// Returns the view number that follows this one.
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl Display for ViewNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ViewNumber {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<ViewNumber> for u64 {
    fn from(n: ViewNumber) -> Self {
        n.0
    }
}

// ============================================================================
// View
// ============================================================================

/// Role a server holds in a given view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Primary,
    Backup,
    /// Known to the caller but holding neither role.
    Idle,
}

impl Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::Primary => "primary",
            Role::Backup => "backup",
            Role::Idle => "idle",
        };
        f.write_str(s)
    }
}

/// An assignment of the primary and backup roles plus its sequence number.
///
/// Invariant: a view numbered zero has neither a primary nor a backup.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct View {
    pub viewnum: ViewNumber,
    pub primary: Option<ServerId>,
    pub backup: Option<ServerId>,
}

impl View {
    /// The empty view every service starts with.
    pub fn initial() -> Self {
        Self::default()
    }

    pub fn new(viewnum: ViewNumber, primary: Option<ServerId>, backup: Option<ServerId>) -> Self {
        Self {
            viewnum,
            primary,
            backup,
        }
    }

    pub fn is_primary(&self, id: &ServerId) -> bool {
        self.primary.as_ref() == Some(id)
    }

    pub fn is_backup(&self, id: &ServerId) -> bool {
        self.backup.as_ref() == Some(id)
    }

    /// Looks up the role of `id`, checking the primary slot first.
    pub fn role_of(&self, id: &ServerId) -> Role {
        if self.is_primary(id) {
            Role::Primary
        } else if self.is_backup(id) {
            Role::Backup
        } else {
            Role::Idle
        }
    }
}

impl Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = |s: &Option<ServerId>| s.as_ref().map_or("-", ServerId::as_str).to_owned();
        write!(
            f,
            "view {} (primary: {}, backup: {})",
            self.viewnum,
            slot(&self.primary),
            slot(&self.backup)
        )
    }
}
