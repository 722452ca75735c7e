//! Timing constants consumed by the view service.

use std::time::Duration;

use crate::error::{Result, ViewServiceError};

/// Default interval between heartbeats (and detector ticks).
pub const DEFAULT_PING_INTERVAL: Duration = Duration::from_millis(100);

/// Default number of missed intervals before a role is presumed dead.
pub const DEFAULT_DEAD_PINGS: u32 = 5;

/// Heartbeat and failure-detection timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceConfig {
    /// How often replica servers ping, and how often the detector ticks.
    pub ping_interval: Duration,

    /// Consecutive detector ticks without a heartbeat after which a role
    /// holder is presumed dead.
    pub dead_pings: u32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            ping_interval: DEFAULT_PING_INTERVAL,
            dead_pings: DEFAULT_DEAD_PINGS,
        }
    }
}

impl ServiceConfig {
    pub fn new(ping_interval: Duration, dead_pings: u32) -> Self {
        Self {
            ping_interval,
            dead_pings,
        }
    }

    /// Checks that failure detection relies on sustained absence rather
    /// than a single late heartbeat.
    pub fn validate(&self) -> Result<()> {
        if self.ping_interval.is_zero() {
            return Err(ViewServiceError::ZeroPingInterval);
        }
        if self.dead_pings <= 1 {
            return Err(ViewServiceError::DeadPingsTooLow(self.dead_pings));
        }
        Ok(())
    }

    /// How long a silent role holder survives before it is presumed dead.
    pub fn dead_timeout(&self) -> Duration {
        self.ping_interval * self.dead_pings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn defaults_are_valid() {
        let config = ServiceConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.dead_timeout(), Duration::from_millis(500));
    }

    #[test_case(0 ; "zero")]
    #[test_case(1 ; "single interval")]
    fn rejects_low_dead_threshold(dead_pings: u32) {
        let config = ServiceConfig::new(Duration::from_millis(10), dead_pings);
        assert_eq!(
            config.validate(),
            Err(ViewServiceError::DeadPingsTooLow(dead_pings))
        );
    }

    #[test]
    fn rejects_zero_interval() {
        let config = ServiceConfig::new(Duration::ZERO, 5);
        assert_eq!(config.validate(), Err(ViewServiceError::ZeroPingInterval));
    }
}
