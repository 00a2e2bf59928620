//! Fixed-interval polling policy.

use std::time::Duration;

use crate::error::{ModelError, ModelResult};

/// Default number of status queries before giving up.
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 60;
/// Default pause between status queries.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Bounded, fixed-interval polling policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollingPolicy {
    max_attempts: u32,
    interval: Duration,
}

impl Default for PollingPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl PollingPolicy {
    /// Create a policy; `max_attempts` must be positive.
    pub fn new(max_attempts: u32, interval: Duration) -> ModelResult<Self> {
        if max_attempts == 0 {
            return Err(ModelError::ZeroAttempts);
        }
        Ok(Self {
            max_attempts,
            interval,
        })
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_attempts_rejected() {
        assert!(matches!(
            PollingPolicy::new(0, Duration::from_secs(1)),
            Err(ModelError::ZeroAttempts)
        ));
    }
}
