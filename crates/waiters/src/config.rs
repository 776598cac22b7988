use std::time::Duration;

use crate::error::WaitConfigError;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_PAUSE: Duration = Duration::from_secs(1);

/// Polling parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitConfig {
    /// Give up once this much time has passed since the first attempt.
    pub timeout: Duration,
    /// Sleep between attempts.
    pub pause: Duration,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            pause: DEFAULT_PAUSE,
        }
    }
}

impl WaitConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    pub fn validate(&self) -> Result<(), WaitConfigError> {
        if self.pause.is_zero() {
            return Err(WaitConfigError::ZeroPause);
        }
        Ok(())
    }
}
