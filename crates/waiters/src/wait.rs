//! Poll loops.
use std::time::{Duration, Instant};

#[cfg(feature = "tokio")]
use std::future::Future;

use tracing::{debug, warn};

use crate::config::WaitConfig;
use crate::error::{TimedOutError, WaitConfigError};

/// Calls `predicate` until it returns `Some`, sleeping `pause` between
/// attempts, and gives up once `timeout` has elapsed since the start.
///
/// A zero timeout gives up without calling the predicate.
///
/// ```rust
/// use std::time::Duration;
/// use waiters::wait_until;
///
/// let mut polls = 0;
/// let value = wait_until(
///     || {
///         polls += 1;
///         (polls == 3).then_some("ready")
///     },
///     Duration::from_secs(1),
///     Duration::from_millis(1),
/// )
/// .unwrap();
/// assert_eq!(value, "ready");
/// ```
pub fn wait_until<T, F>(mut predicate: F, timeout: Duration, pause: Duration) -> Result<T, TimedOutError>
where
    F: FnMut() -> Option<T>,
{
    let start = Instant::now();
    let mut attempts = 0u32;

    while start.elapsed() < timeout {
        attempts += 1;
        if let Some(value) = predicate() {
            debug!(attempts, elapsed_ms = start.elapsed().as_millis() as u64, "wait_satisfied");
            return Ok(value);
        }
        debug!(attempt = attempts, "wait_attempt_failed");
        std::thread::sleep(pause);
    }

    warn!(attempts, timeout_ms = timeout.as_millis() as u64, "wait_timed_out");
    Err(TimedOutError { timeout, attempts })
}

/// [`wait_until`] for predicates that answer yes or no.
pub fn wait_for<F>(mut predicate: F, timeout: Duration, pause: Duration) -> Result<(), TimedOutError>
where
    F: FnMut() -> bool,
{
    wait_until(|| predicate().then_some(()), timeout, pause)
}

/// Async [`wait_until`]; sleeps on the tokio timer instead of blocking.
#[cfg(feature = "tokio")]
pub async fn wait_until_async<T, F, Fut>(
    mut predicate: F,
    timeout: Duration,
    pause: Duration,
) -> Result<T, TimedOutError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    let start = Instant::now();
    let mut attempts = 0u32;

    while start.elapsed() < timeout {
        attempts += 1;
        if let Some(value) = predicate().await {
            debug!(attempts, elapsed_ms = start.elapsed().as_millis() as u64, "wait_satisfied");
            return Ok(value);
        }
        debug!(attempt = attempts, "wait_attempt_failed");
        tokio::time::sleep(pause).await;
    }

    warn!(attempts, timeout_ms = timeout.as_millis() as u64, "wait_timed_out");
    Err(TimedOutError { timeout, attempts })
}

/// A validated [`WaitConfig`] bound to the poll functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Waiter {
    config: WaitConfig,
}

impl Waiter {
    pub fn new(config: WaitConfig) -> Result<Self, WaitConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &WaitConfig {
        &self.config
    }

    pub fn until<T>(&self, predicate: impl FnMut() -> Option<T>) -> Result<T, TimedOutError> {
        wait_until(predicate, self.config.timeout, self.config.pause)
    }

    pub fn until_true(&self, predicate: impl FnMut() -> bool) -> Result<(), TimedOutError> {
        wait_for(predicate, self.config.timeout, self.config.pause)
    }

    #[cfg(feature = "tokio")]
    pub async fn until_async<T, F, Fut>(&self, predicate: F) -> Result<T, TimedOutError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Option<T>>,
    {
        wait_until_async(predicate, self.config.timeout, self.config.pause).await
    }
}

impl Default for Waiter {
    fn default() -> Self {
        Self {
            config: WaitConfig::default(),
        }
    }
}
