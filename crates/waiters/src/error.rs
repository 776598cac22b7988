//! Errors for polling waits.
use std::time::Duration;

use thiserror::Error;

/// The predicate never succeeded within the timeout.
///
/// Carries no partial result, only what it took to give up.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("timeout reached while waiting ({attempts} attempts in {timeout:?})")]
pub struct TimedOutError {
    pub timeout: Duration,
    pub attempts: u32,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum WaitConfigError {
    #[error("pause must be greater than zero")]
    ZeroPause,
}
