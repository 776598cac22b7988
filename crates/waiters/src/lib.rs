//! Polling waits for tests that depend on something happening eventually:
//! a file appearing, a server accepting connections, a background job
//! finishing.
//!
//! [`wait_until`] retries a predicate until it produces a value or the
//! timeout passes, failing with [`TimedOutError`]. With the `tokio` feature,
//! `wait_until_async` does the same on the tokio timer.
//!
mod config;
mod error;
mod wait;

pub use crate::config::{WaitConfig, DEFAULT_PAUSE, DEFAULT_TIMEOUT};
pub use crate::error::{TimedOutError, WaitConfigError};
pub use crate::wait::{wait_for, wait_until, Waiter};

#[cfg(feature = "tokio")]
pub use crate::wait::wait_until_async;
