//! Error types produced by the matchers crate.
//!
//! A comparison that simply does not hold is *not* an error: matchers return
//! `Ok(false)` for that. [`MatchError`] is reserved for misuse, where the
//! operand handed to a matcher has a shape the matcher cannot judge (a regex
//! against an integer, an attribute bag against a value without the
//! attribute) or where a matcher was built with invalid parameters.
//!
//! Every comparison error, and a bad tolerance handed to `approx`, is a
//! precondition violation (see [`MatchError::is_precondition_violation`]).
//! A bad pattern or a non-numeric `approx` target is a construction error.
//!
//! | Error | Raised | Description |
//! |-------|--------|-------------|
//! | [`NotText`](MatchError::NotText) | comparison | regex compared with non-text data |
//! | [`NotMapping`](MatchError::NotMapping) | comparison | partial mapping compared with a non-mapping |
//! | [`MissingAttribute`](MatchError::MissingAttribute) | comparison | attribute bag names an attribute the operand lacks |
//! | [`NotIterable`](MatchError::NotIterable) | comparison | unordered/containment check against a non-collection |
//! | [`NotTemporal`](MatchError::NotTemporal) | comparison | temporal approx compared with the wrong kind of value |
//! | [`NotNumeric`](MatchError::NotNumeric) | construction | numeric approx built from non-numbers |
//! | [`InvalidTolerance`](MatchError::InvalidTolerance) | construction (precondition) | negative, NaN or mistyped tolerance |
//! | [`InvalidPattern`](MatchError::InvalidPattern) | construction | regex failed to compile |
use thiserror::Error;

use crate::value::Kind;

/// Errors surfaced by matcher construction and comparison.
///
/// ```rust
/// use matchers::{Kind, MatchError};
///
/// let err = MatchError::NotText {
///     matcher: "regex(r'^a')".to_string(),
///     found: Kind::Int,
/// };
/// assert_eq!(
///     err.to_string(),
///     "regex(r'^a') can only be compared with text or bytes, found int"
/// );
/// assert!(err.is_precondition_violation());
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum MatchError {
    #[error("{matcher} can only be compared with text or bytes, found {found}")]
    NotText { matcher: String, found: Kind },

    #[error("{matcher} can only be compared with a mapping, found {found}")]
    NotMapping { matcher: String, found: Kind },

    #[error("{found} has no attribute '{attribute}' (required by {matcher})")]
    MissingAttribute {
        matcher: String,
        attribute: String,
        found: Kind,
    },

    #[error("{matcher} can only be compared with a collection, found {found}")]
    NotIterable { matcher: String, found: Kind },

    #[error("{matcher} can only be compared with a {expected}, found {found}")]
    NotTemporal {
        matcher: String,
        expected: Kind,
        found: Kind,
    },

    #[error("approx() expects numbers or collections of numbers, found {found}")]
    NotNumeric { found: Kind },

    #[error("invalid tolerance: {0}")]
    InvalidTolerance(String),

    #[error("invalid regex pattern: {0}")]
    InvalidPattern(String),
}

impl MatchError {
    /// True when an argument broke the matcher's stated contract: an
    /// operand of the wrong shape, or a negative or mistyped tolerance.
    /// False for a pattern that does not compile or a non-numeric `approx`
    /// target.
    pub fn is_precondition_violation(&self) -> bool {
        !matches!(
            self,
            MatchError::NotNumeric { .. } | MatchError::InvalidPattern(_)
        )
    }
}

impl From<regex::Error> for MatchError {
    fn from(value: regex::Error) -> Self {
        MatchError::InvalidPattern(value.to_string())
    }
}
