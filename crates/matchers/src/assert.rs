//! Failure reporting for [`assert_match!`](crate::assert_match).
use crate::expected::Expected;
use crate::value::Value;

/// A failed expectation, rendered as
///
/// ```text
///
/// <description>:
///     expected: <expected>
///        found: <actual>
/// at <file>:<line>
/// ```
///
/// The description line and the location are left out when unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mismatch {
    description: Option<String>,
    expected: Option<String>,
    actual: Option<String>,
    location: Option<String>,
}

impl Mismatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn expecting(mut self, expected: impl ToString) -> Self {
        self.expected = Some(expected.to_string());
        self
    }

    pub fn found(mut self, actual: impl ToString) -> Self {
        self.actual = Some(actual.to_string());
        self
    }

    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn message(&self) -> String {
        let description = self
            .description
            .as_ref()
            .map_or_else(String::new, |description| format!("\n{description}:"));
        let location = self
            .location
            .as_ref()
            .map_or_else(String::new, |location| format!("at {location}\n"));
        let expected = self.expected.as_deref().unwrap_or("<nothing>");
        let actual = self.actual.as_deref().unwrap_or("<nothing>");
        format!("{description}\n\texpected: {expected}\n\t   found: {actual}\n{location}")
    }

    pub fn fail(self) -> ! {
        panic!("{}", self.message())
    }
}

/// Runtime half of [`assert_match!`](crate::assert_match).
#[doc(hidden)]
#[track_caller]
pub fn assert_match_at(
    actual: Value,
    expected: Expected,
    description: Option<&str>,
    location: &str,
) {
    match expected.matches(&actual) {
        Ok(true) => {}
        Ok(false) => {
            let mismatch = Mismatch::new().expecting(&expected).found(&actual).at(location);
            match description {
                Some(description) => mismatch.describe(description).fail(),
                None => mismatch.fail(),
            }
        }
        Err(err) => panic!("precondition violated: {err}\nat {location}\n"),
    }
}
