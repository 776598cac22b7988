//! Matchers that judge a single value on their own.
use std::fmt;

use regex::bytes::RegexBuilder as BytesRegexBuilder;
use regex::RegexBuilder;

use crate::error::MatchError;
use crate::expected::Matches;
use crate::value::{write_joined, Kind, Value};

/// Equals every value, including `null`, `""`, `0` and empty containers.
///
/// Use it to ignore parts of a structure, such as generated ids.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Any;

impl Matches for Any {
    fn matches(&self, _actual: &Value) -> Result<bool, MatchError> {
        Ok(true)
    }
}

impl fmt::Display for Any {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any")
    }
}

/// Compile options for [`Regex`]. All off by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegexFlags {
    pub case_insensitive: bool,
    pub multi_line: bool,
    pub dot_matches_new_line: bool,
    pub ignore_whitespace: bool,
}

impl RegexFlags {
    pub fn case_insensitive(mut self) -> Self {
        self.case_insensitive = true;
        self
    }

    pub fn multi_line(mut self) -> Self {
        self.multi_line = true;
        self
    }

    pub fn dot_matches_new_line(mut self) -> Self {
        self.dot_matches_new_line = true;
        self
    }

    pub fn ignore_whitespace(mut self) -> Self {
        self.ignore_whitespace = true;
        self
    }

    pub fn is_default(&self) -> bool {
        *self == RegexFlags::default()
    }
}

/// Renders the set flags as inline-flag letters, e.g. `im`.
impl fmt::Display for RegexFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (set, letter) in [
            (self.case_insensitive, 'i'),
            (self.multi_line, 'm'),
            (self.dot_matches_new_line, 's'),
            (self.ignore_whitespace, 'x'),
        ] {
            if set {
                write!(f, "{letter}")?;
            }
        }
        Ok(())
    }
}

/// Equals text (or bytes) in which the pattern is found anywhere.
///
/// The search is unanchored; add `^`/`$` to pin it. Comparing against
/// anything other than `Str` or `Bytes` is a precondition violation.
///
/// ```rust
/// use matchers::{Regex, Value};
///
/// let regex = Regex::new("wrong").unwrap();
/// assert!(Value::from("Something went wrong: 523") == regex);
/// assert_eq!(regex.to_string(), "regex(r'wrong')");
/// ```
#[derive(Debug, Clone)]
pub struct Regex {
    pattern: String,
    flags: RegexFlags,
    text: regex::Regex,
    bytes: regex::bytes::Regex,
}

impl Regex {
    pub fn new(pattern: &str) -> Result<Self, MatchError> {
        Self::with_flags(pattern, RegexFlags::default())
    }

    pub fn with_flags(pattern: &str, flags: RegexFlags) -> Result<Self, MatchError> {
        let text = RegexBuilder::new(pattern)
            .case_insensitive(flags.case_insensitive)
            .multi_line(flags.multi_line)
            .dot_matches_new_line(flags.dot_matches_new_line)
            .ignore_whitespace(flags.ignore_whitespace)
            .build()?;
        let bytes = BytesRegexBuilder::new(pattern)
            .case_insensitive(flags.case_insensitive)
            .multi_line(flags.multi_line)
            .dot_matches_new_line(flags.dot_matches_new_line)
            .ignore_whitespace(flags.ignore_whitespace)
            .build()?;
        Ok(Self {
            pattern: pattern.to_string(),
            flags,
            text,
            bytes,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn flags(&self) -> RegexFlags {
        self.flags
    }
}

impl Matches for Regex {
    fn matches(&self, actual: &Value) -> Result<bool, MatchError> {
        match actual {
            Value::Str(text) => Ok(self.text.is_match(text)),
            Value::Bytes(bytes) => Ok(self.bytes.is_match(bytes)),
            other => Err(MatchError::NotText {
                matcher: self.to_string(),
                found: other.kind(),
            }),
        }
    }
}

impl fmt::Display for Regex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.flags.is_default() {
            write!(f, "regex(r'{}')", self.pattern)
        } else {
            write!(f, "regex(r'{}', flags={})", self.pattern, self.flags)
        }
    }
}

/// One or more alternative kinds accepted by [`InstanceOf`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Kinds(Vec<Kind>);

impl Kinds {
    pub fn as_slice(&self) -> &[Kind] {
        &self.0
    }
}

impl From<Kind> for Kinds {
    fn from(value: Kind) -> Self {
        Kinds(vec![value])
    }
}

impl From<Vec<Kind>> for Kinds {
    fn from(value: Vec<Kind>) -> Self {
        Kinds(value)
    }
}

impl<const N: usize> From<[Kind; N]> for Kinds {
    fn from(value: [Kind; N]) -> Self {
        Kinds(value.into())
    }
}

/// Equals any value whose runtime kind is one of the given kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceOf {
    kinds: Kinds,
}

impl InstanceOf {
    pub fn new(kinds: impl Into<Kinds>) -> Self {
        Self {
            kinds: kinds.into(),
        }
    }

    pub fn kinds(&self) -> &[Kind] {
        self.kinds.as_slice()
    }
}

impl Matches for InstanceOf {
    fn matches(&self, actual: &Value) -> Result<bool, MatchError> {
        Ok(self.kinds().iter().any(|kind| kind.accepts(actual)))
    }
}

impl fmt::Display for InstanceOf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kinds() {
            [single] => write!(f, "instance_of({single})"),
            many => {
                f.write_str("instance_of((")?;
                write_joined(f, many.iter())?;
                f.write_str("))")
            }
        }
    }
}

/// Equals any of the candidate values.
///
/// Candidates are kept sorted so the representation is stable regardless of
/// construction order. Besides `matches`, [`AnyOf::contained_in`] answers the
/// reversed question: does a real collection hold any of the candidates?
#[derive(Debug, Clone, PartialEq)]
pub struct AnyOf {
    candidates: Vec<Value>,
}

impl AnyOf {
    pub fn new<I, V>(candidates: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let mut candidates: Vec<Value> = candidates.into_iter().map(Into::into).collect();
        candidates.sort_by(Value::total_cmp);
        Self { candidates }
    }

    pub fn candidates(&self) -> &[Value] {
        &self.candidates
    }

    fn is_candidate(&self, value: &Value) -> bool {
        self.candidates.iter().any(|candidate| candidate == value)
    }

    /// True when an element of the list (or a key of the map) is one of the
    /// candidates.
    pub fn contained_in(&self, collection: &Value) -> Result<bool, MatchError> {
        match collection {
            Value::List(items) => Ok(items.iter().any(|item| self.is_candidate(item))),
            Value::Map(map) => Ok(map
                .keys()
                .any(|key| self.is_candidate(&Value::Str(key.clone())))),
            other => Err(MatchError::NotIterable {
                matcher: self.to_string(),
                found: other.kind(),
            }),
        }
    }
}

impl Matches for AnyOf {
    fn matches(&self, actual: &Value) -> Result<bool, MatchError> {
        Ok(self.is_candidate(actual))
    }
}

impl fmt::Display for AnyOf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any_of(")?;
        write_joined(f, self.candidates.iter())?;
        f.write_str(")")
    }
}
