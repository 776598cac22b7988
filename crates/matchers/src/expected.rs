//! The expected side of an assertion and the comparison interface.
//!
//! [`Expected`] mirrors the shape of [`Value`] but any node may be a
//! matcher. Comparison walks both trees together and hands control to a
//! matcher whenever it reaches one, so matchers can sit at any depth inside
//! plain lists and maps, and composite matchers recurse back through
//! [`Expected::matches`] for their own sub-values.
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, TimeDelta, Utc};
use serde_json::Value as JsonValue;

use crate::approx::{Approx, ApproxNumber, ApproxTemporal};
use crate::composite::{Attrs, Dict, Unordered};
use crate::error::MatchError;
use crate::primitive::{Any, AnyOf, InstanceOf, Regex};
use crate::value::{write_joined, Object, Value};

/// A partial-equality rule.
///
/// `Ok(true)` and `Ok(false)` report match and mismatch. `Err` is reserved
/// for operands the rule does not accept at all. `Display` must reproduce
/// the constructor form; it is what failure diagnostics print.
pub trait Matches: fmt::Debug + fmt::Display + Send + Sync {
    fn matches(&self, actual: &Value) -> Result<bool, MatchError>;
}

/// Expected value tree: exact leaves, containers, and matchers.
#[derive(Clone)]
pub enum Expected {
    Value(Value),
    List(Vec<Expected>),
    Map(BTreeMap<String, Expected>),
    Matcher(Arc<dyn Matches>),
}

impl Expected {
    pub fn matcher<M: Matches + 'static>(matcher: M) -> Self {
        Expected::Matcher(Arc::new(matcher))
    }

    /// Structural comparison where matcher nodes apply their own rule.
    ///
    /// Lists must have equal length and maps equal key sets; a mismatch in
    /// container shape is a plain `false`, never an error.
    pub fn matches(&self, actual: &Value) -> Result<bool, MatchError> {
        match self {
            Expected::Value(value) => Ok(value == actual),
            Expected::List(items) => {
                let Value::List(values) = actual else {
                    return Ok(false);
                };
                if items.len() != values.len() {
                    return Ok(false);
                }
                for (expected, value) in items.iter().zip(values) {
                    if !expected.matches(value)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Expected::Map(entries) => {
                let Value::Map(values) = actual else {
                    return Ok(false);
                };
                if entries.len() != values.len() {
                    return Ok(false);
                }
                for (key, expected) in entries {
                    match values.get(key) {
                        Some(value) if expected.matches(value)? => {}
                        _ => return Ok(false),
                    }
                }
                Ok(true)
            }
            Expected::Matcher(matcher) => matcher.matches(actual),
        }
    }
}

/// Turns a comparison outcome into the boolean `==` needs. Misuse panics so
/// that it fails the test instead of reading as a plain mismatch.
pub(crate) fn expect_outcome(outcome: Result<bool, MatchError>) -> bool {
    match outcome {
        Ok(matched) => matched,
        Err(err) => panic!("precondition violated: {err}"),
    }
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Value(value) => write!(f, "{value}"),
            Expected::List(items) => {
                f.write_str("[")?;
                write_joined(f, items.iter())?;
                f.write_str("]")
            }
            Expected::Map(entries) => {
                f.write_str("{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key:?}: {value}")?;
                }
                f.write_str("}")
            }
            Expected::Matcher(matcher) => write!(f, "{matcher}"),
        }
    }
}

impl fmt::Debug for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl PartialEq<Value> for Expected {
    fn eq(&self, other: &Value) -> bool {
        expect_outcome(self.matches(other))
    }
}

impl PartialEq<Expected> for Value {
    fn eq(&self, other: &Expected) -> bool {
        other == self
    }
}

impl From<Value> for Expected {
    fn from(value: Value) -> Self {
        Expected::Value(value)
    }
}

impl From<&Value> for Expected {
    fn from(value: &Value) -> Self {
        Expected::Value(value.clone())
    }
}

impl From<&Expected> for Expected {
    fn from(value: &Expected) -> Self {
        value.clone()
    }
}

impl<T: Into<Expected>> From<Vec<T>> for Expected {
    fn from(value: Vec<T>) -> Self {
        Expected::List(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Expected>> From<Option<T>> for Expected {
    fn from(value: Option<T>) -> Self {
        value.map_or(Expected::Value(Value::Null), Into::into)
    }
}

impl<K: Into<String>, V: Into<Expected>> From<BTreeMap<K, V>> for Expected {
    fn from(value: BTreeMap<K, V>) -> Self {
        Expected::Map(value.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K: Into<String>, V: Into<Expected>> From<HashMap<K, V>> for Expected {
    fn from(value: HashMap<K, V>) -> Self {
        Expected::Map(value.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

macro_rules! impl_exact_leaf {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Expected {
                fn from(value: $ty) -> Self {
                    Expected::Value(Value::from(value))
                }
            }
        )*
    };
}

impl_exact_leaf!(
    i8, i16, i32, i64, u8, u16, u32, u64, usize, f32, f64, bool, &str, String, &String, &[u8],
    DateTime<Utc>, DateTime<FixedOffset>, TimeDelta, Object, JsonValue, &JsonValue
);

macro_rules! impl_matcher_operand {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Expected {
                fn from(matcher: $ty) -> Self {
                    Expected::Matcher(Arc::new(matcher))
                }
            }

            impl PartialEq<Value> for $ty {
                fn eq(&self, other: &Value) -> bool {
                    expect_outcome(self.matches(other))
                }
            }

            impl PartialEq<$ty> for Value {
                fn eq(&self, other: &$ty) -> bool {
                    other == self
                }
            }
        )*
    };
}

impl_matcher_operand!(
    Any,
    Regex,
    InstanceOf,
    AnyOf,
    Dict,
    Attrs,
    Unordered,
    ApproxTemporal,
    ApproxNumber,
    Approx
);
