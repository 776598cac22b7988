//! Single entry point for building matchers.
//!
//! ```rust
//! use matchers::{Expected, Matcher, Value, M};
//! use serde_json::json;
//!
//! let response = Value::from(json!({"id": 17, "status": "ok", "took_ms": 3}));
//! assert!(response == M::dict([("id", Expected::from(Matcher::any())), ("status", "ok".into())]));
//! ```
use crate::approx::{approx, Approx, ApproxConfig, ApproxOptions};
use crate::composite::{Attrs, Dict, Unordered};
use crate::error::MatchError;
use crate::expected::Expected;
use crate::primitive::{Any, AnyOf, InstanceOf, Kinds, Regex, RegexFlags};
use crate::value::Value;

/// Namespace for matcher constructors.
pub struct Matcher;

/// Short alias of [`Matcher`].
pub type M = Matcher;

impl Matcher {
    pub const ANY: Any = Any;

    /// Default invocation form; same as [`Matcher::attrs`].
    #[allow(clippy::new_ret_no_self)]
    pub fn new<I, K, V>(attributes: I) -> Attrs
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Expected>,
    {
        Attrs::new(attributes)
    }

    pub fn any() -> Any {
        Any
    }

    pub fn attrs<I, K, V>(attributes: I) -> Attrs
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Expected>,
    {
        Attrs::new(attributes)
    }

    pub fn dict<I, K, V>(entries: I) -> Dict
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Expected>,
    {
        Dict::new(entries)
    }

    /// Partial mapping from `mapping` with `overrides` applied on top.
    pub fn dict_with<I, K, V, O, OK, OV>(mapping: I, overrides: O) -> Dict
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Expected>,
        O: IntoIterator<Item = (OK, OV)>,
        OK: Into<String>,
        OV: Into<Expected>,
    {
        Dict::with_overrides(mapping, overrides)
    }

    pub fn regex(pattern: &str) -> Result<Regex, MatchError> {
        Regex::new(pattern)
    }

    pub fn re(pattern: &str) -> Result<Regex, MatchError> {
        Regex::new(pattern)
    }

    pub fn regex_with_flags(pattern: &str, flags: RegexFlags) -> Result<Regex, MatchError> {
        Regex::with_flags(pattern, flags)
    }

    pub fn unordered<I, V>(items: I) -> Unordered
    where
        I: IntoIterator<Item = V>,
        V: Into<Expected>,
    {
        Unordered::new(items)
    }

    pub fn any_of<I, V>(candidates: I) -> AnyOf
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        AnyOf::new(candidates)
    }

    pub fn instance_of(kinds: impl Into<Kinds>) -> InstanceOf {
        InstanceOf::new(kinds)
    }

    /// Approximate matcher with default tolerances.
    pub fn approx(expected: impl Into<Value>) -> Result<Approx, MatchError> {
        approx(expected, ApproxOptions::default(), &ApproxConfig::default())
    }

    pub fn approx_with(
        expected: impl Into<Value>,
        options: ApproxOptions,
    ) -> Result<Approx, MatchError> {
        approx(expected, options, &ApproxConfig::default())
    }

    /// Like [`Matcher::approx_with`], with defaults taken from `config`.
    pub fn approx_configured(
        expected: impl Into<Value>,
        options: ApproxOptions,
        config: &ApproxConfig,
    ) -> Result<Approx, MatchError> {
        approx(expected, options, config)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;
    use serde_json::json;

    use super::*;
    use crate::value::{Kind, Object};

    #[test]
    fn new_and_attrs_are_the_same_matcher() {
        let by_new = Matcher::new([("x", 1)]);
        let by_attrs = M::attrs([("x", 1)]);
        assert_eq!(by_new.to_string(), by_attrs.to_string());
        let point = Value::from(Object::new("Point").with("x", 1).with("y", 2));
        assert!(point == by_new);
        assert!(point == by_attrs);
    }

    #[test]
    fn any_constant_and_constructor_agree() {
        assert_eq!(Matcher::ANY, Matcher::any());
        assert!(Value::Null == M::ANY);
    }

    #[test]
    fn re_is_an_alias_of_regex() {
        let (Ok(a), Ok(b)) = (M::re("^x"), M::regex("^x")) else {
            panic!("patterns should compile");
        };
        assert_eq!(a.to_string(), b.to_string());
    }

    #[test]
    fn dict_with_overrides_replaces_values() {
        let base = [("a", Expected::from(1)), ("b", Expected::from(2))];
        let matcher = M::dict_with(base, [("b", Expected::from(Any))]);
        assert!(Value::from(json!({"a": 1, "b": "anything", "c": 0})) == matcher);
        assert_eq!(matcher.to_string(), "dict(a=1, b=any)");
    }

    #[test]
    fn facade_builds_every_matcher_kind() {
        assert!(Value::from(vec![3, 1, 2]) == M::unordered([1, 2, 3]));
        assert!(Value::from("b") == M::any_of(["a", "b"]));
        assert!(Value::from(1.5) == M::instance_of(Kind::Number));
        let Ok(matcher) = M::approx_with(TimeDelta::seconds(5), ApproxOptions::default()) else {
            panic!("duration approx should build");
        };
        assert!(Value::from(TimeDelta::milliseconds(5_300)) == matcher);
    }

    #[test]
    fn approx_configured_uses_the_given_defaults() {
        let config = ApproxConfig::default().with_rel(0.1);
        let Ok(matcher) = M::approx_configured(100, ApproxOptions::default(), &config) else {
            panic!("numeric approx should build");
        };
        assert!(Value::from(95) == matcher);
        assert!(Value::from(95) != M::approx(100).unwrap_or_else(|e| panic!("{e}")));
    }
}
