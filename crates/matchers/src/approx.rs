//! Approximate equality for instants, durations and numbers.
//!
//! [`approx`] dispatches on the expected value: instants and durations get
//! an absolute-tolerance temporal comparison, everything else goes through
//! the numeric comparator with relative and absolute tolerances.
//!
//! Default tolerances live in [`ApproxConfig`] and are passed explicitly so
//! that comparisons stay pure.
use std::fmt;

use chrono::TimeDelta;

use crate::error::MatchError;
use crate::expected::Matches;
use crate::value::{format_delta, Value};

/// Default temporal tolerance, one second.
pub const DEFAULT_TEMPORAL_TOLERANCE_MS: i64 = 1_000;
/// Default relative tolerance for numbers.
pub const DEFAULT_REL_TOLERANCE: f64 = 1e-6;
/// Default absolute tolerance for numbers.
pub const DEFAULT_ABS_TOLERANCE: f64 = 1e-12;

/// Default tolerances used when a call does not give its own.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApproxConfig {
    /// Temporal tolerance, kept at full `TimeDelta` precision.
    ///
    /// Default: one second
    pub temporal_tolerance: TimeDelta,

    /// Relative tolerance for numbers.
    ///
    /// Default: `1e-6`
    pub rel: f64,

    /// Absolute tolerance for numbers.
    ///
    /// Default: `1e-12`
    pub abs: f64,
}

impl Default for ApproxConfig {
    fn default() -> Self {
        Self {
            temporal_tolerance: TimeDelta::milliseconds(DEFAULT_TEMPORAL_TOLERANCE_MS),
            rel: DEFAULT_REL_TOLERANCE,
            abs: DEFAULT_ABS_TOLERANCE,
        }
    }
}

impl ApproxConfig {
    pub fn with_temporal_tolerance(mut self, tolerance: TimeDelta) -> Self {
        self.temporal_tolerance = tolerance;
        self
    }

    pub fn with_rel(mut self, rel: f64) -> Self {
        self.rel = rel;
        self
    }

    pub fn with_abs(mut self, abs: f64) -> Self {
        self.abs = abs;
        self
    }

    pub fn temporal_tolerance(&self) -> TimeDelta {
        self.temporal_tolerance
    }

    pub fn validate(&self) -> Result<(), MatchError> {
        if self.temporal_tolerance < TimeDelta::zero() {
            return Err(MatchError::InvalidTolerance(format!(
                "temporal tolerance can't be negative: {}",
                format_delta(&self.temporal_tolerance)
            )));
        }
        check_number_tolerance("rel", self.rel)?;
        check_number_tolerance("abs", self.abs)
    }
}

fn check_number_tolerance(name: &str, value: f64) -> Result<(), MatchError> {
    if value.is_nan() || value < 0.0 {
        return Err(MatchError::InvalidTolerance(format!(
            "{name} tolerance must be a non-negative number: {value:?}"
        )));
    }
    Ok(())
}

/// Absolute tolerance: a number for numeric expectations, a time span for
/// temporal ones.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tolerance {
    Number(f64),
    Time(TimeDelta),
}

impl From<f64> for Tolerance {
    fn from(value: f64) -> Self {
        Tolerance::Number(value)
    }
}

impl From<TimeDelta> for Tolerance {
    fn from(value: TimeDelta) -> Self {
        Tolerance::Time(value)
    }
}

/// Per-call tolerance overrides.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ApproxOptions {
    pub rel: Option<f64>,
    pub abs: Option<Tolerance>,
    pub nan_ok: bool,
}

impl ApproxOptions {
    pub fn rel(mut self, rel: f64) -> Self {
        self.rel = Some(rel);
        self
    }

    pub fn abs(mut self, abs: impl Into<Tolerance>) -> Self {
        self.abs = Some(abs.into());
        self
    }

    pub fn nan_ok(mut self, nan_ok: bool) -> Self {
        self.nan_ok = nan_ok;
        self
    }
}

/// Builds the approximate matcher appropriate for `expected`.
///
/// ```rust
/// use chrono::{TimeDelta, TimeZone, Utc};
/// use matchers::{approx, ApproxConfig, ApproxOptions, Value};
///
/// let config = ApproxConfig::default();
/// let when = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
/// let matcher = approx(when, ApproxOptions::default(), &config).unwrap();
/// assert!(Value::from(when + TimeDelta::milliseconds(500)) == matcher);
/// assert!(Value::from(when + TimeDelta::seconds(2)) != matcher);
///
/// let matcher = approx(0.3, ApproxOptions::default(), &config).unwrap();
/// assert!(Value::from(0.1 + 0.2) == matcher);
/// ```
pub fn approx(
    expected: impl Into<Value>,
    options: ApproxOptions,
    config: &ApproxConfig,
) -> Result<Approx, MatchError> {
    let expected = expected.into();
    match expected {
        Value::DateTime(_) | Value::Duration(_) => {
            let tolerance = match options.abs {
                None => config.temporal_tolerance(),
                Some(Tolerance::Time(tolerance)) => tolerance,
                Some(Tolerance::Number(n)) => {
                    return Err(MatchError::InvalidTolerance(format!(
                        "temporal comparison needs a time tolerance, got {n:?}"
                    )))
                }
            };
            ApproxTemporal::new(expected, tolerance).map(Approx::Temporal)
        }
        _ => {
            let abs = match options.abs {
                None => None,
                Some(Tolerance::Number(n)) => Some(n),
                Some(Tolerance::Time(t)) => {
                    return Err(MatchError::InvalidTolerance(format!(
                        "numeric comparison needs a numeric tolerance, got {}",
                        format_delta(&t)
                    )))
                }
            };
            ApproxNumber::new(expected, options.rel, abs, options.nan_ok, config)
                .map(Approx::Numeric)
        }
    }
}

/// Result of [`approx`]: one of the two comparators.
#[derive(Debug, Clone, PartialEq)]
pub enum Approx {
    Temporal(ApproxTemporal),
    Numeric(ApproxNumber),
}

impl Matches for Approx {
    fn matches(&self, actual: &Value) -> Result<bool, MatchError> {
        match self {
            Approx::Temporal(matcher) => matcher.matches(actual),
            Approx::Numeric(matcher) => matcher.matches(actual),
        }
    }
}

impl fmt::Display for Approx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Approx::Temporal(matcher) => write!(f, "{matcher}"),
            Approx::Numeric(matcher) => write!(f, "{matcher}"),
        }
    }
}

/// Equals an instant (or duration) within an absolute tolerance.
#[derive(Debug, Clone, PartialEq)]
pub struct ApproxTemporal {
    expected: Value,
    tolerance: TimeDelta,
}

impl ApproxTemporal {
    pub fn new(expected: impl Into<Value>, tolerance: TimeDelta) -> Result<Self, MatchError> {
        let expected = expected.into();
        if !matches!(expected, Value::DateTime(_) | Value::Duration(_)) {
            return Err(MatchError::InvalidTolerance(format!(
                "temporal approx needs a datetime or duration, got {}",
                expected.kind()
            )));
        }
        if tolerance < TimeDelta::zero() {
            return Err(MatchError::InvalidTolerance(format!(
                "absolute tolerance can't be negative: {}",
                format_delta(&tolerance)
            )));
        }
        Ok(Self {
            expected,
            tolerance,
        })
    }

    pub fn tolerance(&self) -> TimeDelta {
        self.tolerance
    }
}

impl Matches for ApproxTemporal {
    fn matches(&self, actual: &Value) -> Result<bool, MatchError> {
        let difference = match (&self.expected, actual) {
            (Value::DateTime(expected), Value::DateTime(actual)) => {
                expected.signed_duration_since(*actual)
            }
            (Value::Duration(expected), Value::Duration(actual)) => {
                // too far apart to even represent the gap
                let Some(difference) = expected.checked_sub(actual) else {
                    return Ok(false);
                };
                difference
            }
            (expected, actual) => {
                return Err(MatchError::NotTemporal {
                    matcher: self.to_string(),
                    expected: expected.kind(),
                    found: actual.kind(),
                })
            }
        };
        let magnitude = if difference < TimeDelta::zero() {
            -difference
        } else {
            difference
        };
        Ok(magnitude <= self.tolerance)
    }
}

impl fmt::Display for ApproxTemporal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "approx({} ± {})",
            self.expected,
            format_delta(&self.tolerance)
        )
    }
}

/// Equals a number (or a list/map of numbers) within tolerance.
///
/// The tolerance for an expected value `e` is `max(rel * |e|, abs)`. When
/// only `abs` is given, the relative tolerance is not considered at all.
/// Infinities only equal themselves; NaN equals NaN only with `nan_ok`.
/// Non-numeric actual values do not match.
#[derive(Debug, Clone, PartialEq)]
pub struct ApproxNumber {
    expected: Value,
    rel: Option<f64>,
    abs: Option<f64>,
    default_rel: f64,
    default_abs: f64,
    nan_ok: bool,
}

impl ApproxNumber {
    pub fn new(
        expected: impl Into<Value>,
        rel: Option<f64>,
        abs: Option<f64>,
        nan_ok: bool,
        config: &ApproxConfig,
    ) -> Result<Self, MatchError> {
        let expected = expected.into();
        check_numeric(&expected)?;
        if let Some(rel) = rel {
            check_number_tolerance("rel", rel)?;
        }
        if let Some(abs) = abs {
            check_number_tolerance("abs", abs)?;
        }
        Ok(Self {
            expected,
            rel,
            abs,
            default_rel: config.rel,
            default_abs: config.abs,
            nan_ok,
        })
    }

    fn tolerance(&self, expected: f64) -> f64 {
        let abs = self.abs.unwrap_or(self.default_abs);
        if self.rel.is_none() && self.abs.is_some() {
            return abs;
        }
        let rel = self.rel.unwrap_or(self.default_rel) * expected.abs();
        rel.max(abs)
    }

    fn scalar_eq(&self, expected: f64, actual: f64) -> bool {
        if expected.is_nan() || actual.is_nan() {
            return self.nan_ok && expected.is_nan() && actual.is_nan();
        }
        if expected == actual {
            return true;
        }
        if expected.is_infinite() {
            return false;
        }
        (expected - actual).abs() <= self.tolerance(expected)
    }

    fn compare(&self, expected: &Value, actual: &Value) -> bool {
        match (expected, actual) {
            (Value::List(expected), Value::List(actual)) => {
                expected.len() == actual.len()
                    && expected
                        .iter()
                        .zip(actual)
                        .all(|(e, a)| self.compare(e, a))
            }
            (Value::Map(expected), Value::Map(actual)) => {
                expected.len() == actual.len()
                    && expected
                        .iter()
                        .all(|(k, e)| actual.get(k).is_some_and(|a| self.compare(e, a)))
            }
            (expected, actual) => match (expected.as_f64(), actual.as_f64()) {
                (Some(e), Some(a)) => self.scalar_eq(e, a),
                _ => false,
            },
        }
    }

    fn write_expected(&self, f: &mut fmt::Formatter<'_>, expected: &Value) -> fmt::Result {
        match expected {
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    self.write_expected(f, item)?;
                }
                f.write_str("]")
            }
            Value::Map(map) => {
                f.write_str("{")?;
                for (i, (key, item)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key:?}: ")?;
                    self.write_expected(f, item)?;
                }
                f.write_str("}")
            }
            scalar => {
                let tolerance = scalar.as_f64().map_or(0.0, |e| self.tolerance(e));
                write!(f, "{scalar} ± {tolerance:.1e}")
            }
        }
    }
}

fn check_numeric(expected: &Value) -> Result<(), MatchError> {
    match expected {
        Value::Int(_) | Value::Float(_) => Ok(()),
        Value::List(items) => items.iter().try_for_each(check_numeric),
        Value::Map(map) => map.values().try_for_each(check_numeric),
        other => Err(MatchError::NotNumeric {
            found: other.kind(),
        }),
    }
}

impl Matches for ApproxNumber {
    fn matches(&self, actual: &Value) -> Result<bool, MatchError> {
        Ok(self.compare(&self.expected, actual))
    }
}

impl fmt::Display for ApproxNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("approx(")?;
        self.write_expected(f, &self.expected)?;
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};
    use serde_json::json;

    use super::*;
    use crate::value::Kind;

    fn instant() -> DateTime<Utc> {
        let Some(instant) = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single() else {
            panic!("invalid date components");
        };
        instant
    }

    fn build(expected: impl Into<Value>, options: ApproxOptions) -> Approx {
        match approx(expected, options, &ApproxConfig::default()) {
            Ok(matcher) => matcher,
            Err(err) => panic!("approx should build: {err}"),
        }
    }

    #[test]
    fn datetime_within_default_tolerance() {
        let matcher = build(instant(), ApproxOptions::default());
        let half = Value::from(instant() + TimeDelta::milliseconds(500));
        let two = Value::from(instant() + TimeDelta::seconds(2));
        let earlier = Value::from(instant() - TimeDelta::milliseconds(999));
        assert_eq!(matcher.matches(&half), Ok(true));
        assert_eq!(matcher.matches(&earlier), Ok(true));
        assert_eq!(matcher.matches(&two), Ok(false));
        assert_eq!(matcher.to_string(), "approx(2024-01-01T00:00:00Z ± 1s)");
    }

    #[test]
    fn datetime_ignores_rel_and_uses_abs() {
        let options = ApproxOptions::default()
            .rel(0.5)
            .abs(TimeDelta::seconds(5));
        let matcher = build(instant(), options);
        let later = Value::from(instant() + TimeDelta::seconds(4));
        assert_eq!(matcher.matches(&later), Ok(true));
    }

    #[test]
    fn negative_temporal_tolerance_is_rejected() {
        let options = ApproxOptions::default().abs(TimeDelta::seconds(-1));
        let Err(err) = approx(instant(), options, &ApproxConfig::default()) else {
            panic!("negative tolerance should be rejected");
        };
        assert!(matches!(err, MatchError::InvalidTolerance(_)));
        assert!(err.is_precondition_violation());
    }

    #[test]
    fn durations_use_the_temporal_comparator() {
        let matcher = build(TimeDelta::seconds(10), ApproxOptions::default());
        assert!(matches!(matcher, Approx::Temporal(_)));
        let close = Value::from(TimeDelta::milliseconds(10_400));
        assert_eq!(matcher.matches(&close), Ok(true));
    }

    #[test]
    fn temporal_rejects_other_kinds() {
        let matcher = build(instant(), ApproxOptions::default());
        assert!(matches!(
            matcher.matches(&Value::from("2024-01-01T00:00:00Z")),
            Err(MatchError::NotTemporal { .. })
        ));
        assert!(matches!(
            matcher.matches(&Value::from(TimeDelta::seconds(1))),
            Err(MatchError::NotTemporal { .. })
        ));
    }

    #[test]
    fn numbers_use_relative_tolerance_by_default() {
        let matcher = build(0.3, ApproxOptions::default());
        assert_eq!(matcher.matches(&Value::from(0.1 + 0.2)), Ok(true));
        assert_eq!(matcher.matches(&Value::from(0.31)), Ok(false));
        assert_eq!(matcher.matches(&Value::from("0.3")), Ok(false));
    }

    #[test]
    fn only_abs_disables_relative_tolerance() {
        let matcher = build(1_000_000.0, ApproxOptions::default().abs(0.1));
        assert_eq!(matcher.matches(&Value::from(1_000_000.05)), Ok(true));
        assert_eq!(matcher.matches(&Value::from(1_000_000.5)), Ok(false));
    }

    #[test]
    fn nan_needs_nan_ok() {
        let strict = build(f64::NAN, ApproxOptions::default());
        let lenient = build(f64::NAN, ApproxOptions::default().nan_ok(true));
        assert_eq!(strict.matches(&Value::from(f64::NAN)), Ok(false));
        assert_eq!(lenient.matches(&Value::from(f64::NAN)), Ok(true));
    }

    #[test]
    fn infinity_only_equals_itself() {
        let matcher = build(f64::INFINITY, ApproxOptions::default().abs(1e300));
        assert_eq!(matcher.matches(&Value::from(f64::INFINITY)), Ok(true));
        assert_eq!(matcher.matches(&Value::from(f64::MAX)), Ok(false));
    }

    #[test]
    fn collections_of_numbers_compare_elementwise() {
        let matcher = build(json!({"x": [1.0, 2.0], "y": 3}), ApproxOptions::default());
        let close = Value::from(json!({"x": [1.0000001, 2.0], "y": 3.0000001}));
        let far = Value::from(json!({"x": [1.1, 2.0], "y": 3}));
        assert_eq!(matcher.matches(&close), Ok(true));
        assert_eq!(matcher.matches(&far), Ok(false));
    }

    #[test]
    fn non_numeric_expectations_are_rejected() {
        assert!(matches!(
            approx("3", ApproxOptions::default(), &ApproxConfig::default()),
            Err(MatchError::NotNumeric { found: Kind::Str })
        ));
        assert!(matches!(
            approx(json!([1, "x"]), ApproxOptions::default(), &ApproxConfig::default()),
            Err(MatchError::NotNumeric { .. })
        ));
    }

    #[test]
    fn invalid_numeric_tolerances_are_rejected() {
        let config = ApproxConfig::default();
        for options in [
            ApproxOptions::default().rel(-1.0),
            ApproxOptions::default().abs(f64::NAN),
            ApproxOptions::default().abs(TimeDelta::seconds(1)),
        ] {
            assert!(matches!(
                approx(1.0, options, &config),
                Err(MatchError::InvalidTolerance(_))
            ));
        }
    }

    #[test]
    fn numeric_repr_shows_tolerance() {
        let matcher = build(1.5, ApproxOptions::default());
        assert_eq!(matcher.to_string(), "approx(1.5 ± 1.5e-6)");
    }

    #[test]
    fn distant_durations_do_not_overflow() {
        let matcher = build(TimeDelta::MAX, ApproxOptions::default());
        assert_eq!(matcher.matches(&Value::from(TimeDelta::MIN)), Ok(false));
        assert_eq!(matcher.matches(&Value::from(TimeDelta::MAX)), Ok(true));

        let matcher = build(TimeDelta::MIN, ApproxOptions::default());
        assert_eq!(matcher.matches(&Value::from(TimeDelta::MAX)), Ok(false));
    }

    #[test]
    fn sub_millisecond_tolerance_is_kept() {
        let config = ApproxConfig::default().with_temporal_tolerance(TimeDelta::microseconds(500));
        assert_eq!(config.temporal_tolerance(), TimeDelta::microseconds(500));

        let matcher = match approx(instant(), ApproxOptions::default(), &config) {
            Ok(matcher) => matcher,
            Err(err) => panic!("approx should build: {err}"),
        };
        let close = Value::from(instant() + TimeDelta::microseconds(400));
        let far = Value::from(instant() + TimeDelta::microseconds(600));
        assert_eq!(matcher.matches(&close), Ok(true));
        assert_eq!(matcher.matches(&far), Ok(false));
    }

    #[test]
    fn config_validation() {
        assert!(ApproxConfig::default().validate().is_ok());
        assert!(ApproxConfig::default().with_rel(-0.1).validate().is_err());
        let negative = ApproxConfig::default().with_temporal_tolerance(TimeDelta::seconds(-2));
        assert!(negative.validate().is_err());
    }
}
