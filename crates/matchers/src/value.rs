//! Dynamic value model that matchers compare against.
//!
//! Test data (decoded API responses, config trees, serialized structs) is
//! lifted into [`Value`] so that a single comparison algebra can walk it.
//! Conversions exist for Rust primitives, `chrono` instants and durations,
//! `serde_json::Value`, and anything implementing `serde::Serialize`.
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::{DateTime, FixedOffset, SecondsFormat, TimeDelta, Utc};
use serde::Serialize;
use serde_json::Value as JsonValue;

/// A dynamically typed value.
///
/// `Int` and `Float` compare numerically with each other, so `1 == 1.0`.
/// The comparison is exact: `2^53 + 1` does not equal the float `2^53`.
/// Everything else compares structurally and only within the same variant.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    DateTime(DateTime<Utc>),
    Duration(TimeDelta),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Object(Object),
}

/// A named bag of attributes, the dynamic counterpart of a Rust struct.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Object {
    type_name: String,
    fields: BTreeMap<String, Value>,
}

impl Object {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style attribute setter.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }
}

impl Value {
    /// Wraps raw bytes. `Vec<u8>` on its own converts into a list of ints.
    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Value::Bytes(bytes.into())
    }

    /// Lifts any serializable value through its JSON form.
    ///
    /// Structs become [`Value::Map`]; use [`Value::object`] to keep the type
    /// name.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(value).map(Value::from)
    }

    /// Lifts a serializable struct into a [`Value::Object`] named after its
    /// Rust type, so it can be checked with `instance_of` and `attrs`.
    ///
    /// Only the top level keeps its type name. Nested structs go through
    /// serde as plain maps and become [`Value::Map`].
    ///
    /// ```rust
    /// use matchers::{Kind, Value};
    ///
    /// #[derive(serde::Serialize)]
    /// struct User {
    ///     name: String,
    /// }
    ///
    /// let value = Value::object(&User { name: "ada".into() }).unwrap();
    /// assert_eq!(value.kind(), Kind::Named("User".into()));
    /// assert_eq!(value.get("name"), Some(&Value::from("ada")));
    /// ```
    pub fn object<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        let type_name = short_type_name(std::any::type_name::<T>());
        match serde_json::to_value(value)? {
            JsonValue::Object(map) => Ok(Value::Object(Object {
                type_name,
                fields: map.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
            })),
            other => Ok(Value::from(other)),
        }
    }

    pub fn kind(&self) -> Kind {
        Kind::of(self)
    }

    /// Key lookup on maps, attribute lookup on objects.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(map) => map.get(key),
            Value::Object(object) => object.get(key),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Total order across all values: variants are ranked, numbers compare
    /// numerically and containers lexicographically.
    ///
    /// Like [`f64::total_cmp`], this order is finer than `==` for floats
    /// (`-0.0` sorts before `0.0`, NaN sorts last).
    pub fn total_cmp(&self, other: &Value) -> Ordering {
        if self.rank() != other.rank() {
            return self.rank().cmp(&other.rank());
        }
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Str(a), Value::Str(b)) => a.cmp(b),
            (Value::Bytes(a), Value::Bytes(b)) => a.cmp(b),
            (Value::DateTime(a), Value::DateTime(b)) => a.cmp(b),
            (Value::Duration(a), Value::Duration(b)) => a.cmp(b),
            (Value::List(a), Value::List(b)) => cmp_lists(a, b),
            (Value::Map(a), Value::Map(b)) => cmp_maps(a, b),
            (Value::Object(a), Value::Object(b)) => a
                .type_name
                .cmp(&b.type_name)
                .then_with(|| cmp_maps(&a.fields, &b.fields)),
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
            (Value::Int(i), Value::Float(f)) => int_float_total_cmp(*i, *f),
            (Value::Float(f), Value::Int(i)) => int_float_total_cmp(*i, *f).reverse(),
            // ranks differ, handled above
            _ => Ordering::Equal,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Int(_) | Value::Float(_) => 2,
            Value::Str(_) => 3,
            Value::Bytes(_) => 4,
            Value::DateTime(_) => 5,
            Value::Duration(_) => 6,
            Value::List(_) => 7,
            Value::Map(_) => 8,
            Value::Object(_) => 9,
        }
    }
}

fn cmp_lists(a: &[Value], b: &[Value]) -> Ordering {
    for (x, y) in a.iter().zip(b) {
        match x.total_cmp(y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    a.len().cmp(&b.len())
}

fn cmp_maps(a: &BTreeMap<String, Value>, b: &BTreeMap<String, Value>) -> Ordering {
    for ((ka, va), (kb, vb)) in a.iter().zip(b) {
        match ka.cmp(kb).then_with(|| va.total_cmp(vb)) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    a.len().cmp(&b.len())
}

/// Exact comparison of an integer with a float, without rounding the
/// integer through `f64`. `None` for NaN.
fn cmp_int_float(i: i64, f: f64) -> Option<Ordering> {
    // 2^63, exactly representable
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if f.is_nan() {
        return None;
    }
    if f >= LIMIT {
        return Some(Ordering::Less);
    }
    if f < -LIMIT {
        return Some(Ordering::Greater);
    }
    let whole = f.trunc();
    // in [-2^63, 2^63), so the cast is exact
    let ordering = i
        .cmp(&(whole as i64))
        .then_with(|| whole.partial_cmp(&f).unwrap_or(Ordering::Equal));
    Some(ordering)
}

/// [`cmp_int_float`] extended to a total order consistent with
/// [`f64::total_cmp`]: NaN goes to the end matching its sign, `-0.0` sorts
/// below the integer zero.
fn int_float_total_cmp(i: i64, f: f64) -> Ordering {
    match cmp_int_float(i, f) {
        None if f.is_sign_negative() => Ordering::Greater,
        None => Ordering::Less,
        Some(Ordering::Equal) if f == 0.0 && f.is_sign_negative() => Ordering::Greater,
        Some(ordering) => ordering,
    }
}

fn short_type_name(full: &str) -> String {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).to_string()
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(i), Value::Float(f)) | (Value::Float(f), Value::Int(i)) => {
                cmp_int_float(*i, *f) == Some(Ordering::Equal)
            }
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            (Value::Duration(a), Value::Duration(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x:?}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Bytes(b) => write!(f, "b\"{}\"", b.escape_ascii()),
            Value::DateTime(dt) => f.write_str(&dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Value::Duration(d) => f.write_str(&format_delta(d)),
            Value::List(items) => {
                f.write_str("[")?;
                write_joined(f, items.iter())?;
                f.write_str("]")
            }
            Value::Map(map) => {
                f.write_str("{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key:?}: {value}")?;
                }
                f.write_str("}")
            }
            Value::Object(object) => {
                write!(f, "{} {{", object.type_name)?;
                for (i, (name, value)) in object.fields.iter().enumerate() {
                    f.write_str(if i == 0 { " " } else { ", " })?;
                    write!(f, "{name}: {value}")?;
                }
                if object.fields.is_empty() {
                    f.write_str("}")
                } else {
                    f.write_str(" }")
                }
            }
        }
    }
}

pub(crate) fn write_joined<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    items: impl Iterator<Item = T>,
) -> fmt::Result {
    for (i, item) in items.enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

/// Compact duration rendering: `1s`, `250ms`, `15us`.
pub(crate) fn format_delta(delta: &TimeDelta) -> String {
    let (sign, magnitude) = if *delta < TimeDelta::zero() {
        ("-", -*delta)
    } else {
        ("", *delta)
    };
    match magnitude.num_microseconds() {
        Some(us) if us % 1_000_000 == 0 => format!("{sign}{}s", us / 1_000_000),
        Some(us) if us % 1_000 == 0 => format!("{sign}{}ms", us / 1_000),
        Some(us) => format!("{sign}{us}us"),
        None => format!("{sign}{}s", magnitude.num_seconds()),
    }
}

/// Runtime type of a [`Value`], used by `instance_of` and in diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Kind {
    Null,
    Bool,
    Int,
    Float,
    /// Either `Int` or `Float`.
    Number,
    Str,
    Bytes,
    DateTime,
    Duration,
    List,
    Map,
    /// Any object regardless of its type name.
    Object,
    /// An object with this exact type name.
    Named(String),
}

impl Kind {
    pub fn of(value: &Value) -> Kind {
        match value {
            Value::Null => Kind::Null,
            Value::Bool(_) => Kind::Bool,
            Value::Int(_) => Kind::Int,
            Value::Float(_) => Kind::Float,
            Value::Str(_) => Kind::Str,
            Value::Bytes(_) => Kind::Bytes,
            Value::DateTime(_) => Kind::DateTime,
            Value::Duration(_) => Kind::Duration,
            Value::List(_) => Kind::List,
            Value::Map(_) => Kind::Map,
            Value::Object(object) => Kind::Named(object.type_name.clone()),
        }
    }

    pub fn named(type_name: impl Into<String>) -> Kind {
        Kind::Named(type_name.into())
    }

    /// Runtime type-membership test.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (Kind::Number, Value::Int(_) | Value::Float(_)) => true,
            (Kind::Object, Value::Object(_)) => true,
            (Kind::Named(name), Value::Object(object)) => object.type_name == *name,
            (Kind::Named(_) | Kind::Object | Kind::Number, _) => false,
            (kind, value) => *kind == Kind::of(value),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Kind::Null => "null",
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Float => "float",
            Kind::Number => "number",
            Kind::Str => "str",
            Kind::Bytes => "bytes",
            Kind::DateTime => "datetime",
            Kind::Duration => "duration",
            Kind::List => "list",
            Kind::Map => "map",
            Kind::Object => "object",
            Kind::Named(name) => name,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Int(i64::from(value))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        i64::try_from(value).map_or(Value::Float(value as f64), Value::Int)
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        i64::try_from(value).map_or(Value::Float(value as f64), Value::Int)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(f64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Value::Str(value.clone())
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::Bytes(value.to_vec())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::DateTime(value)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Value::DateTime(value.with_timezone(&Utc))
    }
}

impl From<TimeDelta> for Value {
    fn from(value: TimeDelta) -> Self {
        Value::Duration(value)
    }
}

impl From<std::time::Duration> for Value {
    fn from(value: std::time::Duration) -> Self {
        TimeDelta::from_std(value).map_or(Value::Float(value.as_secs_f64()), Value::Duration)
    }
}

impl From<Object> for Value {
    fn from(value: Object) -> Self {
        Value::Object(value)
    }
}

impl From<&Value> for Value {
    fn from(value: &Value) -> Self {
        value.clone()
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::List(value.into_iter().map(Into::into).collect())
    }
}

impl<K: Into<String>, V: Into<Value>> From<BTreeMap<K, V>> for Value {
    fn from(value: BTreeMap<K, V>) -> Self {
        Value::Map(value.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K: Into<String>, V: Into<Value>> From<HashMap<K, V>> for Value {
    fn from(value: HashMap<K, V>) -> Self {
        Value::Map(value.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<V: Into<Value>> FromIterator<V> for Value {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Value::List(iter.into_iter().map(Into::into).collect())
    }
}

impl From<JsonValue> for Value {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Bool(b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => n.as_f64().map_or(Value::Null, Value::Float),
            },
            JsonValue::String(s) => Value::Str(s),
            JsonValue::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            JsonValue::Object(map) => {
                Value::Map(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<&JsonValue> for Value {
    fn from(value: &JsonValue) -> Self {
        Value::from(value.clone())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    #[test]
    fn ints_and_floats_compare_numerically() {
        assert_eq!(Value::from(1), Value::from(1.0));
        assert_ne!(Value::from(1), Value::from(1.5));
        assert_ne!(Value::from(1), Value::from("1"));
    }

    #[test]
    fn large_ints_and_floats_compare_exactly() {
        let two_53 = 1i64 << 53;
        let float = Value::Float(two_53 as f64);
        assert_eq!(float, Value::Int(two_53));
        assert_ne!(Value::Int(two_53 + 1), float);
        assert_ne!(float, Value::Int(two_53 + 1));

        assert_ne!(Value::Int(i64::MAX), Value::Float(9_223_372_036_854_775_808.0));
        assert_eq!(Value::Int(i64::MIN), Value::Float(-9_223_372_036_854_775_808.0));
        assert_ne!(Value::Int(0), Value::Float(f64::NAN));
        assert_eq!(Value::Int(0), Value::Float(-0.0));
        assert_ne!(Value::Int(2), Value::Float(2.5));
        assert_ne!(Value::Int(-2), Value::Float(-2.5));
    }

    #[test]
    fn total_cmp_orders_mixed_numbers_exactly() {
        let two_53 = 1i64 << 53;
        let float = Value::Float(two_53 as f64);
        assert_eq!(Value::Int(two_53 + 1).total_cmp(&float), Ordering::Greater);
        assert_eq!(float.total_cmp(&Value::Int(two_53 + 1)), Ordering::Less);
        assert_eq!(Value::Int(two_53).total_cmp(&float), Ordering::Equal);
        assert_eq!(Value::Int(-3).total_cmp(&Value::Float(-2.5)), Ordering::Less);
        assert_eq!(Value::Int(i64::MAX).total_cmp(&Value::Float(f64::INFINITY)), Ordering::Less);
        assert_eq!(Value::Int(i64::MIN).total_cmp(&Value::Float(f64::NAN)), Ordering::Less);
        assert_eq!(Value::Float(-0.0).total_cmp(&Value::Int(0)), Ordering::Less);
    }

    #[test]
    fn json_lifts_into_maps_and_lists() {
        let value = Value::from(json!({"a": [1, 2.5, null], "b": {"c": "d"}}));
        let Value::Map(map) = &value else {
            panic!("expected a map, got {value}");
        };
        assert_eq!(
            map["a"],
            Value::List(vec![Value::Int(1), Value::Float(2.5), Value::Null])
        );
        assert_eq!(value.get("b").and_then(|b| b.get("c")), Some(&Value::from("d")));
    }

    #[test]
    fn total_cmp_ranks_kinds_then_contents() {
        let mut values = vec![
            Value::from("b"),
            Value::from(3),
            Value::Null,
            Value::from(1.5),
            Value::from("a"),
            Value::from(true),
        ];
        values.sort_by(Value::total_cmp);
        assert_eq!(
            values,
            vec![
                Value::Null,
                Value::from(true),
                Value::from(1.5),
                Value::from(3),
                Value::from("a"),
                Value::from("b"),
            ]
        );
    }

    #[test]
    fn display_is_compact_literal_form() {
        let when = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let value = Value::from(json!({"name": "x", "tags": [1, 2]}));
        assert_eq!(value.to_string(), r#"{"name": "x", "tags": [1, 2]}"#);
        assert_eq!(Value::from(when).to_string(), "2024-01-01T00:00:00Z");
        assert_eq!(Value::from(TimeDelta::milliseconds(1500)).to_string(), "1500ms");
        assert_eq!(Value::bytes(b"a\n".to_vec()).to_string(), r#"b"a\n""#);
        assert_eq!(
            Value::from(Object::new("Point").with("x", 1).with("y", 2)).to_string(),
            "Point { x: 1, y: 2 }"
        );
    }

    #[test]
    fn kinds_accept_their_values() {
        assert!(Kind::Number.accepts(&Value::from(1)));
        assert!(Kind::Number.accepts(&Value::from(1.0)));
        assert!(!Kind::Int.accepts(&Value::from(1.0)));
        let point = Value::from(Object::new("Point"));
        assert!(Kind::Object.accepts(&point));
        assert!(Kind::named("Point").accepts(&point));
        assert!(!Kind::named("Line").accepts(&point));
        assert!(!Kind::Map.accepts(&point));
    }

    #[test]
    fn object_names_only_the_outer_struct() {
        #[derive(Serialize)]
        struct Customer {
            id: u32,
        }
        #[derive(Serialize)]
        struct Order {
            customer: Customer,
        }

        let value = Value::object(&Order { customer: Customer { id: 7 } }).unwrap();
        assert_eq!(value.kind(), Kind::named("Order"));
        let customer = value.get("customer").unwrap();
        assert_eq!(customer.kind(), Kind::Map);
        assert_eq!(customer.get("id"), Some(&Value::from(7)));
    }

    #[test]
    fn short_type_name_strips_path_and_generics() {
        assert_eq!(short_type_name("my_crate::api::User"), "User");
        assert_eq!(short_type_name("my_crate::Page<alloc::string::String>"), "Page");
    }
}
