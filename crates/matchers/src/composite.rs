//! Matchers that recurse into the structure of the other operand.
//!
//! Every sub-value is an [`Expected`], so composites nest freely:
//! `dict(data=attrs(count=3))` is evaluated by `Dict` handing the `data`
//! entry to `Attrs`, which in turn compares `count` as a plain value.
use std::fmt;

use tracing::trace;

use crate::error::MatchError;
use crate::expected::{Expected, Matches};
use crate::value::{write_joined, Value};

static NULL: Value = Value::Null;

/// Insertion-ordered `name -> Expected` entries. A repeated name replaces
/// the earlier value in place.
#[derive(Debug, Clone, Default)]
struct Entries(Vec<(String, Expected)>);

impl Entries {
    fn collect<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Expected>,
    {
        let mut collected = Entries::default();
        collected.extend(entries);
        collected
    }

    fn extend<I, K, V>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Expected>,
    {
        for (key, value) in entries {
            let key = key.into();
            let value = value.into();
            match self.0.iter_mut().find(|(existing, _)| *existing == key) {
                Some(slot) => slot.1 = value,
                None => self.0.push((key, value)),
            }
        }
    }

    fn get(&self, key: &str) -> Option<&Expected> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

impl fmt::Display for Entries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_joined(f, self.0.iter().map(|(k, v)| format!("{k}={v}")))
    }
}

/// Partial mapping match: listed keys must be present with equal values,
/// unlisted keys of the other mapping are ignored.
///
/// An absent key is looked up as `null`, so `dict(a=null)` also matches a
/// mapping without `a`.
///
/// ```rust
/// use matchers::{dict, Value};
/// use serde_json::json;
///
/// let response = Value::from(json!({"a": 1, "b": 2, "c": 3}));
/// assert!(response == dict! { a = 1, b = 2 });
/// assert!(response != dict! { a = 1, b = 9 });
/// assert!(response != dict! { z = 1 });
/// ```
#[derive(Debug, Clone, Default)]
pub struct Dict {
    entries: Entries,
}

impl Dict {
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Expected>,
    {
        Self {
            entries: Entries::collect(entries),
        }
    }

    /// Builds from a base mapping, then applies overrides on top of it.
    pub fn with_overrides<I, K, V, O, OK, OV>(mapping: I, overrides: O) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Expected>,
        O: IntoIterator<Item = (OK, OV)>,
        OK: Into<String>,
        OV: Into<Expected>,
    {
        let mut entries = Entries::collect(mapping);
        entries.extend(overrides);
        Self { entries }
    }

    /// Number of listed keys.
    pub fn len(&self) -> usize {
        self.entries.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Expected> {
        self.entries.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.0.iter().map(|(k, _)| k.as_str())
    }
}

impl Matches for Dict {
    fn matches(&self, actual: &Value) -> Result<bool, MatchError> {
        let Value::Map(map) = actual else {
            return Err(MatchError::NotMapping {
                matcher: self.to_string(),
                found: actual.kind(),
            });
        };
        for (key, expected) in &self.entries.0 {
            let value = map.get(key).unwrap_or(&NULL);
            if !expected.matches(value)? {
                trace!(key = %key, expected = %expected, actual = %value, "dict_key_mismatch");
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl fmt::Display for Dict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dict({})", self.entries)
    }
}

/// Attribute bag match: every named attribute must exist on the other
/// operand and compare equal.
///
/// Objects expose their fields as attributes. Maps expose their keys too,
/// which lets nested serialized structs be matched with nested `Attrs`. A
/// missing attribute is a precondition violation, not a mismatch.
///
/// [`Value::object`] only names the outermost struct: nested structs arrive
/// as plain maps, so `instance_of(Kind::named(..))` on a nested field does
/// not match. Check nested fields with `attrs`/`dict`, or build the nested
/// [`Object`](crate::Object) by hand.
#[derive(Debug, Clone, Default)]
pub struct Attrs {
    attributes: Entries,
}

impl Attrs {
    pub fn new<I, K, V>(attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Expected>,
    {
        Self {
            attributes: Entries::collect(attributes),
        }
    }

    pub fn len(&self) -> usize {
        self.attributes.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.0.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Expected> {
        self.attributes.get(name)
    }
}

impl Matches for Attrs {
    fn matches(&self, actual: &Value) -> Result<bool, MatchError> {
        for (name, expected) in &self.attributes.0 {
            let value = actual
                .get(name)
                .ok_or_else(|| MatchError::MissingAttribute {
                    matcher: self.to_string(),
                    attribute: name.clone(),
                    found: actual.kind(),
                })?;
            if !expected.matches(value)? {
                trace!(attribute = %name, expected = %expected, actual = %value, "attr_mismatch");
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl fmt::Display for Attrs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "attrs({})", self.attributes)
    }
}

/// Order-insensitive sequence match.
///
/// Equal when both sides have the same length and every actual element can
/// be paired with a distinct expected item. Items may be matchers, and
/// nothing needs to be orderable.
#[derive(Debug, Clone, Default)]
pub struct Unordered {
    items: Vec<Expected>,
}

impl Unordered {
    pub fn new<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Expected>,
    {
        Self {
            items: items.into_iter().map(Into::into).collect(),
        }
    }

    pub fn items(&self) -> &[Expected] {
        &self.items
    }
}

impl Matches for Unordered {
    fn matches(&self, actual: &Value) -> Result<bool, MatchError> {
        let elements: Vec<Value> = match actual {
            Value::List(items) => items.clone(),
            Value::Map(map) => map.keys().cloned().map(Value::Str).collect(),
            other => {
                return Err(MatchError::NotIterable {
                    matcher: self.to_string(),
                    found: other.kind(),
                })
            }
        };
        if elements.len() != self.items.len() {
            return Ok(false);
        }

        // Which elements each item accepts, evaluated once per pair.
        let mut first_error = None;
        let mut accepted: Vec<Vec<usize>> = Vec::with_capacity(self.items.len());
        for item in &self.items {
            let mut indices = Vec::new();
            for (index, element) in elements.iter().enumerate() {
                match item.matches(element) {
                    Ok(true) => indices.push(index),
                    Ok(false) => {}
                    Err(err) => {
                        first_error.get_or_insert(err);
                    }
                }
            }
            accepted.push(indices);
        }

        if pair_all(&accepted, elements.len()) {
            return Ok(true);
        }
        // A pairing that errored may have been the only one that could work.
        match first_error {
            Some(err) => Err(err),
            None => Ok(false),
        }
    }
}

/// Whether every item can be paired with a distinct element, given the
/// elements each item accepts. Augmenting-path bipartite matching.
fn pair_all(accepted: &[Vec<usize>], elements: usize) -> bool {
    let mut owner: Vec<Option<usize>> = vec![None; elements];
    for item in 0..accepted.len() {
        let mut visited = vec![false; elements];
        if !augment(item, accepted, &mut owner, &mut visited) {
            return false;
        }
    }
    true
}

fn augment(
    item: usize,
    accepted: &[Vec<usize>],
    owner: &mut [Option<usize>],
    visited: &mut [bool],
) -> bool {
    for &element in &accepted[item] {
        if visited[element] {
            continue;
        }
        visited[element] = true;
        let free = match owner[element] {
            None => true,
            Some(other) => augment(other, accepted, owner, visited),
        };
        if free {
            owner[element] = Some(item);
            return true;
        }
    }
    false
}

impl fmt::Display for Unordered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unordered(")?;
        write_joined(f, self.items.iter())?;
        f.write_str(")")
    }
}
