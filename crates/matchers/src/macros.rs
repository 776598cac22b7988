//! Keyword-style constructors.
//!
//! Keys are identifiers or string literals, values are anything convertible
//! into [`Expected`](crate::Expected):
//!
//! ```rust
//! use matchers::{dict, m, unordered, Matcher, Value};
//! use serde_json::json;
//!
//! let payload = Value::from(json!({
//!     "data": {"count": 3, "tags": ["b", "a"]},
//!     "request-id": "f3a1",
//! }));
//! assert!(payload == dict! {
//!     data = m! { count = 3, tags = unordered!["a", "b"] },
//!     "request-id" = Matcher::ANY,
//! });
//! ```

#[doc(hidden)]
#[macro_export]
macro_rules! __matcher_key {
    ($key:ident) => {
        ::std::string::String::from(::std::stringify!($key))
    };
    ($key:literal) => {
        ::std::string::String::from($key)
    };
}

/// Builds an [`Attrs`](crate::Attrs) matcher.
#[macro_export]
macro_rules! attrs {
    ($($key:tt = $value:expr),* $(,)?) => {{
        let entries: ::std::vec::Vec<(::std::string::String, $crate::Expected)> =
            ::std::vec![$(($crate::__matcher_key!($key), $crate::Expected::from($value))),*];
        $crate::Attrs::new(entries)
    }};
}

/// Shorthand for [`attrs!`], mirroring `Matcher::new`.
#[macro_export]
macro_rules! m {
    ($($tokens:tt)*) => {
        $crate::attrs!($($tokens)*)
    };
}

/// Builds a partial-mapping [`Dict`](crate::Dict) matcher.
#[macro_export]
macro_rules! dict {
    ($($key:tt = $value:expr),* $(,)?) => {{
        let entries: ::std::vec::Vec<(::std::string::String, $crate::Expected)> =
            ::std::vec![$(($crate::__matcher_key!($key), $crate::Expected::from($value))),*];
        $crate::Dict::new(entries)
    }};
}

#[macro_export]
macro_rules! unordered {
    ($($item:expr),* $(,)?) => {{
        let items: ::std::vec::Vec<$crate::Expected> =
            ::std::vec![$($crate::Expected::from($item)),*];
        $crate::Unordered::new(items)
    }};
}

#[macro_export]
macro_rules! any_of {
    ($($candidate:expr),* $(,)?) => {{
        let candidates: ::std::vec::Vec<$crate::Value> =
            ::std::vec![$($crate::Value::from($candidate)),*];
        $crate::AnyOf::new(candidates)
    }};
}

/// An exact-length list whose items may be matchers.
#[macro_export]
macro_rules! list {
    ($($item:expr),* $(,)?) => {
        $crate::Expected::List(::std::vec![$($crate::Expected::from($item)),*])
    };
}

/// Asserts that `actual` matches `expected`, with an optional
/// `format!`-style description.
///
/// ```rust,should_panic
/// use matchers::{assert_match, dict};
/// use serde_json::json;
///
/// assert_match!(json!({"id": 1}), dict! { id = 2 }, "record {}", 1);
/// ```
#[macro_export]
macro_rules! assert_match {
    ($actual:expr, $expected:expr $(,)?) => {
        $crate::assert::assert_match_at(
            $crate::Value::from($actual),
            $crate::Expected::from($expected),
            ::std::option::Option::None,
            ::std::concat!(::std::file!(), ":", ::std::line!()),
        )
    };
    ($actual:expr, $expected:expr, $($description:tt)+) => {
        $crate::assert::assert_match_at(
            $crate::Value::from($actual),
            $crate::Expected::from($expected),
            ::std::option::Option::Some(::std::format!($($description)+).as_str()),
            ::std::concat!(::std::file!(), ":", ::std::line!()),
        )
    };
}
