//! Matchers
//!
//! Placeholder values that take part in `==` against dynamic data, so a test
//! can assert on the parts of a structure it cares about and wave the rest
//! through.
//!
//! ## What's in here
//!
//! - **Value model** - [`Value`] lifts JSON, primitives, `chrono` instants and
//!   anything `Serialize` into one comparable tree.
//! - **Matchers** - wildcard, regex search, type membership, set membership,
//!   partial mappings, attribute bags, order-insensitive sequences and
//!   approximate numbers/instants. They nest anywhere inside lists and maps.
//! - **Facade** - [`Matcher`] (alias [`M`]) plus the `m!`, `dict!`,
//!   `unordered!`, `any_of!` and `list!` macros for keyword-style building.
//! - **Diagnostics** - [`assert_match!`] prints both sides and the call site.
//!
//! A mismatch is `false`. Handing a matcher an operand it cannot judge (a
//! regex against an integer) is a [`MatchError`], and inside `==` that error
//! panics so the test fails loudly.
//!
//! ## Example
//!
//! ```
//! use matchers::{assert_match, dict, m, Kind, Matcher, Value};
//! use serde_json::json;
//!
//! let response = json!({
//!     "id": "4f2c",
//!     "data": {"count": 3, "items": [1, 2, 3]},
//!     "elapsed": 0.0123,
//! });
//!
//! assert_match!(
//!     response,
//!     dict! {
//!         id = Matcher::regex("^[0-9a-f]+$").unwrap(),
//!         data = m! { count = 3 },
//!         elapsed = Matcher::instance_of(Kind::Float),
//!     }
//! );
//! ```
//!
mod approx;
mod composite;
mod error;
mod expected;
mod facade;
mod macros;
mod primitive;
mod value;

#[doc(hidden)]
pub mod assert;

pub use crate::approx::{
    approx, Approx, ApproxConfig, ApproxNumber, ApproxOptions, ApproxTemporal, Tolerance,
    DEFAULT_ABS_TOLERANCE, DEFAULT_REL_TOLERANCE, DEFAULT_TEMPORAL_TOLERANCE_MS,
};
pub use crate::assert::Mismatch;
pub use crate::composite::{Attrs, Dict, Unordered};
pub use crate::error::MatchError;
pub use crate::expected::{Expected, Matches};
pub use crate::facade::{Matcher, M};
pub use crate::primitive::{Any, AnyOf, InstanceOf, Kinds, Regex, RegexFlags};
pub use crate::value::{Kind, Object, Value};
