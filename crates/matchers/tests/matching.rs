//! End-to-end behaviour of the matcher algebra against realistic payloads.

use chrono::{TimeDelta, TimeZone, Utc};
use serde::Serialize;
use serde_json::json;

use matchers::{
    any_of, assert_match, dict, list, m, unordered, ApproxOptions, Expected, Kind, MatchError,
    Matcher, Matches, Object, RegexFlags, Value, M,
};

#[derive(Serialize)]
struct Invoice {
    id: u64,
    total: f64,
    customer: Customer,
    lines: Vec<String>,
}

#[derive(Serialize)]
struct Customer {
    name: String,
    vip: bool,
}

fn invoice() -> Invoice {
    Invoice {
        id: 42,
        total: 99.95,
        customer: Customer {
            name: "Ada".into(),
            vip: true,
        },
        lines: vec!["widget".into(), "gizmo".into()],
    }
}

#[test]
fn wildcard_matches_falsy_values() {
    for value in [json!(null), json!(""), json!(0), json!(false), json!([]), json!({})] {
        assert!(Value::from(value) == Matcher::ANY);
    }
}

#[test]
fn regex_search_semantics() {
    let matcher = M::regex("^Something went wrong: 5[0-9]{2}$").unwrap();
    assert!(Value::from("Something went wrong: 523") == matcher);
    assert!(Value::from("Something went wrong: 423") != matcher);

    let inner = M::re("went").unwrap();
    assert!(Value::from("Something went wrong") == inner);

    let ci = M::regex_with_flags("ERROR", RegexFlags::default().case_insensitive()).unwrap();
    assert!(Value::bytes(b"an error occurred".to_vec()) == ci);
}

#[test]
fn regex_against_a_number_is_a_precondition_violation() {
    let matcher = M::regex("1").unwrap();
    let err = matcher.matches(&Value::from(1)).unwrap_err();
    assert!(err.is_precondition_violation());
    assert!(matches!(err, MatchError::NotText { found: Kind::Int, .. }));
}

#[test]
fn instance_of_alternatives() {
    let matcher = M::instance_of([Kind::Int, Kind::Float]);
    assert!(Value::from(1) == matcher);
    assert!(Value::from(1.0) == matcher);
    assert!(Value::from("1") != matcher);
}

#[test]
fn set_membership_and_reversed_containment() {
    let matcher = any_of!["a", "b"];
    assert!(Value::from("a") == matcher);
    assert!(Value::from("c") != matcher);
    assert!(matcher.contained_in(&Value::from(vec!["z", "b"])).unwrap());
    assert!(!matcher.contained_in(&Value::from(vec!["z"])).unwrap());
}

#[test]
fn partial_mapping_checks_listed_keys_only() {
    let actual = Value::from(json!({"a": 1, "b": 2, "c": 3}));
    assert!(actual == dict! { a = 1, b = 2 });
    assert!(actual != dict! { a = 1, d = 4 });
    assert!(actual == dict! {});
}

#[test]
fn attribute_bag_on_serialized_struct() {
    let actual = Value::object(&invoice()).unwrap();
    assert!(actual == m! { id = 42, customer = m! { vip = true } });
    assert!(actual == M::instance_of(Kind::named("Invoice")));

    let err = m! { currency = "EUR" }.matches(&actual).unwrap_err();
    assert!(matches!(
        err,
        MatchError::MissingAttribute { ref attribute, .. } if attribute == "currency"
    ));
}

#[test]
#[should_panic(expected = "precondition violated")]
fn missing_attribute_inside_eq_panics() {
    let point = Value::from(Object::new("Point").with("x", 1));
    let _ = point == m! { z = 0 };
}

#[test]
fn unordered_is_a_multiset_comparison() {
    assert!(Value::from(vec![3, 1, 2]) == unordered![1, 2, 3]);
    assert!(Value::from(vec![1, 2]) != unordered![1, 2, 3]);
    assert!(Value::from(vec![1, 1, 2]) != unordered![1, 2, 2]);
    assert!(Value::from(json!([{"id": 2}, {"id": 1}])) == unordered![dict! { id = 1 }, dict! { id = 2 }]);
}

#[test]
fn approx_temporal_default_tolerance() {
    let start = Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap();
    let matcher = M::approx(start).unwrap();
    assert!(Value::from(start + TimeDelta::milliseconds(500)) == matcher);
    assert!(Value::from(start + TimeDelta::seconds(2)) != matcher);

    let wide = M::approx_with(start, ApproxOptions::default().abs(TimeDelta::seconds(3))).unwrap();
    assert!(Value::from(start + TimeDelta::seconds(2)) == wide);
}

#[test]
fn approx_numbers_inside_structures() {
    let actual = Value::object(&invoice()).unwrap();
    assert!(actual == m! { total = M::approx(99.95000001).unwrap() });
    assert!(actual != m! { total = M::approx(100).unwrap() });
}

#[test]
fn nesting_dict_with_attrs() {
    let actual = Value::from(json!({"data": {"count": 3, "next": null}, "status": 200}));
    assert!(actual == dict! { data = m! { count = 3 } });
    assert!(actual != dict! { data = m! { count = 4 } });
}

#[test]
fn matchers_are_stateless_across_comparisons() {
    let matcher = dict! { a = unordered![1, 2], b = M::re("^x").unwrap() };
    let actual = Value::from(json!({"a": [2, 1], "b": "xyz"}));
    let first = matcher.matches(&actual).unwrap();
    let second = matcher.matches(&actual).unwrap();
    assert!(first);
    assert_eq!(first, second);
}

#[test]
fn exact_lists_mix_values_and_matchers() {
    let actual = json!(["GET", "/users/17", 200]);
    assert_match!(actual, list!["GET", M::re(r"^/users/\d+$").unwrap(), any_of![200, 204]]);
}

#[test]
fn expected_trees_from_plain_containers() {
    let expected = Expected::from(vec![Expected::from(Matcher::ANY), Expected::from("b")]);
    assert!(Value::from(vec!["a", "b"]) == expected);
}

#[test]
fn reprs_reproduce_constructor_forms() {
    assert_eq!(
        dict! { a = 1, b = Matcher::ANY }.to_string(),
        "dict(a=1, b=any)"
    );
    assert_eq!(unordered![1, 2].to_string(), "unordered(1, 2)");
    assert_eq!(any_of![3, 1, 2].to_string(), "any_of(1, 2, 3)");
    assert_eq!(
        M::instance_of([Kind::Int, Kind::Str]).to_string(),
        "instance_of((int, str))"
    );
}

#[test]
#[should_panic(expected = "expected: dict(status=\"done\")")]
fn assert_match_reports_expected_repr() {
    assert_match!(json!({"status": "queued"}), dict! { status = "done" }, "job status");
}
