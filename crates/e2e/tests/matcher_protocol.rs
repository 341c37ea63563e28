//! Matcher protocol tests
//!
//! Compares fixed observed lists against mental-model collections: present,
//! missing, deleted and restricted items.

use lockstep_e2e::{E2eError, Matcher, MentalModel, Probe, Value};
use test_case::test_case;

fn v(items: &[&str]) -> Vec<Value> {
    items.iter().map(|s| Value::from(*s)).collect()
}

/// Model with widgets foo and bar, where bar has been deleted
fn model_with_deleted_bar() -> MentalModel {
    let mut model = MentalModel::new();
    let widgets = model.collection("widgets");
    widgets.set("foo", "foo");
    widgets.set("bar", "bar");
    widgets.delete("bar").unwrap();
    model
}

fn outcome_lists(matcher: &Matcher) -> (Vec<Value>, Vec<Value>) {
    let outcome = matcher.outcome().expect("matcher was evaluated");
    (outcome.missing.clone(), outcome.unexpected_found.clone())
}

#[test_case(&[], false, &["foo"], &[] ; "nothing observed")]
#[test_case(&["foo"], true, &[], &[] ; "exact")]
#[test_case(&["foo", "bar"], true, &[], &[] ; "untracked extras ignored")]
fn test_expected_only(observed: &[&str], matched: bool, missing: &[&str], unexpected: &[&str]) {
    let mut model = MentalModel::new();
    model.collection("widgets").set("foo", "foo");

    let mut matcher = Matcher::new(&mut model, "widgets");
    assert_eq!(matcher.matches(v(observed)).unwrap(), matched);
    assert_eq!(outcome_lists(&matcher), (v(missing), v(unexpected)));
}

#[test_case(&["foo"], true, &[], &[] ; "deleted item absent")]
#[test_case(&["foo", "bar"], false, &[], &["bar"] ; "deleted item reappears")]
#[test_case(&["bar"], false, &["foo"], &["bar"] ; "both sides fail")]
fn test_deleted_items(observed: &[&str], matched: bool, missing: &[&str], unexpected: &[&str]) {
    let mut model = model_with_deleted_bar();

    let mut matcher = Matcher::new(&mut model, "widgets");
    assert_eq!(matcher.matches(v(observed)).unwrap(), matched);
    assert_eq!(outcome_lists(&matcher), (v(missing), v(unexpected)));
}

#[test_case(&["foo"], true ; "only foo shown")]
#[test_case(&["foo", "bar"], false ; "bar must be hidden")]
fn test_only(observed: &[&str], matched: bool) {
    let mut model = MentalModel::new();
    model.collection("widgets").set("foo", "foo");
    model.collection("widgets").set("bar", "bar");

    let mut matcher = Matcher::new(&mut model, "widgets").only(["foo"]);
    assert_eq!(matcher.matches(v(observed)).unwrap(), matched);
    if !matched {
        assert_eq!(outcome_lists(&matcher), (v(&[]), v(&["bar"])));
    }
}

#[test_case(&[], true ; "nothing shown")]
#[test_case(&["foo"], false ; "foo must be hidden")]
fn test_expecting_nothing(observed: &[&str], matched: bool) {
    let mut model = MentalModel::new();
    model.collection("widgets").set("foo", "foo");

    let mut matcher = Matcher::new(&mut model, "widgets").expecting_nothing();
    assert_eq!(matcher.matches(v(observed)).unwrap(), matched);
    if !matched {
        assert_eq!(outcome_lists(&matcher), (v(&[]), v(&["foo"])));
    }
}

#[test]
fn test_duplicate_expected_values_need_duplicate_observations() {
    let mut model = MentalModel::new();
    model.collection("widgets").set("first", "same");
    model.collection("widgets").set("second", "same");

    let mut matcher = Matcher::new(&mut model, "widgets");
    assert!(!matcher.matches(v(&["same"])).unwrap());
    assert_eq!(outcome_lists(&matcher), (v(&["same"]), v(&[])));

    assert!(matcher.matches(v(&["same", "same"])).unwrap());
}

#[test]
fn test_empty_collection_matches_empty_list() {
    let mut model = MentalModel::new();
    let mut matcher = Matcher::new(&mut model, "widgets");
    assert!(matcher.matches(Vec::new()).unwrap());
}

#[test]
fn test_model_changes_after_construction_are_ignored() {
    let mut model = MentalModel::new();
    model.collection("widgets").set("foo", "foo");

    let mut matcher = Matcher::new(&mut model, "widgets");
    model.collection("widgets").delete("foo").unwrap();
    model.collection("widgets").set("bar", "bar");

    assert!(matcher.matches(v(&["foo"])).unwrap());
}

#[test]
fn test_mapped_by_compares_projected_values() {
    let mut model = MentalModel::new();
    let widgets = model.collection("widgets");
    widgets.set("foo", Value::map([("name", "Foo"), ("colour", "red")]));
    widgets.set("bar", Value::map([("name", "Bar"), ("colour", "blue")]));
    widgets.delete("bar").unwrap();

    // The UI only shows names
    let project = |v: Value| v.get("name").cloned().unwrap_or_default();

    let mut matcher = Matcher::new(&mut model, "widgets").mapped_by(project);
    assert!(matcher.matches(v(&["Foo", "Baz"])).unwrap());

    let mut matcher = Matcher::new(&mut model, "widgets").mapped_by(project);
    assert!(!matcher.matches(v(&["Foo", "Bar"])).unwrap());
    assert_eq!(outcome_lists(&matcher), (v(&[]), v(&["Bar"])));
}

#[test]
fn test_filtered_by_expects_rejected_items_to_be_hidden() {
    let mut model = MentalModel::new();
    let widgets = model.collection("widgets");
    widgets.set("foo", Value::map([("name", Value::from("foo")), ("archived", Value::from(false))]));
    widgets.set("bar", Value::map([("name", Value::from("bar")), ("archived", Value::from(true))]));

    let mut matcher = Matcher::new(&mut model, "widgets")
        .filtered_by(|w| w.get("archived") == Some(&Value::Bool(false)))
        .mapped_by(|w| w.get("name").cloned().unwrap_or_default());

    assert!(matcher.matches(v(&["foo"])).unwrap());
    assert!(!matcher.matches(v(&["foo", "bar"])).unwrap());
}

#[test]
fn test_failure_message_names_collection_and_items() {
    let mut model = model_with_deleted_bar();
    let mut matcher = Matcher::new(&mut model, "widgets");

    assert!(!matcher.matches(v(&["bar"])).unwrap());
    let msg = matcher.failure_message().unwrap();

    assert!(msg.contains("`widgets`"));
    assert!(msg.contains("expected items not found:\n    - \"foo\""));
    assert!(msg.contains("unexpected items found:\n    - \"bar\""));
}

#[test]
fn test_assert_raises_assertion_failed() {
    let mut model = model_with_deleted_bar();
    let mut matcher = Matcher::new(&mut model, "widgets");

    assert!(matcher.assert(v(&["foo"])).is_ok());
    match matcher.assert(v(&["foo", "bar"])) {
        Err(E2eError::AssertionFailed(msg)) => assert!(msg.contains("unexpected items found")),
        other => panic!("expected AssertionFailed, got {:?}", other),
    }
}

#[test]
fn test_source_without_accessor_is_an_error() {
    let mut model = MentalModel::new();
    let mut page = Probe::new().expose("gadgets", || Ok(Vec::new()));

    let mut matcher = Matcher::new(&mut model, "widgets");
    match matcher.matches(&mut page) {
        Err(E2eError::MissingAccessor { collection, accessor }) => {
            assert_eq!(collection, "widgets");
            assert_eq!(accessor, "widgets");
        }
        other => panic!("expected MissingAccessor, got {:?}", other),
    }
}

#[test]
fn test_using_reads_overridden_accessor() {
    let mut model = MentalModel::new();
    model.collection("widgets").set("foo", "foo");
    let mut page = Probe::new().expose("widget_rows", || Ok(vec![Value::from("foo")]));

    let mut matcher = Matcher::new(&mut model, "widgets").using("widget_rows").unwrap();
    assert!(matcher.matches(&mut page).unwrap());
}

#[test]
fn test_unknown_key_propagates_from_model() {
    let mut model = MentalModel::new();
    let err = model.collection("widgets").get("ghost").unwrap_err();
    assert!(err.to_string().contains("widgets"));
    assert!(err.to_string().contains("ghost"));
}

#[test]
fn test_whole_floats_match_integer_fields() {
    let mut model = MentalModel::new();
    model.collection("widgets").set("foo", Value::map([("price", 1)]));

    let observed = Value::from(serde_json::json!({"price": 1.0}));
    let mut matcher = Matcher::new(&mut model, "widgets");
    assert!(matcher.matches(vec![observed]).unwrap());
}
