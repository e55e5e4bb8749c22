//! EventLabelerBuilder: strategy selection and the produced filter.

use beacon_core::errors::{BeaconError, FilterError};
use beacon_core::{Hit, HitType, KnownParameter, ParameterMap, Value};
use beacon_service::EventLabelerBuilder;

fn event_hit(category: &str, value: Option<i64>) -> Hit {
    let mut params = ParameterMap::new();
    params.set(KnownParameter::EventCategory, category);
    params.set(KnownParameter::EventAction, "act");
    if let Some(value) = value {
        params.set(KnownParameter::EventValue, value);
    }
    Hit::new(HitType::Event, params)
}

fn label(hit: &Hit) -> Option<&str> {
    hit.parameters()
        .get(&KnownParameter::EventLabel)
        .and_then(Value::as_text)
}

// ─── Builder ───────────────────────────────────────────────

#[test]
fn second_strategy_is_rejected() {
    let err = EventLabelerBuilder::new()
        .power_of_two()
        .unwrap()
        .range_bounds(&[1, 2])
        .err()
        .expect("two strategies");
    assert!(matches!(err, BeaconError::Filter(FilterError::StrategyAlreadySet)));
}

#[test]
fn build_without_strategy_is_rejected() {
    let err = EventLabelerBuilder::new().build().err().expect("no strategy");
    assert!(matches!(err, BeaconError::Filter(FilterError::NoStrategy)));
}

#[test]
fn invalid_bounds_are_rejected() {
    for bounds in [&[][..], &[5, 5][..], &[-1, 3][..]] {
        let err = EventLabelerBuilder::new().range_bounds(bounds).err().expect("invalid");
        assert!(matches!(err, BeaconError::Filter(FilterError::InvalidBounds { .. })));
    }
}

// ─── Filter ────────────────────────────────────────────────

#[test]
fn power_of_two_labels_and_overwrites() {
    let filter = EventLabelerBuilder::new().power_of_two().unwrap().build().unwrap();

    let mut hit = event_hit("c", Some(7));
    hit.parameters_mut().set(KnownParameter::EventLabel, "old");
    filter(&mut hit);
    assert_eq!(label(&hit), Some("5-8"));
    assert!(hit.parameters().contains(&KnownParameter::EventValue));

    let mut zero = event_hit("c", Some(0));
    filter(&mut zero);
    assert_eq!(label(&zero), Some("0"));
}

#[test]
fn range_bounds_label_with_strip_value() {
    let filter = EventLabelerBuilder::new()
        .range_bounds(&[10, 100])
        .unwrap()
        .strip_value()
        .build()
        .unwrap();

    let mut hit = event_hit("c", Some(42));
    filter(&mut hit);
    assert_eq!(label(&hit), Some("10-99"));
    assert!(!hit.parameters().contains(&KnownParameter::EventValue));
}

#[test]
fn custom_labeler_and_restrictions() {
    let filter = EventLabelerBuilder::new()
        .category("size")
        .action("act")
        .labeler_fn(|v| if v > 100 { "big".into() } else { "small".into() })
        .unwrap()
        .build()
        .unwrap();

    let mut matching = event_hit("size", Some(500));
    filter(&mut matching);
    assert_eq!(label(&matching), Some("big"));

    let mut other_category = event_hit("color", Some(500));
    filter(&mut other_category);
    assert_eq!(label(&other_category), None);
}

#[test]
fn hits_without_value_negative_value_or_other_type_are_untouched() {
    let filter = EventLabelerBuilder::new().power_of_two().unwrap().build().unwrap();

    let mut no_value = event_hit("c", None);
    filter(&mut no_value);
    assert_eq!(label(&no_value), None);

    let mut negative = event_hit("c", Some(-4));
    filter(&mut negative);
    assert_eq!(label(&negative), None);

    let mut params = ParameterMap::new();
    params.set(KnownParameter::EventValue, 3);
    let mut timing = Hit::new(HitType::Timing, params);
    filter(&mut timing);
    assert_eq!(label(&timing), None);
}
