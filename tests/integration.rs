use approx::assert_relative_eq;
use spice_core::backend::{DynValue, FakeBackend, Found, SpiceBackend};
use spice_core::compare::{compare, CompareOptions};
use spice_core::runner::{run_case, Case, CaseOutcome};
use std::collections::BTreeMap;

fn case(call: &str, args: Vec<serde_json::Value>) -> Case {
    Case {
        call: call.to_string(),
        args,
        setup: None,
    }
}

fn expect_ok(outcome: CaseOutcome) -> DynValue {
    match outcome {
        CaseOutcome::Ok { result } => result,
        CaseOutcome::Err { message, .. } => panic!("expected ok, got error: {message}"),
    }
}

#[test]
fn str2et_literal_epochs_match_spec_scenario() {
    let mut backend = FakeBackend::new();

    let outcome = run_case(&mut backend, &case("time.str2et", vec![serde_json::json!("2000-01-01T12:00:00.000Z")]));
    assert_eq!(expect_ok(outcome), DynValue::Float(0.0));

    let outcome = run_case(&mut backend, &case("time.str2et", vec![serde_json::json!("2001-01-01T12:00:00.000Z")]));
    assert_eq!(expect_ok(outcome), DynValue::Float(31_622_400.0));
}

#[test]
fn et2utc_formats_with_and_without_fractional_seconds() {
    let mut backend = FakeBackend::new();

    let outcome = run_case(&mut backend, &case("time.et2utc", vec![serde_json::json!(0.0), serde_json::json!("ISOC"), serde_json::json!(3)]));
    assert_eq!(expect_ok(outcome), DynValue::Str("2000-01-01T12:00:00.000Z".to_string()));

    let outcome = run_case(&mut backend, &case("time.et2utc", vec![serde_json::json!(0.0), serde_json::json!("ISOC"), serde_json::json!(0)]));
    assert_eq!(expect_ok(outcome), DynValue::Str("2000-01-01T12:00:00Z".to_string()));
}

#[test]
fn body_name_lookups_round_trip_and_report_not_found() {
    let mut backend = FakeBackend::new();

    let outcome = expect_ok(run_case(&mut backend, &case("ids-names.bodn2c", vec![serde_json::json!("earth")])));
    let mut expected = BTreeMap::new();
    expected.insert("found".to_string(), DynValue::Bool(true));
    expected.insert("value".to_string(), DynValue::Int(399));
    assert_eq!(outcome, DynValue::Object(expected));

    let outcome = expect_ok(run_case(&mut backend, &case("ids-names.bodc2n", vec![serde_json::json!(399)])));
    let mut expected = BTreeMap::new();
    expected.insert("found".to_string(), DynValue::Bool(true));
    expected.insert("value".to_string(), DynValue::Str("EARTH".to_string()));
    assert_eq!(outcome, DynValue::Object(expected));

    let outcome = expect_ok(run_case(&mut backend, &case("ids-names.bodn2c", vec![serde_json::json!("Pluto9")])));
    let mut expected = BTreeMap::new();
    expected.insert("found".to_string(), DynValue::Bool(false));
    assert_eq!(outcome, DynValue::Object(expected));
}

#[test]
fn pxform_identity_matches_spec_scenario() {
    let mut backend = FakeBackend::new();
    let outcome = expect_ok(run_case(
        &mut backend,
        &case("frames.pxform", vec![serde_json::json!("J2000"), serde_json::json!("J2000"), serde_json::json!(12345.678)]),
    ));
    assert_eq!(outcome, DynValue::Mat3([1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]));
}

#[test]
fn earth_heliocentric_position_matches_quarter_period_scenario() {
    let mut backend = FakeBackend::new();

    let outcome = expect_ok(run_case(
        &mut backend,
        &case(
            "ephem.spkpos",
            vec![
                serde_json::json!("EARTH"),
                serde_json::json!(0.0),
                serde_json::json!("J2000"),
                serde_json::json!("NONE"),
                serde_json::json!("SUN"),
            ],
        ),
    ));
    let pos = match outcome {
        DynValue::Vec3(v) => v,
        other => panic!("expected Vec3, got {other:?}"),
    };
    assert_relative_eq!(pos[0], 149_597_870.7, epsilon = 1e-6);
    assert_relative_eq!(pos[1], 0.0, epsilon = 1e-6);
    assert_relative_eq!(pos[2], 0.0, epsilon = 1e-6);

    let quarter_period_et = std::f64::consts::FRAC_PI_2
        / (2.0 * std::f64::consts::PI / (365.25 * 86_400.0));
    let outcome = expect_ok(run_case(
        &mut backend,
        &case(
            "ephem.spkpos",
            vec![
                serde_json::json!("EARTH"),
                serde_json::json!(quarter_period_et),
                serde_json::json!("J2000"),
                serde_json::json!("NONE"),
                serde_json::json!("SUN"),
            ],
        ),
    ));
    let pos = match outcome {
        DynValue::Vec3(v) => v,
        other => panic!("expected Vec3, got {other:?}"),
    };
    assert_relative_eq!(pos[0], 0.0, epsilon = 1e-6);
    assert_relative_eq!(pos[1], 149_597_870.7, epsilon = 1e-6);
}

#[test]
fn comparator_wraps_branch_cut_angles_as_matching() {
    let opts = CompareOptions::new(0.0, 1e-12, true).unwrap();
    let mismatches = compare(
        &DynValue::Float(-std::f64::consts::PI),
        &DynValue::Float(std::f64::consts::PI),
        &opts,
    );
    assert!(mismatches.is_empty());
}

#[test]
fn unsupported_call_is_rejected_before_touching_backend_state() {
    let mut backend = FakeBackend::new();
    let outcome = run_case(&mut backend, &case("nope.nope", vec![]));
    assert!(matches!(outcome, CaseOutcome::Err { .. }));
    assert!(!backend.failed());
}

#[test]
fn pool_watch_flips_once_per_matching_write() {
    let mut backend = FakeBackend::new();
    assert!(!backend.expool("GM_EARTH"));
    backend.put_double("GM_EARTH", vec![398_600.4418]).unwrap();
    assert!(backend.expool("GM_EARTH"));
    let values = backend.get_double("GM_EARTH", 0, 1).unwrap();
    assert_relative_eq!(values[0], 398_600.4418);
}

#[test]
fn frame_by_name_unknown_frame_is_found_no_not_an_error() {
    let mut backend = FakeBackend::new();
    assert_eq!(backend.namfrm("NOT_A_FRAME"), Found::No);
}

#[test]
fn str2et_round_trips_through_et2utc() {
    let mut backend = FakeBackend::new();
    let et = backend.str2et("2005-06-15T08:30:00.000Z").unwrap();
    let utc = backend.et2utc(et, "ISOC", 6).unwrap();
    let round_tripped = backend.str2et(&utc).unwrap();
    assert_relative_eq!(et.as_seconds(), round_tripped.as_seconds(), epsilon = 1e-6);
}
