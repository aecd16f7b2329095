// src/tests/router_tests/estimate_tests.rs

use crate::errors::ServerError;
use crate::estimator::FeatureInput;
use crate::router::handle;
use crate::state::AppState;
use crate::tests::utils::{body_string, error_of, fixture_estimator, post_form, ready_state};

fn yen(n: i64) -> String {
    crate::estimator::pricing::format_yen(n)
}

#[test]
fn htmx_estimate_renders_the_result_fragment() {
    let state = ready_state();
    let form = [
        ("ward", "渋谷区"),
        ("location", "東京都渋谷区神南1丁目"),
        ("area", "60"),
        ("year", "2015"),
    ];
    let resp = handle(post_form("/estimate", &form, true), &state).unwrap();
    assert_eq!(resp.status(), 200);
    let body = body_string(resp);

    // Same numbers the estimator produces directly.
    let expected = fixture_estimator(false)
        .estimate(&FeatureInput {
            location: "東京都渋谷区神南1丁目".into(),
            area: 60.0,
            construction_year: 2015,
            walk_minutes: None,
        })
        .unwrap();
    assert!(expected.price > 0.0);

    assert!(!body.contains("<html"));
    assert!(body.contains("東京都渋谷区神南1丁目"));
    assert!(body.contains(&yen(expected.base_price)));
    for tier in &expected.tiers {
        assert!(body.contains(&yen(tier.price)), "missing tier {:?}", tier.tier);
    }
    assert!(body.contains("<svg"));
    assert!(body.contains("11 years"));
}

#[test]
fn plain_post_renders_the_full_page_with_the_result() {
    let state = ready_state();
    let form = [
        ("location", "東京都港区芝浦"),
        ("area", "55.5"),
        ("year", "2010"),
    ];
    let body = body_string(handle(post_form("/estimate", &form, false), &state).unwrap());

    assert!(body.contains("<html"));
    assert!(body.contains(r#"id="result""#));
    assert!(body.contains("Premium (×1.25)"));
    // The ward is recovered from the location so the town select is filled.
    assert!(body.contains(r#"<option value="東京都港区芝浦" selected>芝浦</option>"#));
    assert!(body.contains(r#"value="55.5""#));
}

#[test]
fn unknown_location_is_a_bad_request() {
    let state = ready_state();
    let form = [("location", "東京都渋谷区神南"), ("area", "60"), ("year", "2015")];

    let err = error_of(handle(post_form("/estimate", &form, false), &state));
    assert_eq!(err, ServerError::UnknownLocation("東京都渋谷区神南".into()));
    assert_eq!(err.status(), 400);
    assert!(err.to_string().contains("No match"));

    // htmx gets the message inline.
    let resp = handle(post_form("/estimate", &form, true), &state).unwrap();
    assert_eq!(resp.status(), 200);
    assert!(body_string(resp).contains("No match"));
}

#[test]
fn invalid_fields_name_the_problem() {
    let state = ready_state();
    let cases: [(&[(&str, &str)], &str); 5] = [
        (&[("area", "60"), ("year", "2015")], "choose a location"),
        (&[("location", "東京都港区芝浦"), ("area", "big"), ("year", "2015")], "Area"),
        (&[("location", "東京都港区芝浦"), ("area", "-4"), ("year", "2015")], "Area"),
        (&[("location", "東京都港区芝浦"), ("area", "60"), ("year", "2031")], "after the reference year"),
        (&[("location", "東京都港区芝浦"), ("area", "60"), ("year", "")], "Year built"),
    ];

    for (form, needle) in cases {
        match error_of(handle(post_form("/estimate", form, false), &state)) {
            ServerError::BadRequest(msg) => assert!(msg.contains(needle), "{msg:?} lacks {needle:?}"),
            other => panic!("expected bad request for {form:?}, got {other:?}"),
        }
    }
}

#[test]
fn walk_minutes_are_required_by_walk_models() {
    let state = AppState::ready(fixture_estimator(true));
    let mut form = vec![("location", "東京都足立区千住"), ("area", "60"), ("year", "2015")];

    let err = error_of(handle(post_form("/estimate", &form, false), &state));
    assert!(matches!(err, ServerError::BadRequest(ref m) if m.contains("walking time")));

    form.push(("walk", "6"));
    let body = body_string(handle(post_form("/estimate", &form, true), &state).unwrap());
    assert!(body.contains("6 min to station"));
}

#[test]
fn estimate_with_unavailable_model() {
    let state = AppState::unavailable("cannot open model file model.json");
    let form = [("location", "東京都港区芝浦"), ("area", "60"), ("year", "2015")];

    let err = error_of(handle(post_form("/estimate", &form, false), &state));
    assert!(matches!(err, ServerError::ModelUnavailable(_)));

    let body = body_string(handle(post_form("/estimate", &form, true), &state).unwrap());
    assert!(body.contains("model.json"));
}

#[test]
fn oversized_form_is_rejected() {
    let state = ready_state();
    let big = "x".repeat(20_000);
    let form = [("location", big.as_str())];
    let err = error_of(handle(post_form("/estimate", &form, false), &state));
    assert_eq!(err, ServerError::BadRequest("Form too large".into()));
}

#[test]
fn padded_location_is_trimmed_before_lookup() {
    let state = ready_state();
    let form = [("location", " 東京都港区芝浦\u{3000}"), ("area", "60"), ("year", "2015")];
    let body = body_string(handle(post_form("/estimate", &form, false), &state).unwrap());
    assert!(body.contains(r#"<option value="東京都港区芝浦" selected>芝浦</option>"#));
}

#[test]
fn extreme_numbers_are_rejected_not_computed() {
    let state = ready_state();
    let cases = [
        ([("location", "東京都港区芝浦"), ("area", "60"), ("year", "-2147483648")], "not plausible"),
        ([("location", "東京都港区芝浦"), ("area", "0.000001"), ("year", "2015")], "Area"),
    ];

    for (form, needle) in cases {
        match error_of(handle(post_form("/estimate", &form, false), &state)) {
            ServerError::BadRequest(msg) => assert!(msg.contains(needle), "{msg:?} lacks {needle:?}"),
            other => panic!("expected bad request for {form:?}, got {other:?}"),
        }
    }
}
