// src/tests/router_tests/page_tests.rs

use crate::errors::ServerError;
use crate::responses::error_response;
use crate::router::handle;
use crate::state::AppState;
use crate::tests::utils::{body_string, enc, error_of, fixture_estimator, ready_state, request};
use http::Method;

#[test]
fn home_lists_only_wards_with_locations() {
    let state = ready_state();
    let resp = handle(request(Method::GET, "/"), &state).unwrap();
    assert_eq!(resp.status(), 200);

    let body = body_string(resp);
    assert!(body.contains("渋谷区 (Shibuya)"));
    assert!(body.contains("港区 (Minato)"));
    assert!(body.contains("足立区 (Adachi)"));
    assert!(!body.contains("練馬区"));
    assert!(body.contains(r#"hx-get="/locations""#));
    // Fixture model was trained without walk minutes.
    assert!(!body.contains(r#"name="walk""#));
}

#[test]
fn home_asks_for_walk_minutes_when_the_model_uses_them() {
    let state = AppState::ready(fixture_estimator(true));
    let body = body_string(handle(request(Method::GET, "/"), &state).unwrap());
    assert!(body.contains(r#"name="walk""#));
}

#[test]
fn locations_fragment_for_a_ward() {
    let state = ready_state();
    let uri = format!("/locations?ward={}", enc("渋谷区"));
    let resp = handle(request(Method::GET, &uri), &state).unwrap();
    assert_eq!(resp.status(), 200);

    let body = body_string(resp);
    assert!(body.contains(r#"<option value="東京都渋谷区神南1丁目">神南1丁目</option>"#));
    assert!(!body.contains("芝浦"));
    assert!(!body.contains("<html"));
}

#[test]
fn locations_fragment_without_ward_is_a_placeholder() {
    let state = ready_state();
    let body = body_string(handle(request(Method::GET, "/locations?ward="), &state).unwrap());
    assert!(body.contains("Select a ward first"));

    let uri = format!("/locations?ward={}", enc("練馬区"));
    let body = body_string(handle(request(Method::GET, &uri), &state).unwrap());
    assert!(body.contains("Select a ward first"));
}

#[test]
fn locations_rejects_non_wards() {
    let state = ready_state();
    let uri = format!("/locations?ward={}", enc("大阪市"));
    let err = error_of(handle(request(Method::GET, &uri), &state));
    assert!(matches!(err, ServerError::BadRequest(_)));
}

#[test]
fn unknown_route_is_not_found() {
    let state = ready_state();
    let err = error_of(handle(request(Method::GET, "/admin"), &state));
    assert_eq!(err, ServerError::NotFound);

    let err = error_of(handle(request(Method::DELETE, "/"), &state));
    assert_eq!(err, ServerError::NotFound);
}

#[test]
fn every_page_reports_an_unavailable_model() {
    let state = AppState::unavailable("cannot open model file model.json");

    for uri in ["/", "/locations?ward=x"] {
        match error_of(handle(request(Method::GET, uri), &state)) {
            ServerError::ModelUnavailable(msg) => assert!(msg.contains("model.json")),
            other => panic!("{uri}: expected unavailable model, got {other:?}"),
        }
    }

    let page = error_response(ServerError::ModelUnavailable(
        "cannot open model file model.json".into(),
    ));
    assert_eq!(page.status(), 503);
    let body = body_string(page);
    assert!(body.contains("could not be loaded"));
    assert!(body.contains("model.json"));
}

#[test]
fn not_found_page_renders_html() {
    let resp = error_response(ServerError::NotFound);
    assert_eq!(resp.status(), 404);
    assert!(body_string(resp).contains("Error 404"));
}

#[test]
fn server_entry_point_turns_errors_into_pages() {
    let state = ready_state();

    let resp = crate::respond(request(Method::GET, "/admin"), &state);
    assert_eq!(resp.status(), 404);
    assert!(body_string(resp).contains("Error 404"));

    let resp = crate::respond(request(Method::GET, "/"), &state);
    assert_eq!(resp.status(), 200);

    let down = AppState::unavailable("cannot open model file model.json");
    assert_eq!(crate::respond(request(Method::GET, "/"), &down).status(), 503);
}
