// src/tests/router_tests/api_tests.rs

use crate::router::handle;
use crate::state::AppState;
use crate::tests::utils::{body_string, enc, ready_state, request};
use http::Method;
use serde_json::Value;

fn json_of(resp: astra::Response) -> Value {
    serde_json::from_str(&body_string(resp)).unwrap()
}

#[test]
fn api_estimate_returns_prices_and_scores() {
    let state = ready_state();
    let uri = format!("/api/estimate?location={}&area=60&year=2015", enc("東京都渋谷区神南1丁目"));
    let resp = handle(request(Method::GET, &uri), &state).unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers().get("Content-Type").unwrap(), "application/json");

    let v = json_of(resp);
    assert_eq!(v["location"], "東京都渋谷区神南1丁目");
    assert_eq!(v["age"], 11);
    let price = v["price"].as_f64().unwrap();
    assert!(price > 0.0);
    assert_eq!(v["base_price"].as_i64().unwrap(), price.round() as i64);

    let tiers = v["tiers"].as_array().unwrap();
    assert_eq!(tiers.len(), 3);
    assert_eq!(tiers[0]["tier"], "premium");
    assert_eq!(tiers[0]["price"].as_i64().unwrap(), (price * 1.25).round() as i64);
    assert_eq!(tiers[2]["price"].as_i64().unwrap(), (price * 1.05).round() as i64);

    for axis in ["location", "size", "newness", "access", "value"] {
        let s = v["scores"][axis].as_f64().unwrap();
        assert!((0.0..=100.0).contains(&s), "{axis} = {s}");
    }
}

#[test]
fn api_accepts_labels_without_prefecture() {
    let state = ready_state();
    let uri = format!("/api/estimate?location={}&area=45&year=2000", enc("足立区千住"));
    let v = json_of(handle(request(Method::GET, &uri), &state).unwrap());
    assert_eq!(v["location"], "東京都足立区千住");
}

#[test]
fn api_errors_are_json_with_status() {
    let state = ready_state();

    let uri = format!("/api/estimate?location={}&area=60&year=2015", enc("東京都港区海岸"));
    let resp = handle(request(Method::GET, &uri), &state).unwrap();
    assert_eq!(resp.status(), 400);
    assert!(json_of(resp)["error"].as_str().unwrap().contains("No match"));

    let uri = format!("/api/estimate?location={}&area=60", enc("東京都港区芝浦"));
    let resp = handle(request(Method::GET, &uri), &state).unwrap();
    assert_eq!(resp.status(), 400);

    let unavailable = AppState::unavailable("bad artifact");
    let resp = handle(request(Method::GET, &uri), &unavailable).unwrap();
    assert_eq!(resp.status(), 503);
}

#[test]
fn health_reports_the_model() {
    let v = json_of(handle(request(Method::GET, "/health"), &ready_state()).unwrap());
    assert_eq!(v["status"], "ok");
    assert_eq!(v["model"]["n_locations"], 3);
    assert_eq!(v["model"]["n_trees"], 12);
    assert_eq!(v["model"]["target"], "price");

    let resp = handle(request(Method::GET, "/health"), &AppState::unavailable("bad artifact")).unwrap();
    assert_eq!(resp.status(), 503);
    let v = json_of(resp);
    assert_eq!(v["status"], "unavailable");
    assert!(v["error"].as_str().unwrap().contains("bad artifact"));
}
