use crate::domain::{Listing, LocationLabel};
use crate::errors::ServerError;
use crate::estimator::Estimator;
use crate::model::{ForestParams, PriceTarget};
use crate::responses::ResultResp;
use crate::state::AppState;
use crate::training::build_artifact;
use crate::training::trainer::FitOptions;
use astra::{Body, Request, Response};
use http::Method;
use std::io::Read;

/// Three towns with clearly different unit prices.
pub const TOWNS: [(&str, &str, f64); 3] = [
    ("渋谷区", "神南1丁目", 1_500_000.0),
    ("港区", "芝浦", 1_200_000.0),
    ("足立区", "千住", 600_000.0),
];

pub fn fixture_listings() -> Vec<Listing> {
    (0..90)
        .map(|i| {
            let (ward, town, unit) = TOWNS[i % 3];
            let area = 30.0 + (i % 9) as f64 * 5.0;
            let age = (i % 15) as f64;
            Listing {
                location: LocationLabel::new(ward, town).unwrap(),
                area,
                age,
                walk_minutes: Some(2.0 + (i % 6) as f64),
                price: unit * area * (1.0 - age / 80.0),
            }
        })
        .collect()
}

pub fn fixture_estimator(use_walk: bool) -> Estimator {
    let opts = FitOptions {
        target: PriceTarget::Price,
        forest: ForestParams {
            n_trees: 12,
            max_depth: 10,
            ..ForestParams::default()
        },
        reference_year: 2026,
        use_walk,
    };
    let artifact = build_artifact(&fixture_listings(), &opts).unwrap();
    Estimator::from_artifact(artifact).unwrap()
}

pub fn ready_state() -> AppState {
    AppState::ready(fixture_estimator(false))
}

pub fn request(method: Method, uri: &str) -> Request {
    let mut req = Request::new(Body::empty());
    *req.method_mut() = method;
    *req.uri_mut() = uri.parse().unwrap();
    req
}

pub fn post_form(uri: &str, form: &[(&str, &str)], htmx: bool) -> Request {
    let body: String = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(form)
        .finish();

    let mut req = Request::new(Body::from(body));
    *req.method_mut() = Method::POST;
    *req.uri_mut() = uri.parse().unwrap();
    req.headers_mut().insert(
        "Content-Type",
        "application/x-www-form-urlencoded".parse().unwrap(),
    );
    if htmx {
        req.headers_mut().insert("HX-Request", "true".parse().unwrap());
    }
    req
}

pub fn body_string(resp: Response) -> String {
    let mut body = String::new();
    resp.into_body().reader().read_to_string(&mut body).unwrap();
    body
}

/// Percent-encode a query value.
pub fn enc(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// The error a handler returned; panics with the status if it succeeded.
pub fn error_of(result: ResultResp) -> ServerError {
    match result {
        Ok(resp) => panic!("expected an error, got status {}", resp.status()),
        Err(err) => err,
    }
}
