use crate::errors::ServerError;
use crate::estimator::{Estimator, FeatureInput};
use crate::geos::{canonical_ward, romaji, TOKYO_WARDS};
use crate::responses::{html_response, json_response, ResultResp};
use crate::state::AppState;
use crate::templates::error_fragment;
use crate::templates::pages::{estimate_result, estimator_page, location_options, EstimatorVm, FormValues};
use astra::Request;
use serde_json::json;
use std::collections::HashMap;
use std::io::Read;

/// Largest form body read from a client.
const MAX_FORM_BYTES: u64 = 16 * 1024;

pub fn handle(mut req: Request, state: &AppState) -> ResultResp {
    let method = req.method().as_str().to_owned();
    let path = req.uri().path().to_owned();

    match (method.as_str(), path.as_str()) {
        ("GET", "/") => home(state),
        ("GET", "/locations") => locations(&parse_query(&req), state),
        ("POST", "/estimate") => {
            let htmx = is_htmx(&req);
            let form = read_form(&mut req)?;
            estimate_form(&form, state, htmx)
        }
        ("GET", "/api/estimate") => api_estimate(&parse_query(&req), state),
        ("GET", "/health") => health(state),
        _ => Err(ServerError::NotFound),
    }
}

fn home(state: &AppState) -> ResultResp {
    let estimator = state.estimator()?;
    html_response(estimator_page(&page_vm(estimator, FormValues::default(), None)))
}

fn locations(params: &HashMap<String, String>, state: &AppState) -> ResultResp {
    let estimator = state.estimator()?;
    let ward = params.get("ward").map(|w| w.trim()).unwrap_or_default();

    if ward.is_empty() {
        return html_response(location_options(&[], None));
    }
    let ward = canonical_ward(ward).ok_or_else(|| ServerError::BadRequest(format!("Unknown ward {ward:?}")))?;

    html_response(location_options(estimator.locations().locations_in(ward), None))
}

fn estimate_form(params: &HashMap<String, String>, state: &AppState, htmx: bool) -> ResultResp {
    let outcome = state.estimator().and_then(|estimator| {
        let input = parse_input(params)?;
        let estimate = estimator.estimate(&input)?;
        Ok((estimator, estimate))
    });

    match outcome {
        Ok((_, estimate)) if htmx => html_response(estimate_result(&estimate)),
        Ok((estimator, estimate)) => {
            let form = form_values(params);
            html_response(estimator_page(&page_vm(
                estimator,
                form,
                Some(estimate_result(&estimate)),
            )))
        }
        // htmx only swaps 2xx responses, so inline errors go back as 200.
        Err(err) if htmx => {
            log::debug!("estimate rejected: {err}");
            html_response(error_fragment(&user_message(&err)))
        }
        Err(err) => Err(err),
    }
}

fn api_estimate(params: &HashMap<String, String>, state: &AppState) -> ResultResp {
    let result = state.estimator().and_then(|estimator| {
        let input = parse_input(params)?;
        Ok(estimator.estimate(&input)?)
    });

    match result {
        Ok(estimate) => json_response(200, &estimate),
        Err(err) => {
            log::debug!("api estimate rejected: {err}");
            json_response(err.status(), &json!({ "error": user_message(&err) }))
        }
    }
}

fn health(state: &AppState) -> ResultResp {
    match state.estimator() {
        Ok(estimator) => json_response(200, &json!({ "status": "ok", "model": estimator.summary() })),
        Err(err) => json_response(err.status(), &json!({ "status": "unavailable", "error": err.to_string() })),
    }
}

fn page_vm(estimator: &Estimator, form: FormValues, result: Option<maud::Markup>) -> EstimatorVm<'_> {
    let index = estimator.locations();
    let wards = TOKYO_WARDS
        .iter()
        .filter(|(kanji, _)| !index.locations_in(kanji).is_empty())
        .map(|&(kanji, _)| (kanji, romaji(kanji).unwrap_or_default()))
        .collect();
    let locations = form
        .ward
        .as_deref()
        .and_then(canonical_ward)
        .map_or(&[][..], |w| index.locations_in(w));
    let summary = estimator.summary();

    EstimatorVm {
        wards,
        locations,
        uses_walk: estimator.uses_walk(),
        reference_year: estimator.reference_year(),
        n_listings: summary.n_listings,
        n_locations: summary.n_locations,
        form,
        result,
    }
}

fn user_message(err: &ServerError) -> String {
    match err {
        ServerError::BadRequest(msg) => msg.clone(),
        other => other.to_string(),
    }
}

/// Turn submitted fields into an estimator input. Empty walk means unknown.
fn parse_input(params: &HashMap<String, String>) -> Result<FeatureInput, ServerError> {
    let field = |name: &str| params.get(name).map(|v| v.trim()).filter(|v| !v.is_empty());

    let location = field("location")
        .ok_or_else(|| ServerError::BadRequest("Please choose a location".into()))?
        .to_string();
    let area = field("area")
        .and_then(|v| v.parse::<f64>().ok())
        .ok_or_else(|| ServerError::BadRequest("Area must be a number of square metres".into()))?;
    let construction_year = field("year")
        .and_then(|v| v.parse::<i32>().ok())
        .ok_or_else(|| ServerError::BadRequest("Year built must be a whole year such as 2015".into()))?;
    let walk_minutes = match field("walk") {
        Some(v) => Some(
            v.parse::<f64>()
                .map_err(|_| ServerError::BadRequest("Walking time must be a number of minutes".into()))?,
        ),
        None => None,
    };

    Ok(FeatureInput {
        location,
        area,
        construction_year,
        walk_minutes,
    })
}

fn form_values(params: &HashMap<String, String>) -> FormValues {
    let get = |k: &str| params.get(k).cloned();
    let location = get("location").map(|l| l.trim().to_string());
    // Re-derive the ward from the location when the ward field was not sent.
    let ward = get("ward").filter(|w| !w.is_empty()).or_else(|| {
        location
            .as_deref()
            .and_then(crate::domain::LocationLabel::parse)
            .map(|l| l.ward().to_string())
    });

    FormValues {
        ward,
        location,
        area: get("area"),
        year: get("year"),
        walk: get("walk"),
    }
}

fn is_htmx(req: &Request) -> bool {
    req.headers()
        .get("HX-Request")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == "true")
}

fn parse_query(req: &Request) -> HashMap<String, String> {
    req.uri()
        .query()
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}

fn read_form(req: &mut Request) -> Result<HashMap<String, String>, ServerError> {
    let mut body = Vec::new();
    req.body_mut()
        .reader()
        .take(MAX_FORM_BYTES + 1)
        .read_to_end(&mut body)
        .map_err(|e| ServerError::BadRequest(format!("Could not read form: {e}")))?;

    if body.len() as u64 > MAX_FORM_BYTES {
        return Err(ServerError::BadRequest("Form too large".into()));
    }
    Ok(url::form_urlencoded::parse(&body).into_owned().collect())
}
