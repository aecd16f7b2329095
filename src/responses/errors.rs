use crate::errors::ServerError;
use crate::responses::html_with_status;
use crate::templates::error_page;
use astra::{Body, Response};

pub type ResultResp = Result<Response, ServerError>;

/// Convert a ServerError into an HTML error page with the matching status.
pub fn error_response(err: ServerError) -> Response {
    let status = err.status();
    if status >= 500 {
        log::error!("{err}");
    } else {
        log::debug!("{err}");
    }

    let message = match &err {
        ServerError::NotFound => "Not Found".to_string(),
        ServerError::BadRequest(msg) => msg.clone(),
        ServerError::ModelUnavailable(msg) => {
            format!("The price model could not be loaded, so no estimates are available. {msg}")
        }
        other => other.to_string(),
    };

    html_with_status(status, error_page(status, &message))
        .unwrap_or_else(|_| Response::new(Body::from("Internal Server Error")))
}
