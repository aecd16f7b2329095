pub mod errors;
pub mod html;
pub mod json;

pub use errors::{error_response, ResultResp};
pub use html::{html_response, html_with_status};
pub use json::json_response;
