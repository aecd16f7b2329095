use crate::templates::desktop_layout;
use maud::{html, Markup};

/// Full HTML error page.
pub fn error_page(status: u16, message: &str) -> Markup {
    desktop_layout(
        &format!("Error {status}"),
        html! {
            main class="container" {
                h1 { "Error " (status) }
                p { (message) }
                p { a href="/" { "← Back to the estimator" } }
            }
        },
    )
}

/// Inline error swapped into the result area by htmx.
pub fn error_fragment(message: &str) -> Markup {
    html! {
        div class="card" role="alert" {
            p class="error" { (message) }
        }
    }
}
