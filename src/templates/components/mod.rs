use maud::{html, Markup};

pub mod chart;
pub mod error;
pub mod prices;

pub use chart::polar_chart;
pub use error::{error_fragment, error_page};
pub use prices::price_table;

pub fn card(title: &str, body: Markup) -> Markup {
    html! {
        section class="card" {
            h2 { (title) }
            div class="card-body" {
                (body)
            }
        }
    }
}
