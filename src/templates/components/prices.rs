use crate::estimator::pricing::{format_man_yen, format_yen};
use crate::estimator::Estimate;
use maud::{html, Markup};

pub fn price_table(estimate: &Estimate) -> Markup {
    html! {
        table class="prices" {
            tbody {
                tr {
                    th { "Estimated price" }
                    td class="yen" { strong { (format_yen(estimate.base_price)) } }
                    td class="muted" { (format_man_yen(estimate.base_price)) }
                }
                @for tier in &estimate.tiers {
                    tr {
                        th { (tier.tier.label()) }
                        td class="yen" { (format_yen(tier.price)) }
                        td class="muted" { (format_man_yen(tier.price)) }
                    }
                }
                tr {
                    th { "Per m²" }
                    td class="yen" { (format_yen(estimate.unit_price.round() as i64)) }
                    td class="muted" {
                        "area average " (format_yen(estimate.location_unit_price.round() as i64))
                    }
                }
            }
        }
    }
}
