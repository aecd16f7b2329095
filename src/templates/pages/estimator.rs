// templates/pages/estimator.rs

use crate::domain::LocationLabel;
use crate::estimator::Estimate;
use crate::templates::components::{card, polar_chart, price_table};
use crate::templates::desktop_layout;
use maud::{html, Markup};

/// Raw form values, echoed back when the page is re-rendered.
#[derive(Debug, Clone, Default)]
pub struct FormValues {
    pub ward: Option<String>,
    pub location: Option<String>,
    pub area: Option<String>,
    pub year: Option<String>,
    pub walk: Option<String>,
}

pub struct EstimatorVm<'a> {
    /// (kanji, romaji) for wards the model knows, in ward order.
    pub wards: Vec<(&'static str, &'static str)>,
    /// Locations of the selected ward.
    pub locations: &'a [LocationLabel],
    pub uses_walk: bool,
    pub reference_year: i32,
    pub n_listings: usize,
    pub n_locations: usize,
    pub form: FormValues,
    pub result: Option<Markup>,
}

pub fn estimator_page(vm: &EstimatorVm<'_>) -> Markup {
    let form = &vm.form;

    desktop_layout(
        "Condo Price Estimator",
        html! {
            main class="container" {
                h1 { "Estimate a condo price" }
                p class="muted" {
                    "Trained on " (vm.n_listings) " listings across "
                    (vm.n_locations) " locations in Tokyo's 23 wards."
                }

                section class="card" {
                    form
                        method="post"
                        action="/estimate"
                        hx-post="/estimate"
                        hx-target="#result"
                        hx-swap="innerHTML"
                        hx-disabled-elt="button"
                    {
                        div class="field" {
                            label for="ward" { "Ward" }
                            select
                                name="ward"
                                id="ward"
                                hx-get="/locations"
                                hx-target="#location"
                                hx-swap="innerHTML"
                                hx-trigger="change"
                            {
                                option value="" selected[form.ward.is_none()] { "Select a ward..." }
                                @for (kanji, romaji) in &vm.wards {
                                    option value=(kanji) selected[form.ward.as_deref() == Some(*kanji)] {
                                        (kanji) " (" (romaji) ")"
                                    }
                                }
                            }
                        }

                        div class="field" {
                            label for="location" { "Town" }
                            select name="location" id="location" required {
                                (location_options(vm.locations, form.location.as_deref()))
                            }
                        }

                        div class="field" {
                            label for="area" { "Floor area (m²)" }
                            input type="number" id="area" name="area" step="0.01" min="1" max="1000"
                                value=[form.area.as_deref()] required;
                        }

                        div class="field" {
                            label for="year" { "Year built" }
                            input type="number" id="year" name="year" min="1900" max=(vm.reference_year)
                                value=[form.year.as_deref()] required;
                        }

                        @if vm.uses_walk {
                            div class="field" {
                                label for="walk" { "Walk to station (minutes)" }
                                input type="number" id="walk" name="walk" min="0" max="120"
                                    value=[form.walk.as_deref()] required;
                            }
                        }

                        button type="submit" { "Estimate" }
                    }
                }

                div id="result" {
                    @if let Some(result) = &vm.result {
                        (result)
                    }
                }
            }
        },
    )
}

/// `<option>` list for the town select.
pub fn location_options(locations: &[LocationLabel], selected: Option<&str>) -> Markup {
    html! {
        @if locations.is_empty() {
            option value="" { "Select a ward first" }
        } @else {
            option value="" selected[selected.is_none()] { "Select a town..." }
            @for label in locations {
                @let value = label.to_string();
                option value=(value) selected[selected == Some(value.as_str())] {
                    @if label.town().is_empty() { (label.ward()) } @else { (label.town()) }
                }
            }
        }
    }
}

pub fn estimate_result(estimate: &Estimate) -> Markup {
    card(
        &estimate.location,
        html! {
            p class="muted" {
                (format!("{:.1}", estimate.area)) " m², built " (estimate.construction_year)
                " (" (estimate.age) " years)"
                @if let Some(walk) = estimate.walk_minutes {
                    ", " (format!("{walk:.0}")) " min to station"
                }
            }
            (price_table(estimate))
            @if let Some(factor) = estimate.tier_factor {
                p class="muted" { "Adjusted by location factor " (factor) "." }
            }
            (polar_chart(&estimate.scores))
        },
    )
}
