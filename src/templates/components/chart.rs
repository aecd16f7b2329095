// templates/components/chart.rs
use crate::estimator::SubScores;
use maud::{html, Markup};
use std::f64::consts::PI;

const SIZE: f64 = 260.0;
const CENTER: f64 = SIZE / 2.0;
const RADIUS: f64 = 90.0;

/// Point on axis `i` of `n` at `fraction` of the radius, first axis pointing up.
fn point(i: usize, n: usize, fraction: f64) -> (f64, f64) {
    let angle = -PI / 2.0 + 2.0 * PI * i as f64 / n as f64;
    (
        CENTER + RADIUS * fraction * angle.cos(),
        CENTER + RADIUS * fraction * angle.sin(),
    )
}

fn polygon(points: impl Iterator<Item = (f64, f64)>) -> String {
    points
        .map(|(x, y)| format!("{x:.1},{y:.1}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Inline SVG radar of the 0–100 sub-scores.
pub fn polar_chart(scores: &SubScores) -> Markup {
    let axes = scores.axes();
    let n = axes.len();
    let shape = polygon(axes.iter().enumerate().map(|(i, (_, v))| point(i, n, v / 100.0)));

    html! {
        svg
            xmlns="http://www.w3.org/2000/svg"
            class="polar-chart"
            width=(SIZE)
            height=(SIZE)
            viewBox=(format!("0 0 {SIZE} {SIZE}"))
            role="img"
            aria-label="Score chart"
        {
            @for ring in [0.25, 0.5, 0.75, 1.0] {
                polygon
                    points=(polygon((0..n).map(|i| point(i, n, ring))))
                    fill="none"
                    stroke="#e5e7eb" {}
            }
            @for i in 0..n {
                @let (x, y) = point(i, n, 1.0);
                line x1=(CENTER) y1=(CENTER) x2=(format!("{x:.1}")) y2=(format!("{y:.1}")) stroke="#e5e7eb" {}
            }
            polygon points=(shape) fill="rgba(82,78,210,0.25)" stroke="#524ed2" stroke-width="2" {}
            @for (i, (name, value)) in axes.iter().enumerate() {
                @let (x, y) = point(i, n, 1.22);
                text x=(format!("{x:.1}")) y=(format!("{y:.1}")) text-anchor="middle" font-size="11" fill="#374151" {
                    (name) " " (format!("{value:.0}"))
                }
            }
        }
    }
}
