// src/estimator/pricing.rs

use serde::Serialize;

/// Premium tiers quoted on top of the base estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Premium,
    Major,
    Standard,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Premium, Tier::Major, Tier::Standard];

    pub const fn multiplier(self) -> f64 {
        match self {
            Tier::Premium => 1.25,
            Tier::Major => 1.15,
            Tier::Standard => 1.05,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Tier::Premium => "Premium (×1.25)",
            Tier::Major => "Major (×1.15)",
            Tier::Standard => "Standard (×1.05)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TierPrice {
    pub tier: Tier,
    pub multiplier: f64,
    pub price: i64,
}

/// Rounded tier prices, highest first.
pub fn tier_prices(price: f64) -> Vec<TierPrice> {
    Tier::ALL
        .iter()
        .map(|&tier| TierPrice {
            tier,
            multiplier: tier.multiplier(),
            price: round_yen(price * tier.multiplier()),
        })
        .collect()
}

pub fn round_yen(price: f64) -> i64 {
    price.round() as i64
}

/// `12345678` → `"12,345,678円"`.
pub fn format_yen(yen: i64) -> String {
    let digits = yen.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 2);
    if yen < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out.push('円');
    out
}

/// `85_000_000` → `"8,500万円"`, the way listings quote prices.
pub fn format_man_yen(yen: i64) -> String {
    let man = (yen as f64 / 10_000.0).round() as i64;
    let mut s = format_yen(man);
    s.pop();
    s.push_str("万円");
    s
}
