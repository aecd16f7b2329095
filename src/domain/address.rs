// src/domain/address.rs

use crate::domain::location::LocationLabel;
use crate::geos::TOKYO_WARDS;
use regex::Regex;
use std::sync::OnceLock;

/// Leading run of non-digits, optionally followed by `<n>丁目`.
fn town_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\D+)(\d+丁目)?").expect("town pattern is valid"))
}

/// Normalize a free-text listing address into a [`LocationLabel`].
///
/// All Unicode whitespace is dropped and full-width digits and
/// dashes are folded to ASCII. Returns `None` when none of the 23 wards
/// appears in the address; such rows are excluded from training.
///
/// ```text
/// "東京都渋谷区神南１丁目２－３"  -> 東京都渋谷区神南1丁目
/// "東京都 世田谷区 三軒茶屋2-1"  -> 東京都世田谷区三軒茶屋
/// ```
pub fn normalize_address(raw: &str) -> Option<LocationLabel> {
    let addr: String = raw.chars().filter_map(fold_char).collect();
    let ward = find_ward(&addr)?;

    // Everything after the last occurrence of the ward name.
    let core = addr.rsplit(ward).next().unwrap_or_default();

    LocationLabel::new(ward, extract_town(core))
}

/// Earliest ward occurring in `addr`; ties go to the longer name.
fn find_ward(addr: &str) -> Option<&'static str> {
    TOKYO_WARDS
        .iter()
        .filter_map(|&(ward, _)| addr.find(ward).map(|pos| (pos, ward)))
        .min_by(|(pa, wa), (pb, wb)| pa.cmp(pb).then(wb.len().cmp(&wa.len())))
        .map(|(_, ward)| ward)
}

fn extract_town(core: &str) -> String {
    match town_pattern().captures(core) {
        Some(caps) => {
            let town = &caps[1];
            match caps.get(2) {
                Some(chome) => format!("{town}{}", chome.as_str()),
                None => town.to_string(),
            }
        }
        // Starts with a digit (or is empty): keep it verbatim.
        None => core.to_string(),
    }
}

fn fold_char(c: char) -> Option<char> {
    match c {
        c if c.is_whitespace() => None,
        '０'..='９' => char::from_u32(c as u32 - '０' as u32 + '0' as u32),
        '－' | '‐' | '−' | '―' => Some('-'),
        other => Some(other),
    }
}
