// src/geos.rs

/// Prefix every location label starts with.
pub const PREFECTURE: &str = "東京都";

/// Tokyo's 23 special wards as (kanji, romaji).
pub const TOKYO_WARDS: &[(&str, &str)] = &[
    ("千代田区", "Chiyoda"),
    ("中央区", "Chuo"),
    ("港区", "Minato"),
    ("新宿区", "Shinjuku"),
    ("文京区", "Bunkyo"),
    ("台東区", "Taito"),
    ("墨田区", "Sumida"),
    ("江東区", "Koto"),
    ("品川区", "Shinagawa"),
    ("目黒区", "Meguro"),
    ("大田区", "Ota"),
    ("世田谷区", "Setagaya"),
    ("渋谷区", "Shibuya"),
    ("中野区", "Nakano"),
    ("杉並区", "Suginami"),
    ("豊島区", "Toshima"),
    ("北区", "Kita"),
    ("荒川区", "Arakawa"),
    ("板橋区", "Itabashi"),
    ("練馬区", "Nerima"),
    ("足立区", "Adachi"),
    ("葛飾区", "Katsushika"),
    ("江戸川区", "Edogawa"),
];

/// Returns the canonical `&'static str` for a ward name, if it is one of the 23.
pub fn canonical_ward(name: &str) -> Option<&'static str> {
    TOKYO_WARDS
        .iter()
        .find(|(kanji, _)| *kanji == name)
        .map(|(kanji, _)| *kanji)
}

pub fn romaji(ward: &str) -> Option<&'static str> {
    TOKYO_WARDS
        .iter()
        .find(|(kanji, _)| *kanji == ward)
        .map(|(_, romaji)| *romaji)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn there_are_twenty_three_distinct_wards() {
        let mut names: Vec<&str> = TOKYO_WARDS.iter().map(|(k, _)| *k).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 23);
    }

    #[test]
    fn no_ward_name_is_a_prefix_of_another() {
        for (a, _) in TOKYO_WARDS {
            for (b, _) in TOKYO_WARDS {
                if a != b {
                    assert!(!b.starts_with(a), "{a} is a prefix of {b}");
                }
            }
        }
    }

    #[test]
    fn lookups() {
        assert_eq!(canonical_ward("渋谷区"), Some("渋谷区"));
        assert_eq!(canonical_ward("横浜市"), None);
        assert_eq!(romaji("江戸川区"), Some("Edogawa"));
    }
}
