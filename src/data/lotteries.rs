//! Known lotteries per board
//!
//! Display names are what the result pages print; identities are the
//! normalised keys stored alongside each draw.

use crate::Board;
use regex::Regex;

/// DLB lotteries as printed on the results page
pub const DLB_LOTTERIES: &[&str] = &[
    "SASIRI",
    "KAPRUKA",
    "SHANIDA",
    "SUPER BALL",
    "ADA KOTIPATHI",
    "JAYA SAMPATHA",
    "LAGNA WASANA",
    "SUPIRI DHANA SAMPATHA",
];

/// NLB lotteries as printed on the results page
pub const NLB_LOTTERIES: &[&str] = &[
    "MAHAJANA SAMPATHA",
    "VASANA SAMPATHA",
    "GOVISETHA",
    "SUPIRI WASANA",
    "DHANA NIDHANAYA",
    "SATURDAY SUPER BALL",
    "SUNDAY MEGA JACKPOT",
    "SHANIDA PATTARE",
    "KOTIPATHI PATTARE",
];

/// Known NLB per-draw URL slugs
pub const NLB_DRAW_SLUGS: &[&str] = &[
    "suba-dawasak",
    "nlb-jaya",
    "ada-sampatha",
    "handahana",
    "dhana-nidhanaya",
    "mega-power",
    "govisetha",
    "mahajana-sampatha",
];

pub fn known_names(board: Board) -> &'static [&'static str] {
    match board {
        Board::Dlb => DLB_LOTTERIES,
        Board::Nlb => NLB_LOTTERIES,
    }
}

/// Normalise a display name or slug into a lottery identity
///
/// `"Ada Kotipathi"` and `"ada-kotipathi"` both become `ada_kotipathi`.
pub fn lottery_identity(name: &str) -> String {
    name.split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

fn compact(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Resolve matched page text (any casing or spacing) to the catalogue name
pub fn canonical_name(board: Board, text: &str) -> Option<&'static str> {
    let wanted = compact(text);
    known_names(board)
        .iter()
        .copied()
        .find(|name| compact(name) == wanted)
}

/// First known lottery name contained in `text`, preferring longer names
pub fn find_name(board: Board, text: &str) -> Option<&'static str> {
    let haystack = compact(text);
    let mut names: Vec<&'static str> = known_names(board).to_vec();
    names.sort_by_key(|n| std::cmp::Reverse(n.len()));
    names
        .into_iter()
        .find(|name| haystack.contains(&compact(name)))
}

/// Case-insensitive alternation over a board's names, tolerant of spacing
pub fn name_pattern(board: Board) -> Regex {
    let mut names: Vec<&'static str> = known_names(board).to_vec();
    names.sort_by_key(|n| std::cmp::Reverse(n.len()));
    let alternatives: Vec<String> = names
        .iter()
        .map(|name| {
            name.split_whitespace()
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(r"\s*")
        })
        .collect();
    Regex::new(&format!(r"(?i)\b(?:{})\b", alternatives.join("|")))
        .expect("lottery names form a valid pattern")
}

/// Look up an NLB draw slug, accepting identity or slug spelling
pub fn nlb_draw_slug(name: &str) -> Option<&'static str> {
    let wanted = lottery_identity(name);
    NLB_DRAW_SLUGS
        .iter()
        .copied()
        .find(|slug| lottery_identity(slug) == wanted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_normalization() {
        assert_eq!(lottery_identity("Ada Kotipathi"), "ada_kotipathi");
        assert_eq!(lottery_identity("ADA  KOTIPATHI "), "ada_kotipathi");
        assert_eq!(lottery_identity("suba-dawasak"), "suba_dawasak");
        assert_eq!(lottery_identity("super_ball"), "super_ball");
    }

    #[test]
    fn test_canonical_name() {
        assert_eq!(canonical_name(Board::Dlb, "Super  Ball"), Some("SUPER BALL"));
        assert_eq!(canonical_name(Board::Dlb, "superball"), Some("SUPER BALL"));
        assert_eq!(canonical_name(Board::Nlb, "super ball"), None);
    }

    #[test]
    fn test_find_name_prefers_longest() {
        assert_eq!(
            find_name(Board::Nlb, "Results: Shanida Pattare Draw 12"),
            Some("SHANIDA PATTARE")
        );
        assert_eq!(find_name(Board::Dlb, "Shanida 4412"), Some("SHANIDA"));
        assert_eq!(find_name(Board::Dlb, "nothing here"), None);
    }

    #[test]
    fn test_name_pattern_tolerates_spacing() {
        let re = name_pattern(Board::Dlb);
        assert!(re.is_match("ADA   KOTIPATHI 2864"));
        assert!(re.is_match("adakotipathi"));
        assert!(!re.is_match("MAHAJANA SAMPATHA"));
    }

    #[test]
    fn test_nlb_draw_slug() {
        assert_eq!(nlb_draw_slug("mega_power"), Some("mega-power"));
        assert_eq!(nlb_draw_slug("Mega Power"), Some("mega-power"));
        assert_eq!(nlb_draw_slug("lucky-7"), None);
    }
}
