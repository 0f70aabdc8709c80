//! Ticket checking against a stored draw

use crate::{DrawRecord, Symbol};
use serde::Serialize;
use std::collections::BTreeSet;

/// Outcome of checking one ticket
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TicketCheck {
    /// Submitted values found among the winning symbols, sorted and deduplicated
    pub matched: Vec<String>,
    pub is_winner: bool,
}

/// Match submitted values against a draw's symbols.
///
/// Comparison ignores case and symbol type: `"y"` matches a letter `Y`, and
/// `"08"` matches whatever symbol carries the value `08`.
pub fn verify_ticket(winning: &[Symbol], submitted: &[String]) -> TicketCheck {
    let winning: BTreeSet<String> = winning
        .iter()
        .map(|s| s.value.trim().to_uppercase())
        .collect();

    let matched: Vec<String> = submitted
        .iter()
        .map(|n| n.trim().to_uppercase())
        .filter(|n| winning.contains(n))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    TicketCheck {
        is_winner: !matched.is_empty(),
        matched,
    }
}

/// A ticket checked against a specific draw
#[derive(Debug, Clone, Serialize)]
pub struct DrawCheck {
    pub lottery_identity: String,
    pub draw_number: Option<String>,
    #[serde(flatten)]
    pub check: TicketCheck,
    /// Prize amount of the draw, only reported for winners
    pub prize_info: Option<String>,
}

pub fn check_draw(draw: &DrawRecord, submitted: &[String]) -> DrawCheck {
    let check = verify_ticket(&draw.symbols, submitted);
    let prize_info = if check.is_winner {
        draw.prize_amount.clone()
    } else {
        None
    };

    DrawCheck {
        lottery_identity: draw.lottery_identity.clone(),
        draw_number: draw.draw_number.clone(),
        check,
        prize_info,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SymbolType;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn winning() -> Vec<Symbol> {
        vec![
            Symbol::new(SymbolType::Number, "08"),
            Symbol::new(SymbolType::Number, "23"),
        ]
    }

    #[test]
    fn test_partial_match_wins() {
        let check = verify_ticket(&winning(), &strings(&["08", "99"]));
        assert_eq!(check.matched, vec!["08"]);
        assert!(check.is_winner);
    }

    #[test]
    fn test_no_match() {
        let check = verify_ticket(&winning(), &strings(&["11", "99"]));
        assert!(check.matched.is_empty());
        assert!(!check.is_winner);
    }

    #[test]
    fn test_case_and_type_insensitive() {
        let symbols = vec![
            Symbol::new(SymbolType::Letter, "Y"),
            Symbol::new(SymbolType::Zodiac, "Cancer"),
            Symbol::new(SymbolType::Super, "23"),
        ];
        let check = verify_ticket(&symbols, &strings(&["23", "y", "CANCER", "23", " y "]));
        assert_eq!(check.matched, vec!["23", "CANCER", "Y"]);
    }

    #[test]
    fn test_prize_only_for_winners() {
        let draw = DrawRecord {
            lottery_identity: "govisetha".to_string(),
            draw_number: Some("4303".to_string()),
            draw_date: NaiveDate::from_ymd_opt(2026, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            symbols: winning(),
            prize_amount: Some("45250000.00".to_string()),
            source_metadata: BTreeMap::new(),
        };

        let won = check_draw(&draw, &strings(&["23"]));
        assert_eq!(won.prize_info.as_deref(), Some("45250000.00"));

        let lost = check_draw(&draw, &strings(&["1"]));
        assert_eq!(lost.prize_info, None);
        assert!(!lost.check.is_winner);
    }
}
