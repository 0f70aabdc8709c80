//! Table-row scan
//!
//! Each row's cell text is joined and matched against the board's known
//! lottery names. Plain rows carry no styling hints, so every numeral is a
//! `number`.

use super::{record_from_text, Strategy};
use crate::data::html::{class_matches, text_of};
use crate::{Board, DrawRecord};
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;

static TABLE_CLASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)result|lottery|draw").unwrap());

pub struct TableRowStrategy {
    board: Board,
}

impl TableRowStrategy {
    pub fn new(board: Board) -> Self {
        TableRowStrategy { board }
    }
}

impl Strategy for TableRowStrategy {
    fn name(&self) -> &'static str {
        "table_row"
    }

    fn try_extract(&self, document: &Html) -> Vec<DrawRecord> {
        let table_selector = Selector::parse("table").unwrap();
        let row_selector = Selector::parse("tr").unwrap();
        let cell_selector = Selector::parse("td, th").unwrap();

        let all_tables: Vec<_> = document.select(&table_selector).collect();
        let hinted: Vec<_> = all_tables
            .iter()
            .copied()
            .filter(|t| class_matches(t, &TABLE_CLASS))
            .collect();
        let tables = if hinted.is_empty() { all_tables } else { hinted };

        let mut records = Vec::new();
        for table in tables {
            for row in table.select(&row_selector) {
                let cells: Vec<String> = row.select(&cell_selector).map(|c| text_of(&c)).collect();
                if cells.len() < 2 {
                    continue;
                }
                if let Some(record) = record_from_text(self.board, &cells.join(" ")) {
                    records.push(record);
                }
            }
        }

        log::debug!("table_row found {} candidate rows", records.len());
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::strategies::Cascade;
    use crate::SymbolType;
    use chrono::NaiveDate;

    const NLB_TABLE: &str = r#"
        <html><body>
        <table class="tbl">
          <tr><th>Lottery</th><th>Draw</th><th>Date</th><th>Numbers</th></tr>
          <tr><td>Govisetha</td><td>Draw #4303</td><td>2026-01-01</td><td>L 05 17 42 63</td></tr>
          <tr><td>Mahajana Sampatha</td><td>Draw: 6061</td><td>01/01/2026</td><td>B 1 2 3 4 5 6</td></tr>
          <tr><td>Unknown Lotto</td><td>Draw 1</td><td>01/01/2026</td><td>1 2</td></tr>
          <tr><td colspan="4">Govisetha</td></tr>
        </table>
        </body></html>
    "#;

    #[test]
    fn test_rows_matching_known_names() {
        let strategy = TableRowStrategy::new(Board::Nlb);
        let records = strategy.try_extract(&Html::parse_document(NLB_TABLE));
        assert_eq!(records.len(), 2);

        let govisetha = &records[0];
        assert_eq!(govisetha.lottery_identity, "govisetha");
        assert_eq!(govisetha.draw_number.as_deref(), Some("4303"));
        assert_eq!(
            govisetha.draw_date.date(),
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
        );
        assert_eq!(govisetha.values(), vec!["05", "17", "42", "63"]);
        assert!(govisetha.symbols.iter().all(|s| s.kind == SymbolType::Number));

        let mahajana = &records[1];
        assert_eq!(mahajana.lottery_identity, "mahajana_sampatha");
        assert_eq!(mahajana.draw_number.as_deref(), Some("6061"));
        assert_eq!(mahajana.values(), vec!["1", "2", "3", "4", "5", "6"]);
    }

    #[test]
    fn test_nlb_cascade_falls_through_to_rows() {
        let records = Cascade::for_board(Board::Nlb).extract(NLB_TABLE);
        assert_eq!(records.len(), 2);
        assert!(records
            .iter()
            .all(|r| r.source_metadata["strategy"] == "table_row"));
    }

    #[test]
    fn test_hinted_tables_take_precedence() {
        let html = r#"
            <table><tr><td>Sasiri</td><td>Draw 1 11 12</td></tr></table>
            <table class="draw-results"><tr><td>Kapruka</td><td>Draw 2 21 22</td></tr></table>"#;
        let records = TableRowStrategy::new(Board::Dlb).try_extract(&Html::parse_document(html));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].lottery_identity, "kapruka");
    }
}
