//! Extraction strategies and the per-board cascade
//!
//! Each strategy is a self-contained way of reading draws out of a results
//! page. A [`Cascade`] tries them from most to least precise and stops at the
//! first one that yields anything: free-text matching misreads date fragments
//! as winning numbers far more often than structured markup does, so it only
//! runs when nothing structured matched.

pub mod container;
pub mod free_text;
pub mod list_item;
pub mod script;
pub mod single_draw;
pub mod table;

pub use container::{ContainerLayout, ContainerStrategy};
pub use free_text::FreeTextStrategy;
pub use list_item::ListItemStrategy;
pub use script::ScriptStrategy;
pub use single_draw::SingleDrawStrategy;
pub use table::TableRowStrategy;

use crate::data::dates::try_parse_date;
use crate::data::lotteries::{find_name, lottery_identity};
use crate::{Board, DrawRecord, Symbol, SymbolType};
use chrono::{Local, NaiveDateTime, NaiveTime};
use regex::Regex;
use scraper::Html;
use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;

/// Maximum number of numeric tokens taken from a text block
pub const MAX_TEXT_NUMBERS: usize = 10;

pub(crate) static DRAW_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)draw\s*(?:number|no\.?)?\s*[-#:]*\s*(\d+)|#\s*(\d+)").unwrap()
});
pub(crate) static DATE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\d{4}[-/][A-Za-z]{3}[-/]\d{1,2}|\d{4}[-/]\d{1,2}[-/]\d{1,2}|\d{1,2}[-/][A-Za-z]{3}[-/]\d{4}|\d{1,2}[-/]\d{1,2}[-/]\d{4}",
    )
    .unwrap()
});
static SMALL_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(\d{1,2})\b").unwrap());

/// One way of reading draw records out of a parsed document
pub trait Strategy {
    /// Short name recorded in each record's metadata
    fn name(&self) -> &'static str;

    /// Extract every record this strategy can find; empty means "no match"
    fn try_extract(&self, document: &Html) -> Vec<DrawRecord>;
}

/// Receives cascade progress; the default methods do nothing
pub trait ExtractionObserver {
    fn strategy_started(&mut self, _strategy: &'static str) {}
    fn strategy_finished(&mut self, _strategy: &'static str, _records: usize) {}
}

/// Forwards cascade progress to the `log` facade
pub struct LogObserver {
    board: Board,
}

impl LogObserver {
    pub fn new(board: Board) -> Self {
        LogObserver { board }
    }
}

impl ExtractionObserver for LogObserver {
    fn strategy_started(&mut self, strategy: &'static str) {
        log::debug!("{}: trying {} strategy", self.board, strategy);
    }

    fn strategy_finished(&mut self, strategy: &'static str, records: usize) {
        if records > 0 {
            log::info!("{}: {} strategy found {} results", self.board, strategy, records);
        } else {
            log::debug!("{}: {} strategy found nothing", self.board, strategy);
        }
    }
}

/// Ordered strategies for one board; first non-empty result wins
pub struct Cascade {
    board: Board,
    strategies: Vec<Box<dyn Strategy>>,
}

impl Cascade {
    pub fn new(board: Board, strategies: Vec<Box<dyn Strategy>>) -> Self {
        Cascade { board, strategies }
    }

    /// The standard cascade for a board's latest-results page
    pub fn for_board(board: Board) -> Self {
        let strategies: Vec<Box<dyn Strategy>> = match board {
            Board::Dlb => vec![
                Box::new(ContainerStrategy::new(ContainerLayout::dlb())),
                Box::new(TableRowStrategy::new(Board::Dlb)),
                Box::new(ListItemStrategy::new(Board::Dlb)),
                Box::new(FreeTextStrategy::new(Board::Dlb, 200)),
                Box::new(ScriptStrategy),
            ],
            Board::Nlb => vec![
                Box::new(ContainerStrategy::new(ContainerLayout::nlb())),
                Box::new(TableRowStrategy::new(Board::Nlb)),
                Box::new(ListItemStrategy::new(Board::Nlb)),
                Box::new(FreeTextStrategy::new(Board::Nlb, 300)),
            ],
        };
        Cascade::new(board, strategies)
    }

    /// Run the cascade over raw HTML, logging progress
    pub fn extract(&self, html: &str) -> Vec<DrawRecord> {
        let document = Html::parse_document(html);
        self.run(&document, &mut LogObserver::new(self.board))
    }

    /// Run the cascade over a raw (possibly non-UTF-8) response body
    pub fn extract_bytes(&self, body: &[u8]) -> Vec<DrawRecord> {
        self.extract(&String::from_utf8_lossy(body))
    }

    pub fn run(&self, document: &Html, observer: &mut dyn ExtractionObserver) -> Vec<DrawRecord> {
        for strategy in &self.strategies {
            observer.strategy_started(strategy.name());
            let records = finish(strategy.name(), strategy.try_extract(document));
            observer.strategy_finished(strategy.name(), records.len());
            if !records.is_empty() {
                return records;
            }
        }
        Vec::new()
    }
}

/// Extract draws from a board's results page with its standard cascade
pub fn extract(board: Board, html: &str) -> Vec<DrawRecord> {
    Cascade::for_board(board).extract(html)
}

/// Drop symbol-less records and exact repeats, and stamp the strategy name
fn finish(strategy: &'static str, records: Vec<DrawRecord>) -> Vec<DrawRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|r| !r.symbols.is_empty())
        .filter(|r| {
            seen.insert((
                r.lottery_identity.clone(),
                r.draw_number.clone(),
                r.symbols.clone(),
            ))
        })
        .map(|mut r| {
            r.source_metadata
                .insert("strategy".to_string(), strategy.to_string());
            r
        })
        .collect()
}

/// Draw number, date and small numerals found in a block of text
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextFields {
    pub draw_number: Option<String>,
    pub date_text: Option<String>,
    pub numbers: Vec<String>,
}

/// Scan free text for a draw number, a date and up to `max_numbers` numerals.
///
/// The draw number and date spans are blanked out before numerals are
/// collected so their digits are not mistaken for winning numbers.
pub fn scan_fields(text: &str, max_numbers: usize) -> TextFields {
    let mut remaining = text.to_string();
    let mut fields = TextFields::default();

    if let Some(caps) = DRAW_NUMBER.captures(text) {
        fields.draw_number = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str().to_string());
        if let Some(whole) = caps.get(0) {
            blank(&mut remaining, whole.start(), whole.end());
        }
    }

    if let Some(m) = DATE_TOKEN.find(text) {
        fields.date_text = Some(m.as_str().to_string());
        blank(&mut remaining, m.start(), m.end());
    }

    fields.numbers = SMALL_NUMBER
        .captures_iter(&remaining)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .take(max_numbers)
        .collect();

    fields
}

fn blank(text: &mut String, start: usize, end: usize) {
    let spaces = " ".repeat(end - start);
    text.replace_range(start..end, &spaces);
}

/// Resolve a date string, recording in `metadata` when "now" was substituted
pub(crate) fn resolve_date(
    date_text: Option<&str>,
    metadata: &mut BTreeMap<String, String>,
) -> NaiveDateTime {
    match date_text.and_then(try_parse_date) {
        Some(date) => date.and_time(NaiveTime::MIN),
        None => {
            metadata.insert("date_defaulted".to_string(), "true".to_string());
            Local::now().naive_local()
        }
    }
}

/// Build a record from a text block that names one of the board's lotteries.
///
/// Used by the row, list-item and window scans; symbols are always typed
/// `number` since plain text carries no hints.
pub(crate) fn record_from_text(board: Board, text: &str) -> Option<DrawRecord> {
    let name = find_name(board, text)?;
    let fields = scan_fields(text, MAX_TEXT_NUMBERS);
    Some(text_record(name, fields))
}

pub(crate) fn text_record(name: &str, fields: TextFields) -> DrawRecord {
    let mut metadata = BTreeMap::new();
    let draw_date = resolve_date(fields.date_text.as_deref(), &mut metadata);
    DrawRecord {
        lottery_identity: lottery_identity(name),
        draw_number: fields.draw_number,
        draw_date,
        symbols: fields
            .numbers
            .into_iter()
            .map(|n| Symbol::new(SymbolType::Number, n))
            .collect(),
        prize_amount: None,
        source_metadata: metadata,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Fixed {
        name: &'static str,
        records: Vec<DrawRecord>,
        calls: Rc<RefCell<Vec<&'static str>>>,
    }

    impl Strategy for Fixed {
        fn name(&self) -> &'static str {
            self.name
        }

        fn try_extract(&self, _document: &Html) -> Vec<DrawRecord> {
            self.calls.borrow_mut().push(self.name);
            self.records.clone()
        }
    }

    fn sample(identity: &str, draw: &str) -> DrawRecord {
        text_record(
            identity,
            TextFields {
                draw_number: Some(draw.to_string()),
                date_text: Some("2026-01-04".to_string()),
                numbers: vec!["08".to_string()],
            },
        )
    }

    #[derive(Default)]
    struct Recorder {
        started: Vec<&'static str>,
    }

    impl ExtractionObserver for Recorder {
        fn strategy_started(&mut self, strategy: &'static str) {
            self.started.push(strategy);
        }
    }

    #[test]
    fn test_cascade_stops_at_first_match() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let strategy = |name: &'static str, records: Vec<DrawRecord>| -> Box<dyn Strategy> {
            Box::new(Fixed {
                name,
                records,
                calls: calls.clone(),
            })
        };
        let cascade = Cascade::new(
            Board::Dlb,
            vec![
                strategy("first", vec![]),
                strategy("second", vec![sample("sasiri", "1")]),
                strategy("third", vec![sample("kapruka", "2")]),
            ],
        );

        let document = Html::parse_document("<html></html>");
        let mut recorder = Recorder::default();
        let records = cascade.run(&document, &mut recorder);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].lottery_identity, "sasiri");
        assert_eq!(records[0].source_metadata["strategy"], "second");
        assert_eq!(*calls.borrow(), vec!["first", "second"]);
        assert_eq!(recorder.started, vec!["first", "second"]);
    }

    #[test]
    fn test_symbol_less_records_do_not_count_as_match() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut empty = sample("sasiri", "1");
        empty.symbols.clear();
        let cascade = Cascade::new(
            Board::Dlb,
            vec![
                Box::new(Fixed {
                    name: "empty",
                    records: vec![empty],
                    calls: calls.clone(),
                }),
                Box::new(Fixed {
                    name: "next",
                    records: vec![sample("kapruka", "9")],
                    calls: calls.clone(),
                }),
            ],
        );

        let records = cascade.run(&Html::parse_document(""), &mut Recorder::default());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].lottery_identity, "kapruka");
    }

    #[test]
    fn test_exact_duplicates_are_dropped() {
        let records = finish(
            "container",
            vec![sample("sasiri", "1"), sample("sasiri", "1"), sample("sasiri", "2")],
        );
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_scan_fields_ignores_date_digits() {
        let fields = scan_fields("GOVISETHA Draw 4303 2026-01-04 L 05 17 42 63", 10);
        assert_eq!(fields.draw_number.as_deref(), Some("4303"));
        assert_eq!(fields.date_text.as_deref(), Some("2026-01-04"));
        assert_eq!(fields.numbers, vec!["05", "17", "42", "63"]);
    }

    #[test]
    fn test_scan_fields_caps_numbers() {
        let text = (1..=15).map(|n| n.to_string()).collect::<Vec<_>>().join(" ");
        let fields = scan_fields(&text, MAX_TEXT_NUMBERS);
        assert_eq!(fields.numbers.len(), 10);
        assert_eq!(fields.draw_number, None);
        assert_eq!(fields.date_text, None);
    }

    #[test]
    fn test_draw_number_variants() {
        for (text, expected) in [
            ("Draw Number - 2864", "2864"),
            ("Draw No.: 177", "177"),
            ("Draw #12", "12"),
            ("Draw: 55", "55"),
            ("Result #901", "901"),
        ] {
            let fields = scan_fields(text, 10);
            assert_eq!(fields.draw_number.as_deref(), Some(expected), "{}", text);
        }
    }

    #[test]
    fn test_record_from_text_marks_defaulted_date() {
        let record = record_from_text(Board::Nlb, "MAHAJANA SAMPATHA Draw 6061 B 1 2 3").unwrap();
        assert_eq!(record.lottery_identity, "mahajana_sampatha");
        assert_eq!(record.draw_number.as_deref(), Some("6061"));
        assert!(record.date_defaulted());
        assert!(record.symbols.iter().all(|s| s.kind == SymbolType::Number));
        assert_eq!(record.values(), vec!["1", "2", "3"]);
    }
}
