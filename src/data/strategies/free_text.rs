//! Free-text window scan
//!
//! The least precise strategy: every occurrence of a known lottery name in the
//! page text opens a fixed-size window, and the draw number, date and numerals
//! are read from that window alone. Windows can run into the next result on
//! the page, which is why this only runs after every structured scan missed.

use super::{scan_fields, text_record, Strategy, TextFields, MAX_TEXT_NUMBERS};
use crate::data::html::visible_text;
use crate::data::lotteries::{canonical_name, lottery_identity, name_pattern};
use crate::{Board, DrawRecord};
use regex::Regex;
use scraper::Html;
use std::collections::HashSet;
use std::sync::LazyLock;

/// `SASIRI - 4412 | ...`: a bare draw number right after the name
static TRAILING_DRAW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*-?\s*(\d{3,})\b").unwrap());

pub struct FreeTextStrategy {
    board: Board,
    window: usize,
    names: Regex,
}

impl FreeTextStrategy {
    /// `window` is the number of characters read from the start of each name
    pub fn new(board: Board, window: usize) -> Self {
        FreeTextStrategy {
            board,
            window,
            names: name_pattern(board),
        }
    }

    /// Extract from already-flattened page text
    pub fn extract_text(&self, text: &str) -> Vec<DrawRecord> {
        let mut seen = HashSet::new();
        let mut records = Vec::new();

        for found in self.names.find_iter(text) {
            let Some(name) = canonical_name(self.board, found.as_str()) else {
                continue;
            };

            let after_name: String = text[found.end()..]
                .chars()
                .take(self.window.saturating_sub(found.as_str().chars().count()))
                .collect();

            let mut fields = scan_fields(&after_name, MAX_TEXT_NUMBERS);
            if fields.draw_number.is_none() {
                if let Some(caps) = TRAILING_DRAW.captures(&after_name) {
                    let end = caps.get(0).map(|m| m.end()).unwrap_or(0);
                    let rest = scan_fields(&after_name[end..], MAX_TEXT_NUMBERS);
                    fields = TextFields {
                        draw_number: Some(caps[1].to_string()),
                        ..rest
                    };
                }
            }

            if fields.numbers.is_empty() {
                continue;
            }
            if !seen.insert((lottery_identity(name), fields.draw_number.clone())) {
                continue;
            }
            records.push(text_record(name, fields));
        }

        records
    }
}

impl Strategy for FreeTextStrategy {
    fn name(&self) -> &'static str {
        "free_text"
    }

    fn try_extract(&self, document: &Html) -> Vec<DrawRecord> {
        self.extract_text(&visible_text(document))
    }
}
