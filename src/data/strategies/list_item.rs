//! List-item scan, the same text matching as table rows applied to `li` blocks

use super::{record_from_text, Strategy};
use crate::data::html::{class_matches, has_descendant, text_of};
use crate::{Board, DrawRecord};
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;

static ITEM_CLASS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)result|lottery").unwrap());

pub struct ListItemStrategy {
    board: Board,
}

impl ListItemStrategy {
    pub fn new(board: Board) -> Self {
        ListItemStrategy { board }
    }
}

impl Strategy for ListItemStrategy {
    fn name(&self) -> &'static str {
        "list_item"
    }

    fn try_extract(&self, document: &Html) -> Vec<DrawRecord> {
        let item_selector = Selector::parse("li").unwrap();
        let items: Vec<_> = document.select(&item_selector).collect();

        let hinted: Vec<_> = items
            .iter()
            .copied()
            .filter(|li| class_matches(li, &ITEM_CLASS))
            .collect();
        let blocks = if hinted.is_empty() {
            // Leaf items only, so an outer item does not repeat its children
            items
                .into_iter()
                .filter(|li| !has_descendant(li, "li"))
                .collect()
        } else {
            hinted
        };

        blocks
            .iter()
            .filter_map(|li| record_from_text(self.board, &text_of(li)))
            .collect()
    }
}
