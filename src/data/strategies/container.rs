//! Structured result-card scan
//!
//! Result cards are located by loose class-name patterns rather than exact
//! selectors, because neither board treats its markup as a stable contract.
//! A DLB card looks like:
//!
//! ```text
//! <div class="lottery_result_box">
//!   <h2 class="lot_m_re_heading">Ada Kotipathi</h2>
//!   <h3 class="lot_m_re_date">Draw Number - 2864  |  2026-Jan-04 Sunday</h3>
//!   <ul class="result_detail_result">
//!     <li><h6 class="eng_letter">Y</h6></li>
//!     <li><h6 class="number_circle">08</h6></li>
//!   </ul>
//! </div>
//! ```

use super::{resolve_date, Strategy, DATE_TOKEN, DRAW_NUMBER};
use crate::data::classify::Hints;
use crate::data::html::{class_matches, text_of};
use crate::data::lotteries::lottery_identity;
use crate::{DrawRecord, Symbol};
use regex::Regex;
use scraper::{ElementRef, Html};
use std::collections::BTreeMap;
use std::sync::LazyLock;

static DRAW_AND_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)draw\s*number\s*-\s*(\d+)\s*\|\s*(.+)").unwrap());

/// Structural hints describing a board's result cards
#[derive(Debug, Clone)]
pub struct ContainerLayout {
    pub container_tags: &'static [&'static str],
    pub container_class: Regex,
    pub heading_tags: &'static [&'static str],
    pub heading_class: Regex,
    pub date_tags: &'static [&'static str],
    pub date_class: Regex,
    pub list_tags: &'static [&'static str],
    pub list_class: Regex,
    /// Element inside each list item holding the symbol; the item itself when `None`
    pub symbol_tag: Option<&'static str>,
}

impl ContainerLayout {
    pub fn dlb() -> Self {
        ContainerLayout {
            container_tags: &["div"],
            container_class: Regex::new(r"(?i)result|lottery|card|draw").unwrap(),
            heading_tags: &["h2", "h3", "h4"],
            heading_class: Regex::new(r"(?i)lot_m_re_heading|lottery.*name").unwrap(),
            date_tags: &["h3", "h4", "div"],
            date_class: Regex::new(r"(?i)lot_m_re_date|date").unwrap(),
            list_tags: &["ul"],
            list_class: Regex::new(r"(?i)result_detail_result").unwrap(),
            symbol_tag: Some("h6"),
        }
    }

    pub fn nlb() -> Self {
        ContainerLayout {
            container_tags: &["div"],
            container_class: Regex::new(r"(?i)result|lottery|card").unwrap(),
            heading_tags: &["h1", "h2", "h3", "h4"],
            heading_class: Regex::new(r"(?i)heading|lottery.*name|^name$|title").unwrap(),
            date_tags: &["h3", "h4", "div", "p", "span"],
            date_class: Regex::new(r"(?i)date").unwrap(),
            list_tags: &["ol", "ul"],
            list_class: Regex::new(r"(?i)^B$|ball|result").unwrap(),
            symbol_tag: None,
        }
    }
}

pub struct ContainerStrategy {
    layout: ContainerLayout,
}

impl ContainerStrategy {
    pub fn new(layout: ContainerLayout) -> Self {
        ContainerStrategy { layout }
    }

    fn find<'a>(
        &self,
        root: ElementRef<'a>,
        tags: &[&str],
        class: &Regex,
    ) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        let tags: Vec<String> = tags.iter().map(|t| t.to_string()).collect();
        let class = class.clone();
        root.descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .filter(move |e| tags.iter().any(|t| t == e.value().name()) && class_matches(e, &class))
    }

    /// Parse a single candidate container
    fn parse_container(&self, container: ElementRef) -> Option<DrawRecord> {
        let layout = &self.layout;

        let mut headings = self.find(container, layout.heading_tags, &layout.heading_class);
        let heading = headings.next()?;
        if headings.next().is_some() {
            // A wrapper around several cards; the cards themselves are candidates too
            return None;
        }

        let name = text_of(&heading);
        if name.is_empty() {
            return None;
        }

        let mut metadata = BTreeMap::new();
        let (draw_number, date_text) = self
            .find(container, layout.date_tags, &layout.date_class)
            .find(|e| *e != heading)
            .map(|e| split_draw_line(&text_of(&e)))
            .unwrap_or((None, None));
        let draw_date = resolve_date(date_text.as_deref(), &mut metadata);

        let symbols: Vec<Symbol> = self
            .find(container, layout.list_tags, &layout.list_class)
            .next()
            .map(|list| self.parse_symbols(list))
            .unwrap_or_default();

        if symbols.is_empty() {
            return None;
        }

        log::debug!(
            "Parsed card {} draw {:?}: {} symbols",
            name,
            draw_number,
            symbols.len()
        );

        Some(DrawRecord {
            lottery_identity: lottery_identity(&name),
            draw_number,
            draw_date,
            symbols,
            prize_amount: None,
            source_metadata: metadata,
        })
    }

    fn parse_symbols(&self, list: ElementRef) -> Vec<Symbol> {
        list.descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .filter(|e| e.value().name() == "li")
            .filter(|item| !Hints::from_element(item).is_more_control())
            .filter_map(|item| match self.layout.symbol_tag {
                Some(tag) => item
                    .descendants()
                    .skip(1)
                    .filter_map(ElementRef::wrap)
                    .find(|e| e.value().name() == tag),
                None => Some(item),
            })
            .filter_map(|element| Symbol::classified(&text_of(&element), &Hints::from_element(&element)))
            .collect()
    }
}

/// Split `Draw Number - 2864 | 2026-Jan-04 Sunday` into its draw number and date text.
///
/// After the bar, the first date token wins; the whole tail is kept only when
/// it holds none (written-out dates such as `Thursday January 01, 2026`).
fn split_draw_line(text: &str) -> (Option<String>, Option<String>) {
    if let Some(caps) = DRAW_AND_DATE.captures(text) {
        let date_text = caps.get(2).map(|tail| {
            DATE_TOKEN
                .find(tail.as_str())
                .map_or(tail.as_str().trim(), |m| m.as_str())
                .to_string()
        });
        return (caps.get(1).map(|m| m.as_str().to_string()), date_text);
    }

    let draw_number = DRAW_NUMBER
        .captures(text)
        .and_then(|c| c.get(1).or_else(|| c.get(2)))
        .map(|m| m.as_str().to_string());
    let date_text = DATE_TOKEN.find(text).map(|m| m.as_str().to_string());
    (draw_number, date_text)
}

impl Strategy for ContainerStrategy {
    fn name(&self) -> &'static str {
        "container"
    }

    fn try_extract(&self, document: &Html) -> Vec<DrawRecord> {
        self.find(
            document.root_element(),
            self.layout.container_tags,
            &self.layout.container_class,
        )
        .filter_map(|container| self.parse_container(container))
        .collect()
    }
}
