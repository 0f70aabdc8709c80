//! NLB per-draw result page
//!
//! `<base>/results/<slug>/<draw>` renders exactly one draw inside
//! `div.lresult`:
//!
//! ```text
//! <div class="lresult">
//!   <h1>Mahajana Sampatha 6061</h1>
//!   <p><b>Draw No.:</b> 6061</p>
//!   <p><b>Date:</b> Thursday January 01, 2026</p>
//!   <ol class="B">
//!     <li class="Letter Circle">L</li>
//!     <li class="Number-1 Circle">05</li>
//!     <li class="Number-1 More">More</li>
//!   </ol>
//! </div>
//! ```

use super::{resolve_date, Strategy};
use crate::data::classify::Hints;
use crate::data::html::{class_matches, text_of};
use crate::data::lotteries::lottery_identity;
use crate::{DrawRecord, Symbol};
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::BTreeMap;
use std::sync::LazyLock;

static DRAW_LABEL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)Draw No\.:").unwrap());
static DATE_LABEL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)Date:").unwrap());
static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());
static BALL_CLASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Number-|Zodiac|Color|Letter").unwrap());
static PRIZE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Rs\.\s*([\d,]+\.?\d*)").unwrap());

/// Build the per-draw page URL
pub fn draw_url(base_url: &str, slug: &str, draw_number: u32) -> String {
    format!(
        "{}/results/{}/{}",
        base_url.trim_end_matches('/'),
        slug,
        draw_number
    )
}

pub struct SingleDrawStrategy {
    slug: String,
    draw_number: u32,
    url: String,
}

impl SingleDrawStrategy {
    pub fn new(base_url: &str, slug: &str, draw_number: u32) -> Self {
        SingleDrawStrategy {
            slug: slug.to_string(),
            draw_number,
            url: draw_url(base_url, slug, draw_number),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Parse the page; `None` when it has no result block
    pub fn parse(&self, document: &Html) -> Option<DrawRecord> {
        let lresult_selector = Selector::parse("div.lresult").unwrap();
        let p_selector = Selector::parse("p").unwrap();
        let h1_selector = Selector::parse("h1").unwrap();
        let list_selector = Selector::parse("ol.B").unwrap();
        let item_selector = Selector::parse("li").unwrap();
        let prize_selector = Selector::parse("div.superprize").unwrap();

        let Some(lresult) = document.select(&lresult_selector).next() else {
            log::warn!("No result block found for {} #{}", self.slug, self.draw_number);
            return None;
        };

        let labelled = |label: &Regex| {
            lresult
                .select(&p_selector)
                .find(|p| label.is_match(&text_of(p)))
        };

        let draw_number = labelled(&DRAW_LABEL)
            .or_else(|| lresult.select(&h1_selector).next())
            .and_then(|e| DIGITS.find(&text_of(&e)).map(|m| m.as_str().to_string()))
            .unwrap_or_else(|| self.draw_number.to_string());

        let mut metadata = BTreeMap::new();
        let date_text = labelled(&DATE_LABEL)
            .map(|p| DATE_LABEL.replace(&text_of(&p), "").trim().to_string());
        let draw_date = resolve_date(date_text.as_deref(), &mut metadata);

        let symbols: Vec<Symbol> = lresult
            .select(&list_selector)
            .flat_map(|list| list.select(&item_selector).collect::<Vec<_>>())
            .filter(|ball| class_matches(ball, &BALL_CLASS))
            .filter_map(|ball| {
                let hints = Hints::from_element(&ball);
                if hints.is_more_control() {
                    return None;
                }
                Symbol::classified(&text_of(&ball), &hints)
            })
            .collect();

        let prize_amount = document
            .select(&prize_selector)
            .next()
            .and_then(|div| PRIZE.captures(&text_of(&div)).map(|c| c[1].replace(',', "")));

        metadata.insert("source_url".to_string(), self.url.clone());
        metadata.insert("scrape_method".to_string(), "individual_draw".to_string());

        log::info!(
            "NLB: Extracted {} draw #{} - {} symbols",
            self.slug,
            draw_number,
            symbols.len()
        );

        Some(DrawRecord {
            lottery_identity: lottery_identity(&self.slug),
            draw_number: Some(draw_number),
            draw_date,
            symbols,
            prize_amount,
            source_metadata: metadata,
        })
    }
}

impl Strategy for SingleDrawStrategy {
    fn name(&self) -> &'static str {
        "single_draw"
    }

    fn try_extract(&self, document: &Html) -> Vec<DrawRecord> {
        self.parse(document).into_iter().collect()
    }
}
