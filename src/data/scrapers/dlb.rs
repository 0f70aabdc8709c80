//! Development Lotteries Board scraper
//!
//! Scrapes the dlb.lk latest-results page.

use super::Scraper;
use crate::data::fetch::Fetcher;
use crate::data::strategies::Cascade;
use crate::{Board, BoardsConfig, DrawRecord, Result};

/// Scraper for dlb.lk
pub struct DlbScraper<'a> {
    fetcher: &'a Fetcher,
    url: String,
    cascade: Cascade,
}

impl<'a> DlbScraper<'a> {
    pub fn new(boards: &BoardsConfig, fetcher: &'a Fetcher) -> Self {
        DlbScraper {
            fetcher,
            url: boards.results_url(Board::Dlb),
            cascade: Cascade::for_board(Board::Dlb),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Scraper for DlbScraper<'_> {
    fn board(&self) -> Board {
        Board::Dlb
    }

    fn fetch_latest(&self) -> Result<Vec<DrawRecord>> {
        log::info!("Fetching DLB results from {}", self.url);
        let html = self.fetcher.fetch(&self.url)?;
        let records = self.cascade.extract(&html);
        if records.is_empty() {
            log::warn!("DLB: no results found on page");
        }
        Ok(records)
    }
}
