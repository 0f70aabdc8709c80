//! Board scrapers: fetch a results page and run the board's cascade

pub mod dlb;
pub mod nlb;

pub use dlb::DlbScraper;
pub use nlb::NlbScraper;

use crate::data::database::{save_all, DrawStore, SaveSummary};
use crate::data::fetch::Fetcher;
use crate::{Board, Config, DrawRecord, Result};

/// Trait for the per-board scrapers
pub trait Scraper {
    /// The board this scraper reads
    fn board(&self) -> Board;

    /// Fetch and extract the board's latest results page
    fn fetch_latest(&self) -> Result<Vec<DrawRecord>>;
}

/// Build the scraper for a board
pub fn scraper_for<'a>(board: Board, config: &Config, fetcher: &'a Fetcher) -> Box<dyn Scraper + 'a> {
    match board {
        Board::Dlb => Box::new(DlbScraper::new(&config.boards, fetcher)),
        Board::Nlb => Box::new(NlbScraper::new(&config.boards, fetcher)),
    }
}

/// Outcome of syncing one board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardReport {
    pub board: Board,
    pub found: usize,
    pub summary: SaveSummary,
    /// Set when the page could not be fetched; nothing was saved
    pub error: Option<String>,
}

/// Scrape each board in turn and save what was found.
///
/// A board whose page cannot be fetched is logged and skipped; the other
/// boards still run.
pub fn sync(scrapers: &[Box<dyn Scraper + '_>], store: &dyn DrawStore) -> Vec<BoardReport> {
    scrapers
        .iter()
        .map(|scraper| {
            let board = scraper.board();
            log::info!("--- {} ---", board);

            match scraper.fetch_latest() {
                Ok(records) => {
                    let summary = save_all(store, board, &records);
                    log::info!(
                        "{}: Found {} results, saved {} new",
                        board,
                        records.len(),
                        summary.saved
                    );
                    BoardReport {
                        board,
                        found: records.len(),
                        summary,
                        error: None,
                    }
                }
                Err(e) => {
                    log::error!("{}: {}", board, e);
                    BoardReport {
                        board,
                        found: 0,
                        summary: SaveSummary::default(),
                        error: Some(e.to_string()),
                    }
                }
            }
        })
        .collect()
}
