//! National Lotteries Board scraper
//!
//! Reads nlb.lk's latest-results page, and single draws from the per-draw
//! pages at `/results/<slug>/<draw>`. Both sit behind the cookie bot check.

use super::Scraper;
use crate::data::database::{DrawStore, SaveOutcome, SaveSummary};
use crate::data::fetch::Fetcher;
use crate::data::lotteries::{lottery_identity, nlb_draw_slug};
use crate::data::strategies::{Cascade, SingleDrawStrategy, Strategy};
use crate::{Board, BoardsConfig, DrawRecord, LottoError, Result};
use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;

static SLUG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap());

/// Scraper for nlb.lk
pub struct NlbScraper<'a> {
    fetcher: &'a Fetcher,
    base_url: String,
    url: String,
    cookie_domain: String,
    cascade: Cascade,
}

impl<'a> NlbScraper<'a> {
    pub fn new(boards: &BoardsConfig, fetcher: &'a Fetcher) -> Self {
        NlbScraper {
            fetcher,
            base_url: boards.nlb_base_url.clone(),
            url: boards.results_url(Board::Nlb),
            cookie_domain: boards.nlb_cookie_domain.clone(),
            cascade: Cascade::for_board(Board::Nlb),
        }
    }

    /// Check the draw number and build the strategy for its page
    fn draw_strategy(&self, lottery: &str, draw_number: u32) -> Result<SingleDrawStrategy> {
        let slug = resolve_slug(lottery)?;
        if draw_number == 0 {
            return Err(LottoError::InvalidInput(
                "draw number must be greater than zero".to_string(),
            ));
        }
        Ok(SingleDrawStrategy::new(&self.base_url, &slug, draw_number))
    }

    /// Fetch one draw; `None` when the page has no usable result
    pub fn fetch_draw(&self, lottery: &str, draw_number: u32) -> Result<Option<DrawRecord>> {
        let strategy = self.draw_strategy(lottery, draw_number)?;
        let html = self
            .fetcher
            .fetch_with_handshake(strategy.url(), &self.cookie_domain)?;
        Ok(parse_draw_page(strategy, &html))
    }

    /// Fetch and store draws `first..=last` of one lottery.
    ///
    /// Draws already stored are not fetched again. Fetch failures and empty
    /// pages count as failed and the run moves on to the next draw.
    pub fn backfill(
        &self,
        lottery: &str,
        first: u32,
        last: u32,
        store: &dyn DrawStore,
        delay: Duration,
    ) -> Result<SaveSummary> {
        if first > last {
            return Err(LottoError::InvalidInput(format!(
                "empty draw range {}..{}",
                first, last
            )));
        }
        self.draw_strategy(lottery, first)?;
        let identity = lottery_identity(&resolve_slug(lottery)?);

        let mut summary = SaveSummary::default();
        let mut fetched_any = false;

        for draw_number in first..=last {
            if store.exists(&identity, Some(&draw_number.to_string()))? {
                log::info!("Draw #{}: already stored, skipping", draw_number);
                summary.duplicates += 1;
                continue;
            }

            if fetched_any {
                std::thread::sleep(delay);
            }
            fetched_any = true;

            match self.fetch_draw(lottery, draw_number) {
                Ok(Some(record)) => match store.save(Board::Nlb, &record) {
                    Ok(SaveOutcome::Saved) => summary.saved += 1,
                    Ok(SaveOutcome::Duplicate) => summary.duplicates += 1,
                    Err(e) => {
                        log::error!("Draw #{}: failed to save: {}", draw_number, e);
                        summary.failed += 1;
                    }
                },
                Ok(None) => {
                    log::warn!("Draw #{}: no result on page", draw_number);
                    summary.failed += 1;
                }
                Err(e) => {
                    log::error!("Draw #{}: {}", draw_number, e);
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }
}

/// URL slug for a lottery name, identity or slug.
///
/// Known lotteries map to their catalogue slug. Anything else is used as-is
/// once normalised to lowercase words joined by `-`.
fn resolve_slug(lottery: &str) -> Result<String> {
    if let Some(slug) = nlb_draw_slug(lottery) {
        return Ok(slug.to_string());
    }
    let slug = lottery_identity(lottery).replace('_', "-");
    if SLUG.is_match(&slug) {
        log::debug!("{} is not a known NLB lottery, using slug {}", lottery, slug);
        Ok(slug)
    } else {
        Err(LottoError::UnknownLottery(lottery.to_string()))
    }
}

/// Run a per-draw page through its strategy; symbol-less results are dropped
fn parse_draw_page(strategy: SingleDrawStrategy, html: &str) -> Option<DrawRecord> {
    let strategies: Vec<Box<dyn Strategy>> = vec![Box::new(strategy)];
    Cascade::new(Board::Nlb, strategies)
        .extract(html)
        .into_iter()
        .next()
}

impl Scraper for NlbScraper<'_> {
    fn board(&self) -> Board {
        Board::Nlb
    }

    fn fetch_latest(&self) -> Result<Vec<DrawRecord>> {
        log::info!("Fetching NLB results from {}", self.url);
        let html = self
            .fetcher
            .fetch_with_handshake(&self.url, &self.cookie_domain)?;
        let records = self.cascade.extract(&html);
        if records.is_empty() {
            log::warn!("NLB: no results found on page");
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::database::Database;
    use crate::Config;

    fn scraper_parts() -> (Config, Fetcher) {
        let config = Config::default();
        let fetcher = Fetcher::new(&config.fetch).unwrap();
        (config, fetcher)
    }

    #[test]
    fn test_draw_strategy_validation() {
        let (config, fetcher) = scraper_parts();
        let scraper = NlbScraper::new(&config.boards, &fetcher);

        let strategy = scraper.draw_strategy("mahajana_sampatha", 6061).unwrap();
        assert_eq!(strategy.url(), "https://www.nlb.lk/results/mahajana-sampatha/6061");

        assert!(matches!(
            scraper.draw_strategy("Lucky Seven!", 1),
            Err(LottoError::UnknownLottery(_))
        ));
        assert!(matches!(
            scraper.draw_strategy("govisetha", 0),
            Err(LottoError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_slug_outside_catalogue() {
        let (config, fetcher) = scraper_parts();
        let scraper = NlbScraper::new(&config.boards, &fetcher);

        let strategy = scraper.draw_strategy("sevana", 1).unwrap();
        assert_eq!(strategy.url(), "https://www.nlb.lk/results/sevana/1");

        let strategy = scraper.draw_strategy("Jathika Sampatha", 12).unwrap();
        assert_eq!(strategy.url(), "https://www.nlb.lk/results/jathika-sampatha/12");

        assert_eq!(resolve_slug("MEGA_POWER").unwrap(), "mega-power");
        assert!(resolve_slug("").is_err());
        assert!(resolve_slug("../admin").is_err());
    }

    #[test]
    fn test_parse_draw_page() {
        let (config, fetcher) = scraper_parts();
        let scraper = NlbScraper::new(&config.boards, &fetcher);

        let html = r#"<div class="lresult">
            <p><b>Draw No.:</b> 4303</p>
            <p><b>Date:</b> Thursday January 01, 2026</p>
            <ol class="B">
              <li class="Letter Circle">L</li>
              <li class="Number-1 Circle">05</li>
              <li class="Number-1 More">More</li>
            </ol></div>"#;
        let record = parse_draw_page(scraper.draw_strategy("govisetha", 4303).unwrap(), html).unwrap();
        assert_eq!(record.lottery_identity, "govisetha");
        assert_eq!(record.values(), vec!["L", "05"]);
        assert_eq!(record.source_metadata["strategy"], "single_draw");

        let empty = r#"<div class="lresult"><ol class="B"></ol></div>"#;
        assert!(parse_draw_page(scraper.draw_strategy("govisetha", 4304).unwrap(), empty).is_none());
    }

    #[test]
    fn test_backfill_rejects_bad_input() {
        let (config, fetcher) = scraper_parts();
        let scraper = NlbScraper::new(&config.boards, &fetcher);
        let db = Database::in_memory().unwrap();

        assert!(matches!(
            scraper.backfill("govisetha", 10, 5, &db, Duration::ZERO),
            Err(LottoError::InvalidInput(_))
        ));
        assert!(matches!(
            scraper.backfill("govisetha", 0, 2, &db, Duration::ZERO),
            Err(LottoError::InvalidInput(_))
        ));
        assert!(matches!(
            scraper.backfill("no such/lottery", 1, 2, &db, Duration::ZERO),
            Err(LottoError::UnknownLottery(_))
        ));
    }
}
