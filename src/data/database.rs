//! SQLite storage for extracted draws

use crate::{Board, DrawRecord, LottoError, Result, Symbol};
use chrono::{Local, NaiveDate, NaiveDateTime};
use rusqlite::types::Type;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use std::collections::BTreeMap;
use std::path::Path;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const DRAW_COLUMNS: &str = "id, board, lottery_identity, draw_number, draw_date, symbols, \
                            prize_amount, source_metadata, scraped_at";

/// Result of saving a single record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    Duplicate,
}

/// Destination for extracted draws
pub trait DrawStore {
    /// Is a draw with this identity and number already stored.
    ///
    /// Always false without a draw number: such records are never duplicates.
    fn exists(&self, lottery_identity: &str, draw_number: Option<&str>) -> Result<bool>;

    fn save(&self, board: Board, record: &DrawRecord) -> Result<SaveOutcome>;
}

/// Counts from one [`save_all`] batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveSummary {
    pub saved: usize,
    pub duplicates: usize,
    pub failed: usize,
}

/// Save every record, logging and counting failures instead of aborting
pub fn save_all(store: &dyn DrawStore, board: Board, records: &[DrawRecord]) -> SaveSummary {
    let mut summary = SaveSummary::default();

    for record in records {
        match store.save(board, record) {
            Ok(SaveOutcome::Saved) => {
                log::debug!(
                    "Saved {} draw {}",
                    record.lottery_identity,
                    record.draw_number.as_deref().unwrap_or("-")
                );
                summary.saved += 1;
            }
            Ok(SaveOutcome::Duplicate) => {
                log::debug!(
                    "Skipping duplicate {} draw {}",
                    record.lottery_identity,
                    record.draw_number.as_deref().unwrap_or("-")
                );
                summary.duplicates += 1;
            }
            Err(e) => {
                log::error!("Failed to save {}: {}", record.lottery_identity, e);
                summary.failed += 1;
            }
        }
    }

    summary
}

/// A draw as stored, with its board and insertion time
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDraw {
    pub id: i64,
    pub board: Board,
    pub record: DrawRecord,
    pub scraped_at: String,
}

/// Database connection and operations
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Create an in-memory database (for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS draws (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                board TEXT NOT NULL,
                lottery_identity TEXT NOT NULL,
                draw_number TEXT,
                draw_date TEXT NOT NULL,
                symbols TEXT NOT NULL,
                prize_amount TEXT,
                source_metadata TEXT NOT NULL DEFAULT '{}',
                scraped_at TEXT NOT NULL
            );

            CREATE UNIQUE INDEX IF NOT EXISTS idx_draws_identity_number
                ON draws(lottery_identity, draw_number);
            CREATE INDEX IF NOT EXISTS idx_draws_date ON draws(draw_date);
            "#,
        )?;
        Ok(())
    }

    /// Plain insert; the unique index turns a repeated key into `Duplicate`
    fn insert(&self, board: Board, record: &DrawRecord) -> Result<SaveOutcome> {
        let symbols = serde_json::to_string(&record.symbols)?;
        let metadata = serde_json::to_string(&record.source_metadata)?;

        let inserted = self.conn.execute(
            "INSERT INTO draws (board, lottery_identity, draw_number, draw_date, symbols,
                                prize_amount, source_metadata, scraped_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                board.code(),
                record.lottery_identity,
                record.draw_number,
                record.draw_date.format(DATE_FORMAT).to_string(),
                symbols,
                record.prize_amount,
                metadata,
                Local::now().format(DATE_FORMAT).to_string(),
            ],
        );

        match inserted {
            Ok(_) => Ok(SaveOutcome::Saved),
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                Ok(SaveOutcome::Duplicate)
            }
            Err(e) => Err(e.into()),
        }
    }

    // ==================== Queries ====================

    /// Most recent draws by draw date, optionally for one board
    pub fn latest_draws(&self, limit: usize, board: Option<Board>) -> Result<Vec<StoredDraw>> {
        let sql = format!(
            "SELECT {} FROM draws
             WHERE (?1 IS NULL OR board = ?1)
             ORDER BY draw_date DESC, id DESC
             LIMIT ?2",
            DRAW_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let draws = stmt
            .query_map(params![board.map(|b| b.code()), limit as i64], Self::row_to_draw)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(draws)
    }

    pub fn find_draw(&self, lottery_identity: &str, draw_number: &str) -> Result<Option<StoredDraw>> {
        let sql = format!(
            "SELECT {} FROM draws WHERE lottery_identity = ?1 AND draw_number = ?2",
            DRAW_COLUMNS
        );
        let draw = self
            .conn
            .query_row(&sql, params![lottery_identity, draw_number], Self::row_to_draw)
            .optional()?;
        Ok(draw)
    }

    /// The newest stored draw of a lottery
    pub fn latest_draw(&self, lottery_identity: &str) -> Result<Option<StoredDraw>> {
        let sql = format!(
            "SELECT {} FROM draws WHERE lottery_identity = ?1
             ORDER BY draw_date DESC, id DESC LIMIT 1",
            DRAW_COLUMNS
        );
        let draw = self
            .conn
            .query_row(&sql, params![lottery_identity], Self::row_to_draw)
            .optional()?;
        Ok(draw)
    }

    fn row_to_draw(row: &rusqlite::Row) -> rusqlite::Result<StoredDraw> {
        let board_code: String = row.get(1)?;
        let board = Board::from_code(&board_code).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                1,
                Type::Text,
                Box::new(LottoError::UnknownBoard(board_code.clone())),
            )
        })?;

        let date_str: String = row.get(4)?;
        let draw_date = NaiveDateTime::parse_from_str(&date_str, DATE_FORMAT)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;

        let symbols_json: String = row.get(5)?;
        let symbols: Vec<Symbol> = serde_json::from_str(&symbols_json)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?;

        let metadata_json: String = row.get(7)?;
        let source_metadata: BTreeMap<String, String> =
            serde_json::from_str(&metadata_json).unwrap_or_default();

        Ok(StoredDraw {
            id: row.get(0)?,
            board,
            record: DrawRecord {
                lottery_identity: row.get(2)?,
                draw_number: row.get(3)?,
                draw_date,
                symbols,
                prize_amount: row.get(6)?,
                source_metadata,
            },
            scraped_at: row.get(8)?,
        })
    }

    // ==================== Statistics ====================

    /// Get database statistics
    pub fn stats(&self) -> Result<DatabaseStats> {
        let count_board = |board: Board| -> Result<usize> {
            let n: i64 = self.conn.query_row(
                "SELECT COUNT(*) FROM draws WHERE board = ?1",
                params![board.code()],
                |row| row.get(0),
            )?;
            Ok(n as usize)
        };

        let draw_count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM draws", [], |row| row.get(0))?;

        let lottery_count: i64 = self.conn.query_row(
            "SELECT COUNT(DISTINCT lottery_identity) FROM draws",
            [],
            |row| row.get(0),
        )?;

        let (min_date, max_date): (Option<String>, Option<String>) = self.conn.query_row(
            "SELECT MIN(draw_date), MAX(draw_date) FROM draws",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        let to_date = |s: String| {
            NaiveDateTime::parse_from_str(&s, DATE_FORMAT)
                .ok()
                .map(|dt| dt.date())
        };

        Ok(DatabaseStats {
            draw_count: draw_count as usize,
            lottery_count: lottery_count as usize,
            dlb_count: count_board(Board::Dlb)?,
            nlb_count: count_board(Board::Nlb)?,
            earliest_draw: min_date.and_then(to_date),
            latest_draw: max_date.and_then(to_date),
        })
    }
}

impl DrawStore for Database {
    fn exists(&self, lottery_identity: &str, draw_number: Option<&str>) -> Result<bool> {
        let Some(draw_number) = draw_number else {
            return Ok(false);
        };
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM draws WHERE lottery_identity = ?1 AND draw_number = ?2",
                params![lottery_identity, draw_number],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn save(&self, board: Board, record: &DrawRecord) -> Result<SaveOutcome> {
        if record.is_deduplicable()
            && self.exists(&record.lottery_identity, record.draw_number.as_deref())?
        {
            return Ok(SaveOutcome::Duplicate);
        }
        self.insert(board, record)
    }
}

/// Database statistics
#[derive(Debug, Clone)]
pub struct DatabaseStats {
    pub draw_count: usize,
    pub lottery_count: usize,
    pub dlb_count: usize,
    pub nlb_count: usize,
    pub earliest_draw: Option<NaiveDate>,
    pub latest_draw: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SymbolType;
    use std::cell::Cell;

    fn draw(identity: &str, number: Option<&str>, day: u32) -> DrawRecord {
        DrawRecord {
            lottery_identity: identity.to_string(),
            draw_number: number.map(str::to_string),
            draw_date: NaiveDate::from_ymd_opt(2026, 1, day)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            symbols: vec![
                Symbol::new(SymbolType::Letter, "Y"),
                Symbol::new(SymbolType::Number, "08"),
            ],
            prize_amount: None,
            source_metadata: BTreeMap::from([("strategy".to_string(), "container".to_string())]),
        }
    }

    #[test]
    fn test_create_database() {
        let db = Database::in_memory().unwrap();
        let stats = db.stats().unwrap();
        assert_eq!(stats.draw_count, 0);
        assert_eq!(stats.lottery_count, 0);
        assert_eq!(stats.earliest_draw, None);
    }

    #[test]
    fn test_duplicate_draw_is_stored_once() {
        let db = Database::in_memory().unwrap();
        let record = draw("ada_kotipathi", Some("2864"), 4);

        assert_eq!(db.save(Board::Dlb, &record).unwrap(), SaveOutcome::Saved);
        assert_eq!(db.save(Board::Dlb, &record).unwrap(), SaveOutcome::Duplicate);
        assert_eq!(db.stats().unwrap().draw_count, 1);
    }

    #[test]
    fn test_unique_index_backstop() {
        let db = Database::in_memory().unwrap();
        let record = draw("sasiri", Some("10"), 4);
        assert_eq!(db.insert(Board::Dlb, &record).unwrap(), SaveOutcome::Saved);
        assert_eq!(db.insert(Board::Dlb, &record).unwrap(), SaveOutcome::Duplicate);
    }

    #[test]
    fn test_records_without_draw_number_are_always_new() {
        let db = Database::in_memory().unwrap();
        let record = draw("kapruka", None, 4);

        assert!(!db.exists("kapruka", None).unwrap());
        assert_eq!(db.save(Board::Dlb, &record).unwrap(), SaveOutcome::Saved);
        assert_eq!(db.save(Board::Dlb, &record).unwrap(), SaveOutcome::Saved);
        assert_eq!(db.stats().unwrap().draw_count, 2);
    }

    #[test]
    fn test_save_all_summary() {
        let db = Database::in_memory().unwrap();
        let records = vec![
            draw("govisetha", Some("4303"), 1),
            draw("govisetha", Some("4303"), 1),
            draw("mahajana_sampatha", Some("6061"), 1),
        ];
        let summary = save_all(&db, Board::Nlb, &records);
        assert_eq!(
            summary,
            SaveSummary {
                saved: 2,
                duplicates: 1,
                failed: 0
            }
        );
    }

    struct FlakyStore {
        calls: Cell<usize>,
    }

    impl DrawStore for FlakyStore {
        fn exists(&self, _lottery_identity: &str, _draw_number: Option<&str>) -> Result<bool> {
            Ok(false)
        }

        fn save(&self, _board: Board, record: &DrawRecord) -> Result<SaveOutcome> {
            self.calls.set(self.calls.get() + 1);
            if record.lottery_identity == "broken" {
                Err(LottoError::Parse("disk full".to_string()))
            } else {
                Ok(SaveOutcome::Saved)
            }
        }
    }

    #[test]
    fn test_failed_save_does_not_abort_batch() {
        let store = FlakyStore { calls: Cell::new(0) };
        let records = vec![
            draw("sasiri", Some("1"), 1),
            draw("broken", Some("2"), 1),
            draw("kapruka", Some("3"), 1),
        ];
        let summary = save_all(&store, Board::Dlb, &records);
        assert_eq!(store.calls.get(), 3);
        assert_eq!(summary.saved, 2);
        assert_eq!(summary.failed, 1);
    }

    #[test]
    fn test_queries() {
        let db = Database::in_memory().unwrap();
        db.save(Board::Dlb, &draw("ada_kotipathi", Some("2863"), 3)).unwrap();
        db.save(Board::Dlb, &draw("ada_kotipathi", Some("2864"), 4)).unwrap();
        db.save(Board::Nlb, &draw("govisetha", Some("4303"), 2)).unwrap();

        let latest = db.latest_draws(10, None).unwrap();
        assert_eq!(latest.len(), 3);
        assert_eq!(latest[0].record.draw_number.as_deref(), Some("2864"));

        let nlb = db.latest_draws(10, Some(Board::Nlb)).unwrap();
        assert_eq!(nlb.len(), 1);
        assert_eq!(nlb[0].board, Board::Nlb);

        let found = db.find_draw("ada_kotipathi", "2863").unwrap().unwrap();
        assert_eq!(found.record, draw("ada_kotipathi", Some("2863"), 3));
        assert!(db.find_draw("ada_kotipathi", "1").unwrap().is_none());

        let newest = db.latest_draw("ada_kotipathi").unwrap().unwrap();
        assert_eq!(newest.record.draw_number.as_deref(), Some("2864"));

        let stats = db.stats().unwrap();
        assert_eq!(stats.draw_count, 3);
        assert_eq!(stats.lottery_count, 2);
        assert_eq!(stats.dlb_count, 2);
        assert_eq!(stats.nlb_count, 1);
        assert_eq!(stats.earliest_draw, NaiveDate::from_ymd_opt(2026, 1, 2));
        assert_eq!(stats.latest_draw, NaiveDate::from_ymd_opt(2026, 1, 4));
    }
}
