//! Sri Lankan lottery results extraction
//!
//! Cascading, markup-tolerant scrapers for the Development Lotteries Board (DLB)
//! and National Lotteries Board (NLB) result pages.

pub mod data;
pub mod verify;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Lottery board publishing the results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Board {
    Dlb,
    Nlb,
}

impl Board {
    pub const ALL: [Board; 2] = [Board::Dlb, Board::Nlb];

    pub fn code(&self) -> &'static str {
        match self {
            Board::Dlb => "DLB",
            Board::Nlb => "NLB",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_uppercase().as_str() {
            "DLB" => Some(Board::Dlb),
            "NLB" => Some(Board::Nlb),
            _ => None,
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Board {
    type Err = LottoError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Board::from_code(s).ok_or_else(|| LottoError::UnknownBoard(s.to_string()))
    }
}

/// Role of a single result token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolType {
    Number,
    Letter,
    Zodiac,
    Super,
    Promotional,
}

impl SymbolType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolType::Number => "number",
            SymbolType::Letter => "letter",
            SymbolType::Zodiac => "zodiac",
            SymbolType::Super => "super",
            SymbolType::Promotional => "promotional",
        }
    }
}

impl fmt::Display for SymbolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One typed token of a draw result, serialized as `{"type": .., "value": ..}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol {
    #[serde(rename = "type")]
    pub kind: SymbolType,
    pub value: String,
}

impl Symbol {
    pub fn new(kind: SymbolType, value: impl Into<String>) -> Self {
        Symbol {
            kind,
            value: value.into(),
        }
    }

    /// Classify a raw token using its markup hints.
    ///
    /// Returns `None` for empty or whitespace-only text, which is never classified.
    pub fn classified(text: &str, hints: &data::classify::Hints) -> Option<Self> {
        let value = text.trim();
        if value.is_empty() {
            return None;
        }
        Some(Symbol::new(data::classify::classify(value, hints), value))
    }
}

/// A single extracted lottery draw
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawRecord {
    pub lottery_identity: String,
    pub draw_number: Option<String>,
    /// Extraction time when the page date could not be parsed
    pub draw_date: NaiveDateTime,
    pub symbols: Vec<Symbol>,
    pub prize_amount: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub source_metadata: BTreeMap<String, String>,
}

impl DrawRecord {
    /// Records without a draw number are never treated as duplicates
    pub fn is_deduplicable(&self) -> bool {
        self.draw_number.is_some()
    }

    /// True when `draw_date` is a substituted "now" rather than a parsed date
    pub fn date_defaulted(&self) -> bool {
        self.source_metadata
            .get("date_defaulted")
            .map(|v| v == "true")
            .unwrap_or(false)
    }

    /// Symbol values in presentation order
    pub fn values(&self) -> Vec<&str> {
        self.symbols.iter().map(|s| s.value.as_str()).collect()
    }
}

/// Application-wide errors
#[derive(Debug, Error)]
pub enum LottoError {
    #[error("Fetch failed for {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown board: {0} (expected dlb or nlb)")]
    UnknownBoard(String),

    #[error("Unknown lottery: {0}")]
    UnknownLottery(String),

    #[error("No draw found for {lottery}{}", draw_suffix(.draw_number))]
    DrawNotFound {
        lottery: String,
        draw_number: Option<String>,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, LottoError>;

fn draw_suffix(draw_number: &Option<String>) -> String {
    draw_number
        .as_deref()
        .map(|n| format!(" draw #{}", n))
        .unwrap_or_default()
}

/// Application configuration loaded from lotto.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub fetch: FetchConfig,
    pub boards: BoardsConfig,
    pub data: DataConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,
    pub timeout_secs: u64,
    pub handshake_delay_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardsConfig {
    pub dlb_base_url: String,
    pub dlb_results_path: String,
    pub nlb_base_url: String,
    pub nlb_results_path: String,
    pub nlb_cookie_domain: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub database_path: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        FetchConfig {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8".to_string(),
            accept_language: "en-US,en;q=0.5".to_string(),
            timeout_secs: 15,
            handshake_delay_secs: 3,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            fetch: FetchConfig::default(),
            boards: BoardsConfig {
                dlb_base_url: "https://www.dlb.lk".to_string(),
                dlb_results_path: "/result/en".to_string(),
                nlb_base_url: "https://www.nlb.lk".to_string(),
                nlb_results_path: "/English/results/".to_string(),
                nlb_cookie_domain: ".nlb.lk".to_string(),
            },
            data: DataConfig {
                database_path: "data/lottery_results.db".to_string(),
            },
        }
    }
}

impl BoardsConfig {
    pub fn results_url(&self, board: Board) -> String {
        match board {
            Board::Dlb => format!("{}{}", self.dlb_base_url, self.dlb_results_path),
            Board::Nlb => format!("{}{}", self.nlb_base_url, self.nlb_results_path),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            LottoError::Config(format!("Failed to read config file {}: {}", path, e))
        })?;
        toml::from_str(&content)
            .map_err(|e| LottoError::Config(format!("Failed to parse config: {}", e)))
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| LottoError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
