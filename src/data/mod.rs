//! Data ingestion and storage
//!
//! Fetching, extraction strategies for both boards, and SQLite storage.

pub mod classify;
pub mod database;
pub mod dates;
pub mod fetch;
pub mod html;
pub mod lotteries;
pub mod scrapers;
pub mod strategies;

pub use database::{save_all, Database, DrawStore, SaveOutcome, SaveSummary};
pub use fetch::Fetcher;
pub use strategies::{extract, Cascade};
