//! Sri Lankan lottery results CLI
//!
//! Scrapes DLB and NLB result pages into a local SQLite database.

use clap::{Parser, Subcommand};
use lotto::{Board, Config, Result};

#[derive(Parser)]
#[command(name = "lotto")]
#[command(about = "Sri Lankan lottery results scraper (DLB and NLB)", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "lotto.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new project with default config
    Init,
    /// Fetch the latest results pages and store new draws
    Sync {
        /// Only sync one board (dlb or nlb)
        #[arg(long)]
        board: Option<Board>,
    },
    /// Fetch and store a single NLB draw
    Draw {
        /// Lottery slug or name, e.g. mahajana-sampatha
        lottery: String,
        /// Draw number
        number: u32,
    },
    /// Fetch and store a range of NLB draws
    Backfill {
        /// Lottery slug or name
        lottery: String,
        /// First draw number
        first: u32,
        /// Last draw number (inclusive)
        last: u32,
        /// Seconds to wait between requests
        #[arg(long, default_value = "4")]
        delay: u64,
    },
    /// Extract draws from a saved HTML page (no network)
    Parse {
        /// HTML file
        file: String,
        /// Board the page came from
        #[arg(long)]
        board: Board,
        /// Store the extracted draws
        #[arg(long)]
        save: bool,
        /// Output format
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },
    /// List stored draws, newest first
    Results {
        /// Only one board
        #[arg(long)]
        board: Option<Board>,
        /// Maximum number of draws
        #[arg(long, default_value = "20")]
        limit: usize,
        /// Output format
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },
    /// Check ticket numbers against a stored draw
    Verify {
        /// Lottery name or identity, e.g. ada_kotipathi
        lottery: String,
        /// Draw number (latest stored draw when omitted)
        #[arg(long)]
        draw: Option<String>,
        /// Numbers on the ticket
        #[arg(required = true)]
        numbers: Vec<String>,
    },
    /// Show database status
    Status,
}

#[derive(Clone, Debug)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown format: {}. Use table, json, or csv.", s)),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Load or create config
    let config = if std::path::Path::new(&cli.config).exists() {
        match Config::load(&cli.config) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        Config::default()
    };

    let result = match cli.command {
        Commands::Init => commands::init(&cli.config),
        Commands::Sync { board } => commands::sync(&config, board),
        Commands::Draw { lottery, number } => commands::draw(&config, &lottery, number),
        Commands::Backfill {
            lottery,
            first,
            last,
            delay,
        } => commands::backfill(&config, &lottery, first, last, delay),
        Commands::Parse {
            file,
            board,
            save,
            format,
        } => commands::parse(&config, &file, board, save, format),
        Commands::Results {
            board,
            limit,
            format,
        } => commands::results(&config, board, limit, format),
        Commands::Verify {
            lottery,
            draw,
            numbers,
        } => commands::verify(&config, &lottery, draw, &numbers),
        Commands::Status => commands::status(&config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

mod commands {
    use super::*;
    use lotto::data::lotteries::lottery_identity;
    use lotto::data::scrapers::{scraper_for, sync as sync_boards, NlbScraper, Scraper};
    use lotto::data::{save_all, Cascade, Database, DrawStore, Fetcher, SaveOutcome};
    use lotto::verify::check_draw;
    use lotto::{DrawRecord, LottoError, SymbolType};
    use std::time::Duration;

    pub fn init(config_path: &str) -> Result<()> {
        let config = Config::default();
        config.save(config_path)?;
        println!("Created default config at {}", config_path);

        if let Some(parent) = std::path::Path::new(&config.data.database_path).parent() {
            std::fs::create_dir_all(parent)?;
            println!("Created {}/ directory", parent.display());
        }

        println!("\nNext steps:");
        println!("  1. Edit {} to customize settings", config_path);
        println!("  2. Run 'lotto sync' to fetch the latest results");
        println!("  3. Run 'lotto results' to list stored draws");

        Ok(())
    }

    pub fn sync(config: &Config, board: Option<Board>) -> Result<()> {
        let db = Database::open(&config.data.database_path)?;
        let fetcher = Fetcher::new(&config.fetch)?;

        let boards: Vec<Board> = match board {
            Some(b) => vec![b],
            None => Board::ALL.to_vec(),
        };
        let scrapers: Vec<Box<dyn Scraper + '_>> = boards
            .into_iter()
            .map(|b| scraper_for(b, config, &fetcher))
            .collect();

        let reports = sync_boards(&scrapers, &db);

        println!();
        println!("{:<6} {:>6} {:>6} {:>10} {:>7}", "Board", "Found", "Saved", "Duplicate", "Failed");
        println!("{}", "─".repeat(40));
        let mut total_saved = 0;
        for report in &reports {
            match &report.error {
                Some(e) => println!("{:<6} fetch failed: {}", report.board, e),
                None => println!(
                    "{:<6} {:>6} {:>6} {:>10} {:>7}",
                    report.board,
                    report.found,
                    report.summary.saved,
                    report.summary.duplicates,
                    report.summary.failed
                ),
            }
            total_saved += report.summary.saved;
        }
        println!("\nTotal saved: {}", total_saved);

        Ok(())
    }

    pub fn draw(config: &Config, lottery: &str, number: u32) -> Result<()> {
        let db = Database::open(&config.data.database_path)?;
        let fetcher = Fetcher::new(&config.fetch)?;
        let scraper = NlbScraper::new(&config.boards, &fetcher);

        let Some(record) = scraper.fetch_draw(lottery, number)? else {
            return Err(LottoError::DrawNotFound {
                lottery: lottery.to_string(),
                draw_number: Some(number.to_string()),
            });
        };

        print_table(&[(Board::Nlb, &record)]);
        if let Some(prize) = &record.prize_amount {
            println!("Prize: Rs. {}", prize);
        }

        match db.save(Board::Nlb, &record)? {
            SaveOutcome::Saved => println!("Saved."),
            SaveOutcome::Duplicate => println!("Already stored."),
        }

        Ok(())
    }

    pub fn backfill(config: &Config, lottery: &str, first: u32, last: u32, delay: u64) -> Result<()> {
        let db = Database::open(&config.data.database_path)?;
        let fetcher = Fetcher::new(&config.fetch)?;
        let scraper = NlbScraper::new(&config.boards, &fetcher);

        println!("Backfilling {} draws {} to {}...", lottery, first, last);
        let summary = scraper.backfill(lottery, first, last, &db, Duration::from_secs(delay))?;

        println!("  Saved:      {}", summary.saved);
        println!("  Duplicates: {}", summary.duplicates);
        println!("  Failed:     {}", summary.failed);

        Ok(())
    }

    pub fn parse(
        config: &Config,
        file: &str,
        board: Board,
        save: bool,
        format: OutputFormat,
    ) -> Result<()> {
        let body = std::fs::read(file)?;
        let records = Cascade::for_board(board).extract_bytes(&body);

        if records.is_empty() {
            println!("No draws found in {}", file);
            return Ok(());
        }

        let rows: Vec<(Board, &DrawRecord)> = records.iter().map(|r| (board, r)).collect();
        print_records(&rows, &format)?;

        if save {
            let db = Database::open(&config.data.database_path)?;
            let summary = save_all(&db, board, &records);
            println!(
                "Saved {} new, {} duplicates, {} failed",
                summary.saved, summary.duplicates, summary.failed
            );
        }

        Ok(())
    }

    pub fn results(
        config: &Config,
        board: Option<Board>,
        limit: usize,
        format: OutputFormat,
    ) -> Result<()> {
        let db = Database::open(&config.data.database_path)?;
        let draws = db.latest_draws(limit, board)?;

        if draws.is_empty() {
            println!("No draws stored. Run 'lotto sync' first.");
            return Ok(());
        }

        let rows: Vec<(Board, &DrawRecord)> = draws.iter().map(|d| (d.board, &d.record)).collect();
        print_records(&rows, &format)
    }

    pub fn verify(
        config: &Config,
        lottery: &str,
        draw: Option<String>,
        numbers: &[String],
    ) -> Result<()> {
        let db = Database::open(&config.data.database_path)?;
        let identity = lottery_identity(lottery);

        let stored = match &draw {
            Some(n) => db.find_draw(&identity, n)?,
            None => db.latest_draw(&identity)?,
        };
        let Some(stored) = stored else {
            return Err(LottoError::DrawNotFound {
                lottery: identity,
                draw_number: draw,
            });
        };

        let result = check_draw(&stored.record, numbers);

        println!(
            "{} draw #{} ({})",
            result.lottery_identity,
            result.draw_number.as_deref().unwrap_or("-"),
            stored.record.draw_date.format("%Y-%m-%d")
        );
        println!("  Winning: {}", format_symbols(&stored.record));
        println!("  Ticket:  {}", numbers.join(" "));
        if result.check.is_winner {
            println!("  Matched: {}", result.check.matched.join(" "));
            if let Some(prize) = &result.prize_info {
                println!("  Prize:   Rs. {}", prize);
            }
        } else {
            println!("  No matching numbers.");
        }

        Ok(())
    }

    pub fn status(config: &Config) -> Result<()> {
        let db = Database::open(&config.data.database_path)?;
        let stats = db.stats()?;

        println!("Database Status");
        println!("───────────────────────────────");
        println!("  Path:      {}", config.data.database_path);
        println!("  Draws:     {}", stats.draw_count);
        println!("  DLB:       {}", stats.dlb_count);
        println!("  NLB:       {}", stats.nlb_count);
        println!("  Lotteries: {}", stats.lottery_count);
        if let (Some(earliest), Some(latest)) = (stats.earliest_draw, stats.latest_draw) {
            println!("  Range:     {} to {}", earliest, latest);
        }

        Ok(())
    }

    fn print_records(rows: &[(Board, &DrawRecord)], format: &OutputFormat) -> Result<()> {
        match format {
            OutputFormat::Table => print_table(rows),
            OutputFormat::Json => {
                let records: Vec<&DrawRecord> = rows.iter().map(|(_, r)| *r).collect();
                println!("{}", serde_json::to_string_pretty(&records)?);
            }
            OutputFormat::Csv => {
                println!("board,lottery,draw_number,draw_date,symbols,prize_amount");
                for (board, record) in rows {
                    println!(
                        "{},{},{},{},{},{}",
                        board,
                        record.lottery_identity,
                        record.draw_number.as_deref().unwrap_or(""),
                        record.draw_date.format("%Y-%m-%d"),
                        record.values().join(" "),
                        record.prize_amount.as_deref().unwrap_or("")
                    );
                }
            }
        }
        Ok(())
    }

    fn print_table(rows: &[(Board, &DrawRecord)]) {
        println!(
            "{:<5} {:<24} {:>7} {:<11} Symbols",
            "Board", "Lottery", "Draw", "Date"
        );
        println!("{}", "─".repeat(72));
        for (board, record) in rows {
            // '?' marks a date that could not be read from the page
            let date = format!(
                "{}{}",
                record.draw_date.format("%Y-%m-%d"),
                if record.date_defaulted() { "?" } else { "" }
            );
            println!(
                "{:<5} {:<24} {:>7} {:<11} {}",
                board,
                record.lottery_identity,
                record.draw_number.as_deref().unwrap_or("-"),
                date,
                format_symbols(record)
            );
        }
    }

    /// Numbers plainly, other symbol types tagged: `Y[letter] 08 23`
    fn format_symbols(record: &DrawRecord) -> String {
        record
            .symbols
            .iter()
            .map(|s| match s.kind {
                SymbolType::Number => s.value.clone(),
                kind => format!("{}[{}]", s.value, kind),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}
