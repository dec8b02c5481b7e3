//! Ingestion orchestration.
//!
//! Resolves the fetch window (full backfill vs. incremental since the last
//! stored date), pulls per-ticker data from the market-data port with bounded
//! retry, and upserts the results. One ticker's failure never aborts the
//! batch.

use crate::domain::error::EqindexError;
use crate::domain::observation::DailyObservation;
use crate::ports::market_data_port::MarketDataPort;
use crate::ports::store_port::StorePort;
use chrono::{Duration, NaiveDate};

pub const DEFAULT_BACKFILL_DAYS: i64 = 730;
pub const DEFAULT_FETCH_MAX_RETRIES: u32 = 3;
pub const DEFAULT_FETCH_RETRY_BASE_MS: u64 = 250;

#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub historical_load: bool,
    pub backfill_days: i64,
    pub fetch_max_retries: u32,
    pub fetch_retry_base_ms: u64,
}

impl IngestConfig {
    /// Checks the merged config, after any CLI overrides are applied.
    pub fn validate(&self) -> Result<(), EqindexError> {
        if self.backfill_days < 1 {
            return Err(EqindexError::ConfigInvalid {
                section: "ingest".into(),
                key: "backfill_days".into(),
                reason: format!("must be at least 1, got {}", self.backfill_days),
            });
        }
        Ok(())
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            historical_load: false,
            backfill_days: DEFAULT_BACKFILL_DAYS,
            fetch_max_retries: DEFAULT_FETCH_MAX_RETRIES,
            fetch_retry_base_ms: DEFAULT_FETCH_RETRY_BASE_MS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl FetchWindow {
    /// An incremental run whose cursor is already at today produces an
    /// inverted window: nothing to fetch.
    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }
}

/// Backfill mode when `historical_load` is set or the store holds no dates;
/// incremental mode otherwise, starting the day after the latest stored date.
pub fn resolve_fetch_window(
    historical_load: bool,
    backfill_days: i64,
    latest_stored: Option<NaiveDate>,
    today: NaiveDate,
) -> FetchWindow {
    match latest_stored {
        Some(latest) if !historical_load => FetchWindow {
            start: latest + Duration::days(1),
            end: today,
        },
        _ => FetchWindow {
            start: today - Duration::days(backfill_days),
            end: today,
        },
    }
}

/// Per-ticker ingestion result.
#[derive(Debug, Clone)]
pub enum TickerOutcome {
    Ingested { ticker: String, rows: usize },
    Skipped { ticker: String },
    Failed { ticker: String, reason: String },
}

#[derive(Debug)]
pub struct IngestReport {
    pub window: FetchWindow,
    pub outcomes: Vec<TickerOutcome>,
    pub rows_upserted: usize,
}

impl IngestReport {
    pub fn ingested_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, TickerOutcome::Ingested { .. }))
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, TickerOutcome::Skipped { .. }))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, TickerOutcome::Failed { .. }))
            .count()
    }
}

/// Fetch one ticker with bounded retry and exponential backoff: delay
/// doubles per attempt starting from `base_ms`.
fn fetch_with_retry(
    market: &dyn MarketDataPort,
    ticker: &str,
    window: &FetchWindow,
    max_retries: u32,
    base_ms: u64,
) -> Result<Vec<DailyObservation>, EqindexError> {
    let mut attempt = 0;
    loop {
        match market.fetch_daily(ticker, window.start, window.end) {
            Ok(rows) => return Ok(rows),
            Err(e) if attempt < max_retries => {
                let delay_ms = base_ms.saturating_mul(1u64 << attempt.min(16));
                eprintln!(
                    "warning: fetch attempt {} for {} failed ({}), retrying in {}ms",
                    attempt + 1,
                    ticker,
                    e,
                    delay_ms
                );
                std::thread::sleep(std::time::Duration::from_millis(delay_ms));
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Run one ingestion pass over `tickers` for the resolved window.
///
/// Fetch failures and empty results are recorded per ticker and skipped;
/// store errors propagate, they are local and fatal.
pub fn run_ingestion(
    store: &dyn StorePort,
    market: &dyn MarketDataPort,
    tickers: &[String],
    config: &IngestConfig,
    today: NaiveDate,
) -> Result<IngestReport, EqindexError> {
    let latest = store.latest_stored_date()?;
    let window = resolve_fetch_window(config.historical_load, config.backfill_days, latest, today);

    if window.is_empty() {
        eprintln!("Store is current through {}; nothing to fetch", today);
        return Ok(IngestReport {
            window,
            outcomes: Vec::new(),
            rows_upserted: 0,
        });
    }

    match latest {
        Some(_) if !config.historical_load => eprintln!(
            "Incremental load: fetching {} to {}",
            window.start, window.end
        ),
        _ => eprintln!(
            "Historical load: fetching {} to {}",
            window.start, window.end
        ),
    }

    let mut outcomes = Vec::with_capacity(tickers.len());
    let mut rows_upserted = 0usize;

    for ticker in tickers {
        let rows = match fetch_with_retry(
            market,
            ticker,
            &window,
            config.fetch_max_retries,
            config.fetch_retry_base_ms,
        ) {
            Ok(rows) => rows,
            Err(e) => {
                eprintln!("warning: skipping {} ({})", ticker, e);
                outcomes.push(TickerOutcome::Failed {
                    ticker: ticker.clone(),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        if rows.is_empty() {
            eprintln!("warning: no data returned for {}", ticker);
            outcomes.push(TickerOutcome::Skipped {
                ticker: ticker.clone(),
            });
            continue;
        }

        store.upsert_stock(ticker, None)?;
        store.upsert_observations(&rows)?;

        eprintln!("  {}: {} rows [OK]", ticker, rows.len());
        rows_upserted += rows.len();
        outcomes.push(TickerOutcome::Ingested {
            ticker: ticker.clone(),
            rows: rows.len(),
        });
    }

    Ok(IngestReport {
        window,
        outcomes,
        rows_upserted,
    })
}
