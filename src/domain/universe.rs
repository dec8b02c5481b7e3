//! Ticker universe handling.
//!
//! Parses ticker lists from configuration and loads them from CSV files.

use crate::domain::error::EqindexError;
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in ticker list")]
    EmptyToken,

    #[error("duplicate ticker: {0}")]
    DuplicateTicker(String),
}

/// Parse a comma-separated ticker list: trimmed, uppercased, duplicates and
/// empty tokens rejected.
pub fn parse_tickers(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut tickers = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let ticker = trimmed.to_uppercase();
        if seen.contains(&ticker) {
            return Err(UniverseError::DuplicateTicker(ticker));
        }
        seen.insert(ticker.clone());
        tickers.push(ticker);
    }

    Ok(tickers)
}

/// Load tickers from a CSV file with a `ticker` column.
pub fn load_ticker_file<P: AsRef<Path>>(path: P) -> Result<Vec<String>, EqindexError> {
    let path = path.as_ref();
    let mut rdr = csv::Reader::from_path(path).map_err(|e| EqindexError::ConfigInvalid {
        section: "ingest".into(),
        key: "ticker_file".into(),
        reason: format!("failed to read {}: {}", path.display(), e),
    })?;

    let headers = rdr
        .headers()
        .map_err(|e| EqindexError::ConfigInvalid {
            section: "ingest".into(),
            key: "ticker_file".into(),
            reason: format!("CSV header error: {}", e),
        })?
        .clone();

    let ticker_col = headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case("ticker"))
        .ok_or_else(|| EqindexError::ConfigInvalid {
            section: "ingest".into(),
            key: "ticker_file".into(),
            reason: "missing ticker column".into(),
        })?;

    let mut tickers = Vec::new();
    let mut seen = HashSet::new();
    for result in rdr.records() {
        let record = result.map_err(|e| EqindexError::ConfigInvalid {
            section: "ingest".into(),
            key: "ticker_file".into(),
            reason: format!("CSV parse error: {}", e),
        })?;
        if let Some(raw) = record.get(ticker_col) {
            let ticker = raw.trim().to_uppercase();
            if !ticker.is_empty() && seen.insert(ticker.clone()) {
                tickers.push(ticker);
            }
        }
    }

    Ok(tickers)
}
