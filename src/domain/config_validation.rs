//! Configuration validation.
//!
//! Validates config fields before an ingestion run starts.

use crate::domain::error::EqindexError;
use crate::ports::config_port::ConfigPort;

pub fn validate_index_config(config: &dyn ConfigPort) -> Result<(), EqindexError> {
    let top_n = config.get_int("index", "top_n", 100);
    if top_n < 1 {
        return Err(EqindexError::ConfigInvalid {
            section: "index".into(),
            key: "top_n".into(),
            reason: format!("must be at least 1, got {top_n}"),
        });
    }
    Ok(())
}

pub fn validate_ingest_config(config: &dyn ConfigPort) -> Result<(), EqindexError> {
    validate_index_config(config)?;

    let backfill_days = config.get_int("ingest", "backfill_days", 730);
    if backfill_days < 1 {
        return Err(EqindexError::ConfigInvalid {
            section: "ingest".into(),
            key: "backfill_days".into(),
            reason: format!("must be at least 1, got {backfill_days}"),
        });
    }

    let max_retries = config.get_int("ingest", "fetch_max_retries", 3);
    if max_retries < 0 {
        return Err(EqindexError::ConfigInvalid {
            section: "ingest".into(),
            key: "fetch_max_retries".into(),
            reason: format!("must not be negative, got {max_retries}"),
        });
    }

    let base_ms = config.get_int("ingest", "fetch_retry_base_ms", 250);
    if base_ms < 0 {
        return Err(EqindexError::ConfigInvalid {
            section: "ingest".into(),
            key: "fetch_retry_base_ms".into(),
            reason: format!("must not be negative, got {base_ms}"),
        });
    }

    let has_tickers = config
        .get_string("ingest", "tickers")
        .is_some_and(|v| !v.trim().is_empty());
    let has_ticker_file = config
        .get_string("ingest", "ticker_file")
        .is_some_and(|v| !v.trim().is_empty());
    if !has_tickers && !has_ticker_file {
        return Err(EqindexError::ConfigMissing {
            section: "ingest".into(),
            key: "tickers".into(),
        });
    }

    if config.get_string("market_data", "path").is_none() {
        return Err(EqindexError::ConfigMissing {
            section: "market_data".into(),
            key: "path".into(),
        });
    }

    Ok(())
}
