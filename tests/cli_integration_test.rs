//! CLI integration tests for config handling and command orchestration.
//!
//! Tests cover:
//! - Ingest config construction with CLI overrides
//! - Ticker universe resolution (inline list, ticker file, missing source)
//! - Range bound and top_n validation at the CLI boundary
//! - Full `ingest` command against a real on-disk store and CSV quotes

mod common;

use eqindex::adapters::file_config_adapter::FileConfigAdapter;
use eqindex::cli;
use eqindex::domain::error::EqindexError;
use std::io::Write;
use std::path::PathBuf;

fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const VALID_INI: &str = r#"
[sqlite]
path = data.db
pool_size = 2

[index]
top_n = 100

[ingest]
historical_load = no
backfill_days = 365
tickers = AAPL,MSFT
fetch_max_retries = 2
fetch_retry_base_ms = 10

[market_data]
path = ./quotes
"#;

mod ingest_config {
    use super::*;

    #[test]
    fn reads_config_values() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let config = cli::build_ingest_config(&adapter, false, None);

        assert!(!config.historical_load);
        assert_eq!(config.backfill_days, 365);
        assert_eq!(config.fetch_max_retries, 2);
        assert_eq!(config.fetch_retry_base_ms, 10);
    }

    #[test]
    fn cli_flags_override_config() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let config = cli::build_ingest_config(&adapter, true, Some(30));

        assert!(config.historical_load);
        assert_eq!(config.backfill_days, 30);
    }

    #[test]
    fn defaults_apply_when_section_sparse() {
        let adapter = FileConfigAdapter::from_string("[ingest]\ntickers = AAPL\n").unwrap();
        let config = cli::build_ingest_config(&adapter, false, None);

        assert!(!config.historical_load);
        assert_eq!(config.backfill_days, 730);
        assert_eq!(config.fetch_max_retries, 3);
        assert_eq!(config.fetch_retry_base_ms, 250);
    }

    #[test]
    fn negative_backfill_override_rejected_after_merge() {
        // The file value is valid; the override must still be checked.
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let config = cli::build_ingest_config(&adapter, false, Some(-5));
        assert!(matches!(
            config.validate(),
            Err(EqindexError::ConfigInvalid { ref key, .. }) if key == "backfill_days"
        ));
    }
}

mod ticker_resolution {
    use super::*;

    #[test]
    fn inline_list_parsed() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let tickers = cli::resolve_tickers(&adapter).unwrap();
        assert_eq!(tickers, vec!["AAPL", "MSFT"]);
    }

    #[test]
    fn inline_list_wins_over_file() {
        let ini = "[ingest]\ntickers = GOOG\nticker_file = /nonexistent.csv\n";
        let adapter = FileConfigAdapter::from_string(ini).unwrap();
        let tickers = cli::resolve_tickers(&adapter).unwrap();
        assert_eq!(tickers, vec!["GOOG"]);
    }

    #[test]
    fn ticker_file_used_when_no_inline_list() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "ticker,name").unwrap();
        writeln!(file, "NVDA,NVIDIA").unwrap();
        file.flush().unwrap();

        let ini = format!("[ingest]\nticker_file = {}\n", file.path().display());
        let adapter = FileConfigAdapter::from_string(&ini).unwrap();
        let tickers = cli::resolve_tickers(&adapter).unwrap();
        assert_eq!(tickers, vec!["NVDA"]);
    }

    #[test]
    fn missing_source_is_config_missing() {
        let adapter = FileConfigAdapter::from_string("[ingest]\n").unwrap();
        let result = cli::resolve_tickers(&adapter);
        assert!(matches!(result, Err(EqindexError::ConfigMissing { .. })));
    }

    #[test]
    fn bad_inline_list_is_config_invalid() {
        let adapter = FileConfigAdapter::from_string("[ingest]\ntickers = AAPL,,MSFT\n").unwrap();
        let result = cli::resolve_tickers(&adapter);
        assert!(matches!(
            result,
            Err(EqindexError::ConfigInvalid { ref key, .. }) if key == "tickers"
        ));
    }
}

mod top_n_resolution {
    use super::*;

    #[test]
    fn cli_override_wins() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        assert_eq!(cli::resolve_top_n(&adapter, Some(10)), 10);
    }

    #[test]
    fn config_value_used_without_override() {
        let adapter = FileConfigAdapter::from_string("[index]\ntop_n = 25\n").unwrap();
        assert_eq!(cli::resolve_top_n(&adapter, None), 25);
    }

    #[test]
    fn default_is_one_hundred() {
        let adapter = FileConfigAdapter::from_string("[index]\n").unwrap();
        assert_eq!(cli::resolve_top_n(&adapter, None), 100);
    }
}

mod range_bounds {
    use super::*;

    #[test]
    fn ordered_bounds_accepted() {
        assert!(cli::parse_range_bounds("2024-01-01", "2024-02-01").is_ok());
        assert!(cli::parse_range_bounds("2024-01-01", "2024-01-01").is_ok());
    }

    #[test]
    fn inverted_bounds_rejected() {
        let result = cli::parse_range_bounds("2024-02-01", "2024-01-01");
        assert!(matches!(result, Err(EqindexError::InvalidDate { .. })));
    }
}

mod config_loading {
    use super::*;

    #[test]
    fn load_config_from_disk() {
        let file = write_temp_ini(VALID_INI);
        let path = PathBuf::from(file.path());
        let adapter = cli::load_config(&path).unwrap();
        use eqindex::ports::config_port::ConfigPort;
        assert_eq!(adapter.get_int("index", "top_n", 0), 100);
    }

    #[test]
    fn load_config_missing_file_fails() {
        let path = PathBuf::from("/nonexistent/eqindex.ini");
        assert!(cli::load_config(&path).is_err());
    }
}

mod export_command {
    use super::*;
    use clap::Parser;
    use eqindex::cli::Cli;

    /// A config-level top_n below 1 must abort before anything is
    /// written; a negative limit would otherwise disable the cap
    /// entirely once it reaches the store query.
    #[test]
    fn negative_top_n_in_config_aborts_export() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("data.db");
        let output = dir.path().join("series.csv");
        let ini = format!(
            "[sqlite]\npath = {}\n\n[index]\ntop_n = -5\n",
            db_path.display(),
        );
        let config_file = write_temp_ini(&ini);

        let cli = Cli::parse_from([
            "eqindex",
            "export",
            "--config",
            config_file.path().to_str().unwrap(),
            "--start",
            "2024-01-01",
            "--end",
            "2024-01-05",
            "--output",
            output.to_str().unwrap(),
        ]);
        let _ = cli::run(cli);

        assert!(!output.exists());
    }
}

#[cfg(feature = "sqlite")]
mod ingest_command {
    use super::*;
    use chrono::{Duration, Local};
    use clap::Parser;
    use eqindex::adapters::sqlite_adapter::SqliteAdapter;
    use eqindex::cli::Cli;
    use eqindex::ports::store_port::StorePort;
    use std::fs;

    /// End-to-end `ingest` run: temp config, temp sqlite file, CSV quotes
    /// dated relative to today so the backfill window covers them.
    #[test]
    fn ingest_command_populates_store_and_exports() {
        let dir = tempfile::tempdir().unwrap();
        let quotes_dir = dir.path().join("quotes");
        fs::create_dir(&quotes_dir).unwrap();
        let db_path = dir.path().join("data.db");
        let export_dir = dir.path().join("out");
        fs::create_dir(&export_dir).unwrap();

        let today = Local::now().date_naive();
        let d1 = (today - Duration::days(3)).format("%Y-%m-%d").to_string();
        let d2 = (today - Duration::days(2)).format("%Y-%m-%d").to_string();

        fs::write(
            quotes_dir.join("AAPL.csv"),
            format!("date,closing_price,market_cap\n{d1},180.0,2800000\n{d2},182.0,2810000\n"),
        )
        .unwrap();
        fs::write(
            quotes_dir.join("MSFT.csv"),
            format!("date,closing_price\n{d1},370.0\n"),
        )
        .unwrap();

        let ini = format!(
            "[sqlite]\npath = {}\n\n[ingest]\ntickers = AAPL,MSFT,GHOST\n\
             backfill_days = 30\nfetch_retry_base_ms = 1\n\n\
             [market_data]\npath = {}\n\n[export]\ndirectory = {}\n",
            db_path.display(),
            quotes_dir.display(),
            export_dir.display(),
        );
        let config_file = write_temp_ini(&ini);

        let cli = Cli::parse_from([
            "eqindex",
            "ingest",
            "--config",
            config_file.path().to_str().unwrap(),
            "--export-files",
        ]);
        let _ = cli::run(cli);

        // GHOST has no quotes file; it must not block AAPL/MSFT
        let adapter = FileConfigAdapter::from_file(config_file.path()).unwrap();
        let store = SqliteAdapter::from_config(&adapter).unwrap();
        let summary = store.summary().unwrap();
        assert_eq!(summary.total_observations, 3);
        assert_eq!(summary.distinct_tickers, 2);

        let top = store.query_top_by_market_cap(&d1, 10).unwrap();
        assert_eq!(top.len(), 2);
        // MSFT's derived cap (370 * 1e6) beats AAPL's explicit 2.8e6
        assert_eq!(top[0].ticker, "MSFT");

        assert!(export_dir.join("index_history.csv").exists());
        assert!(export_dir.join("index_history.typ").exists());
    }

    #[test]
    fn negative_backfill_override_aborts_before_store_creation() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("data.db");
        let ini = format!(
            "[sqlite]\npath = {}\n\n[ingest]\ntickers = AAPL\n\n[market_data]\npath = {}\n",
            db_path.display(),
            dir.path().display(),
        );
        let config_file = write_temp_ini(&ini);

        let cli = Cli::parse_from([
            "eqindex",
            "ingest",
            "--config",
            config_file.path().to_str().unwrap(),
            "--backfill-days=-5",
        ]);
        let _ = cli::run(cli);

        assert!(!db_path.exists());
    }
}

#[cfg(feature = "sqlite")]
mod composition_command {
    use super::*;
    use clap::Parser;
    use super::common::make_obs;
    use eqindex::adapters::sqlite_adapter::SqliteAdapter;
    use eqindex::cli::Cli;
    use eqindex::ports::store_port::StorePort;

    #[test]
    fn composition_command_reads_seeded_store() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("data.db");
        let ini = format!("[sqlite]\npath = {}\n", db_path.display());
        let config_file = write_temp_ini(&ini);

        let adapter = FileConfigAdapter::from_file(config_file.path()).unwrap();
        let store = SqliteAdapter::from_config(&adapter).unwrap();
        store.initialize_schema().unwrap();
        store
            .upsert_observations(&[
                make_obs("AAPL", "2024-01-02", 180.0, 2_800_000.0),
                make_obs("MSFT", "2024-01-02", 370.0, 2_750_000.0),
                make_obs("AAPL", "2024-02-01", 185.0, 2_850_000.0),
            ])
            .unwrap();

        let cli = Cli::parse_from([
            "eqindex",
            "composition",
            "--config",
            config_file.path().to_str().unwrap(),
            "--start",
            "2024-01-01",
            "--end",
            "2024-01-31",
        ]);
        let _ = cli::run(cli);

        // The command prints exactly the rows this query returns.
        let rows = store.query_composition("2024-01-01", "2024-01-31").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].ticker, "AAPL");
    }
}
