//! CLI definition and dispatch.

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_export_adapter::CsvExportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::typst_export_adapter::TypstExportAdapter;
use crate::domain::calendar::{format_date, parse_date};
use crate::domain::config_validation::{validate_index_config, validate_ingest_config};
use crate::domain::error::EqindexError;
use crate::domain::index::{compute_index_range, compute_index_value, DEFAULT_TOP_N};
use crate::domain::ingest::{self, IngestConfig, IngestReport, TickerOutcome};
use crate::domain::universe::{load_ticker_file, parse_tickers};
use crate::ports::config_port::ConfigPort;
use crate::ports::export_port::ExportPort;

#[derive(Parser, Debug)]
#[command(name = "eqindex", about = "Equal-weighted custom stock index engine")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Pull market data into the store and report the refreshed index
    Ingest {
        #[arg(short, long)]
        config: PathBuf,
        /// Force a full backfill even when the store already has data
        #[arg(long)]
        historical_load: bool,
        #[arg(long)]
        backfill_days: Option<i64>,
        /// Export the trailing index history after ingestion
        #[arg(long)]
        export_files: bool,
    },
    /// Compute the index value for a single date
    Compute {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        date: String,
        #[arg(long)]
        top_n: Option<usize>,
    },
    /// Compute the index series over a date range
    Range {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        #[arg(long)]
        top_n: Option<usize>,
    },
    /// List the stored constituents over a date range
    Composition {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
    },
    /// Summarize store contents
    Info {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Export the index series to a file
    Export {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        #[arg(short, long)]
        output: PathBuf,
        /// csv or typst
        #[arg(long, default_value = "csv")]
        format: String,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Ingest {
            config,
            historical_load,
            backfill_days,
            export_files,
        } => run_ingest(&config, historical_load, backfill_days, export_files),
        Command::Compute {
            config,
            date,
            top_n,
        } => run_compute(&config, &date, top_n),
        Command::Range {
            config,
            start,
            end,
            top_n,
        } => run_range(&config, &start, &end, top_n),
        Command::Composition { config, start, end } => run_composition(&config, &start, &end),
        Command::Info { config } => run_info(&config),
        Command::Export {
            config,
            start,
            end,
            output,
            format,
        } => run_export(&config, &start, &end, &output, &format),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = EqindexError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

/// Merge CLI overrides over the `[ingest]` config section.
pub fn build_ingest_config(
    adapter: &dyn ConfigPort,
    historical_load_override: bool,
    backfill_days_override: Option<i64>,
) -> IngestConfig {
    IngestConfig {
        historical_load: historical_load_override
            || adapter.get_bool("ingest", "historical_load", false),
        backfill_days: backfill_days_override
            .unwrap_or_else(|| adapter.get_int("ingest", "backfill_days", ingest::DEFAULT_BACKFILL_DAYS)),
        fetch_max_retries: adapter.get_int(
            "ingest",
            "fetch_max_retries",
            ingest::DEFAULT_FETCH_MAX_RETRIES as i64,
        ) as u32,
        fetch_retry_base_ms: adapter.get_int(
            "ingest",
            "fetch_retry_base_ms",
            ingest::DEFAULT_FETCH_RETRY_BASE_MS as i64,
        ) as u64,
    }
}

/// Resolve the ticker universe: an inline `tickers` list wins over
/// `ticker_file`.
pub fn resolve_tickers(adapter: &dyn ConfigPort) -> Result<Vec<String>, EqindexError> {
    if let Some(list) = adapter
        .get_string("ingest", "tickers")
        .filter(|v| !v.trim().is_empty())
    {
        return parse_tickers(&list).map_err(|e| EqindexError::ConfigInvalid {
            section: "ingest".into(),
            key: "tickers".into(),
            reason: e.to_string(),
        });
    }

    match adapter.get_string("ingest", "ticker_file") {
        Some(path) => load_ticker_file(path),
        None => Err(EqindexError::ConfigMissing {
            section: "ingest".into(),
            key: "tickers".into(),
        }),
    }
}

pub fn resolve_top_n(adapter: &dyn ConfigPort, cli_override: Option<usize>) -> usize {
    cli_override.unwrap_or_else(|| adapter.get_int("index", "top_n", DEFAULT_TOP_N as i64) as usize)
}

fn print_ingest_summary(report: &IngestReport) {
    eprintln!(
        "\nIngestion complete: {} ingested, {} skipped, {} failed, {} rows upserted",
        report.ingested_count(),
        report.skipped_count(),
        report.failed_count(),
        report.rows_upserted,
    );
    for outcome in &report.outcomes {
        if let TickerOutcome::Failed { ticker, reason } = outcome {
            eprintln!("  failed: {} ({})", ticker, reason);
        }
    }
}

fn run_ingest(
    config_path: &PathBuf,
    historical_load: bool,
    backfill_days: Option<i64>,
    export_files: bool,
) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_ingest_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let tickers = match resolve_tickers(&adapter) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let ingest_config = build_ingest_config(&adapter, historical_load, backfill_days);
    // CLI overrides bypass the file-level checks; validate the merged config.
    if let Err(e) = ingest_config.validate() {
        eprintln!("error: {e}");
        return (&e).into();
    }
    let top_n = resolve_top_n(&adapter, None);
    let export_files = export_files || adapter.get_bool("ingest", "export_files", false);

    #[cfg(feature = "sqlite")]
    {
        use crate::adapters::csv_market_data::CsvMarketDataAdapter;
        use crate::adapters::sqlite_adapter::SqliteAdapter;

        let store = match SqliteAdapter::from_config(&adapter) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        };
        if let Err(e) = store.initialize_schema() {
            eprintln!("error: {e}");
            return (&e).into();
        }

        let market = match CsvMarketDataAdapter::from_config(&adapter) {
            Ok(m) => m,
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        };

        let today = Local::now().date_naive();
        eprintln!("Ingesting {} tickers", tickers.len());

        let report = match ingest::run_ingestion(&store, &market, &tickers, &ingest_config, today) {
            Ok(r) => r,
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        };
        print_ingest_summary(&report);

        // Refresh the index for verification: today's value plus the
        // trailing 30 calendar days.
        let today_str = format_date(today);
        match compute_index_value(&store, &today_str, top_n) {
            Ok(Some(value)) => eprintln!("Index value on {}: {:.4}", today_str, value),
            Ok(None) => eprintln!("No index value computable for {}", today_str),
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        }

        let history_start = today - chrono::Duration::days(30);
        let history = match compute_index_range(&store, history_start, today, top_n) {
            Ok(h) => h,
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        };
        eprintln!(
            "Computed {} index points from {} to {}",
            history.len(),
            format_date(history_start),
            today_str,
        );

        if export_files {
            let dir = adapter
                .get_string("export", "directory")
                .unwrap_or_else(|| ".".to_string());
            let dir = PathBuf::from(dir);
            let exports: [(&str, &dyn ExportPort); 2] = [
                ("index_history.csv", &CsvExportAdapter),
                ("index_history.typ", &TypstExportAdapter),
            ];
            // Export is best-effort: failures are logged, never fatal.
            for (filename, exporter) in exports {
                let path = dir.join(filename);
                match exporter.write(&history, &path) {
                    Ok(()) => eprintln!("Exported {}", path.display()),
                    Err(e) => eprintln!("warning: {e}"),
                }
            }
        }

        ExitCode::SUCCESS
    }

    #[cfg(not(feature = "sqlite"))]
    {
        let _ = (tickers, ingest_config, top_n, export_files);
        eprintln!("error: sqlite feature is required for ingest");
        ExitCode::from(1)
    }
}

fn run_compute(config_path: &PathBuf, date: &str, top_n: Option<usize>) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_index_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    let top_n = resolve_top_n(&adapter, top_n);

    #[cfg(feature = "sqlite")]
    {
        use crate::adapters::sqlite_adapter::SqliteAdapter;

        let store = match SqliteAdapter::from_config(&adapter) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        };

        match compute_index_value(&store, date, top_n) {
            Ok(Some(value)) => {
                println!("{date} {value:.4}");
                ExitCode::SUCCESS
            }
            Ok(None) => {
                eprintln!("No data available for {date}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("error: {e}");
                (&e).into()
            }
        }
    }

    #[cfg(not(feature = "sqlite"))]
    {
        let _ = (date, top_n);
        eprintln!("error: sqlite feature is required for compute");
        ExitCode::from(1)
    }
}

fn run_range(config_path: &PathBuf, start: &str, end: &str, top_n: Option<usize>) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let (start_date, end_date) = match parse_range_bounds(start, end) {
        Ok(bounds) => bounds,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    if let Err(e) = validate_index_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    let top_n = resolve_top_n(&adapter, top_n);

    #[cfg(feature = "sqlite")]
    {
        use crate::adapters::sqlite_adapter::SqliteAdapter;

        let store = match SqliteAdapter::from_config(&adapter) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        };

        let points = match compute_index_range(&store, start_date, end_date, top_n) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        };

        for point in &points {
            match point.index_value {
                Some(value) => println!("{} {:.4}", format_date(point.date), value),
                None => println!("{} -", format_date(point.date)),
            }
        }
        eprintln!("{} trading days", points.len());
        ExitCode::SUCCESS
    }

    #[cfg(not(feature = "sqlite"))]
    {
        let _ = (start_date, end_date, top_n);
        eprintln!("error: sqlite feature is required for range");
        ExitCode::from(1)
    }
}

/// The range calculator itself performs no ordering check; enforce
/// start ≤ end here at the boundary.
pub fn parse_range_bounds(start: &str, end: &str) -> Result<(NaiveDate, NaiveDate), EqindexError> {
    let start_date = parse_date(start)?;
    let end_date = parse_date(end)?;
    if start_date > end_date {
        return Err(EqindexError::InvalidDate {
            input: format!("{start}..{end} (start is after end)"),
        });
    }
    Ok((start_date, end_date))
}

fn run_composition(config_path: &PathBuf, start: &str, end: &str) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = parse_range_bounds(start, end) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    #[cfg(feature = "sqlite")]
    {
        use crate::adapters::sqlite_adapter::SqliteAdapter;
        use crate::ports::store_port::StorePort;

        let store = match SqliteAdapter::from_config(&adapter) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        };

        let rows = match store.query_composition(start, end) {
            Ok(r) => r,
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        };

        for row in &rows {
            println!(
                "{} {} {:.4} {:.2}",
                format_date(row.date),
                row.ticker,
                row.closing_price,
                row.market_cap,
            );
        }
        eprintln!("{} observations", rows.len());
        ExitCode::SUCCESS
    }

    #[cfg(not(feature = "sqlite"))]
    {
        let _ = adapter;
        eprintln!("error: sqlite feature is required for composition");
        ExitCode::from(1)
    }
}

fn run_info(config_path: &PathBuf) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    #[cfg(feature = "sqlite")]
    {
        use crate::adapters::sqlite_adapter::SqliteAdapter;
        use crate::ports::store_port::StorePort;

        let store = match SqliteAdapter::from_config(&adapter) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        };
        if let Err(e) = store.initialize_schema() {
            eprintln!("error: {e}");
            return (&e).into();
        }

        let summary = match store.summary() {
            Ok(s) => s,
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        };

        println!("Total observations: {}", summary.total_observations);
        println!("Distinct tickers:   {}", summary.distinct_tickers);
        match (summary.first_date, summary.last_date) {
            (Some(first), Some(last)) => {
                println!("Date range:         {} to {}", format_date(first), format_date(last));
            }
            _ => println!("Date range:         (empty)"),
        }
        ExitCode::SUCCESS
    }

    #[cfg(not(feature = "sqlite"))]
    {
        let _ = adapter;
        eprintln!("error: sqlite feature is required for info");
        ExitCode::from(1)
    }
}

fn run_export(
    config_path: &PathBuf,
    start: &str,
    end: &str,
    output: &PathBuf,
    format: &str,
) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let (start_date, end_date) = match parse_range_bounds(start, end) {
        Ok(bounds) => bounds,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let exporter: Box<dyn ExportPort> = match format {
        "csv" => Box::new(CsvExportAdapter),
        "typst" => Box::new(TypstExportAdapter),
        other => {
            eprintln!("error: unknown export format {other:?} (expected csv or typst)");
            return ExitCode::from(2);
        }
    };
    if let Err(e) = validate_index_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    let top_n = resolve_top_n(&adapter, None);

    #[cfg(feature = "sqlite")]
    {
        use crate::adapters::sqlite_adapter::SqliteAdapter;

        let store = match SqliteAdapter::from_config(&adapter) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        };

        let points = match compute_index_range(&store, start_date, end_date, top_n) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        };

        match exporter.write(&points, output) {
            Ok(()) => {
                eprintln!("Exported {} points to {}", points.len(), output.display());
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("error: {e}");
                (&e).into()
            }
        }
    }

    #[cfg(not(feature = "sqlite"))]
    {
        let _ = (start_date, end_date, exporter, top_n, output);
        eprintln!("error: sqlite feature is required for export");
        ExitCode::from(1)
    }
}
