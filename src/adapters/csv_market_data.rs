//! CSV-directory market data adapter.
//!
//! Reads one file per ticker (`<dir>/<TICKER>.csv`) with a header of
//! `date,closing_price[,market_cap]`. Stands in for the networked market
//! data source; every failure mode surfaces as a per-ticker fetch error so
//! ingestion can isolate it.

use crate::domain::calendar;
use crate::domain::error::EqindexError;
use crate::domain::observation::DailyObservation;
use crate::ports::config_port::ConfigPort;
use crate::ports::market_data_port::MarketDataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

/// Fallback used when the source carries no market_cap column, matching the
/// upstream feed this replaces.
const MARKET_CAP_MULTIPLIER: f64 = 1_000_000.0;

pub struct CsvMarketDataAdapter {
    base_path: PathBuf,
}

impl CsvMarketDataAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, EqindexError> {
        let path =
            config
                .get_string("market_data", "path")
                .ok_or_else(|| EqindexError::ConfigMissing {
                    section: "market_data".into(),
                    key: "path".into(),
                })?;
        Ok(Self::new(PathBuf::from(path)))
    }

    fn csv_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", ticker))
    }

    fn fetch_err(ticker: &str, reason: String) -> EqindexError {
        EqindexError::Fetch {
            ticker: ticker.to_string(),
            reason,
        }
    }
}

impl MarketDataPort for CsvMarketDataAdapter {
    fn fetch_daily(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyObservation>, EqindexError> {
        let path = self.csv_path(ticker);
        let content = fs::read_to_string(&path).map_err(|e| {
            Self::fetch_err(ticker, format!("failed to read {}: {}", path.display(), e))
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| Self::fetch_err(ticker, format!("CSV header error: {}", e)))?
            .clone();

        let col = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let date_col = col("date")
            .ok_or_else(|| Self::fetch_err(ticker, "missing date column".into()))?;
        let close_col = col("closing_price")
            .ok_or_else(|| Self::fetch_err(ticker, "missing closing_price column".into()))?;
        let cap_col = col("market_cap");

        let mut observations = Vec::new();

        for result in rdr.records() {
            let record = result
                .map_err(|e| Self::fetch_err(ticker, format!("CSV parse error: {}", e)))?;

            let date_str = record
                .get(date_col)
                .ok_or_else(|| Self::fetch_err(ticker, "missing date field".into()))?;
            let date = NaiveDate::parse_from_str(date_str.trim(), calendar::DATE_FORMAT)
                .map_err(|e| Self::fetch_err(ticker, format!("invalid date format: {}", e)))?;

            if date < start || date > end {
                continue;
            }

            let closing_price: f64 = record
                .get(close_col)
                .ok_or_else(|| Self::fetch_err(ticker, "missing closing_price field".into()))?
                .trim()
                .parse()
                .map_err(|e| Self::fetch_err(ticker, format!("invalid closing_price: {}", e)))?;

            let market_cap: f64 = match cap_col.and_then(|i| record.get(i)) {
                Some(raw) if !raw.trim().is_empty() => raw
                    .trim()
                    .parse()
                    .map_err(|e| Self::fetch_err(ticker, format!("invalid market_cap: {}", e)))?,
                _ => closing_price * MARKET_CAP_MULTIPLIER,
            };

            observations.push(DailyObservation {
                date,
                ticker: ticker.to_string(),
                closing_price,
                market_cap,
            });
        }

        Ok(observations)
    }
}
