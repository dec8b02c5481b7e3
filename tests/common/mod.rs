#![allow(dead_code)]

use chrono::NaiveDate;
use eqindex::domain::error::EqindexError;
pub use eqindex::domain::observation::DailyObservation;
use eqindex::ports::market_data_port::MarketDataPort;
use std::collections::HashMap;

pub struct MockMarketData {
    pub data: HashMap<String, Vec<DailyObservation>>,
    pub errors: HashMap<String, String>,
}

impl MockMarketData {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_rows(mut self, ticker: &str, rows: Vec<DailyObservation>) -> Self {
        self.data.insert(ticker.to_string(), rows);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl MarketDataPort for MockMarketData {
    fn fetch_daily(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyObservation>, EqindexError> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(EqindexError::Fetch {
                ticker: ticker.to_string(),
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(ticker)
            .map(|rows| {
                rows.iter()
                    .filter(|o| o.date >= start && o.date <= end)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_obs(ticker: &str, date_str: &str, close: f64, cap: f64) -> DailyObservation {
    DailyObservation {
        date: NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap(),
        ticker: ticker.to_string(),
        closing_price: close,
        market_cap: cap,
    }
}
