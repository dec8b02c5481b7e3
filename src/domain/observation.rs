//! Stock and daily observation records.

use chrono::NaiveDate;

/// A listed stock. Upserted once per distinct ticker seen during ingestion,
/// never deleted by normal operation.
#[derive(Debug, Clone, PartialEq)]
pub struct StockRecord {
    pub ticker: String,
    pub name: Option<String>,
}

/// One ticker's close and market cap for one trading day.
/// (date, ticker) is the unique key; a later upsert fully replaces
/// the prior value.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyObservation {
    pub date: NaiveDate,
    pub ticker: String,
    pub closing_price: f64,
    pub market_cap: f64,
}

/// A derived point of the index time series. Never stored — recomputed on
/// demand. `index_value` is `None` when the date has no observations.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexPoint {
    pub date: NaiveDate,
    pub index_value: Option<f64>,
}
