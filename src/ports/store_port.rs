//! Persistent store port trait.

use crate::domain::error::EqindexError;
use crate::domain::observation::DailyObservation;
use chrono::NaiveDate;

/// Row counts and date coverage of the store, for data validation.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreSummary {
    pub total_observations: usize,
    pub distinct_tickers: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

/// Access to the (date, ticker) → (closing_price, market_cap) store.
///
/// The ticker foreign key from observations to stocks is advisory only:
/// `upsert_observation` does not require a matching stock row to exist.
/// Query methods take date strings and must validate the `YYYY-MM-DD`
/// format explicitly, since the underlying store does not enforce it.
pub trait StorePort {
    /// Insert or replace a stock record. Idempotent.
    fn upsert_stock(&self, ticker: &str, name: Option<&str>) -> Result<(), EqindexError>;

    /// Insert or replace one observation at key (date, ticker).
    /// Last write wins.
    fn upsert_observation(&self, obs: &DailyObservation) -> Result<(), EqindexError>;

    /// Insert or replace a batch of observations in one transaction.
    fn upsert_observations(&self, obs: &[DailyObservation]) -> Result<(), EqindexError>;

    /// Observations for `date`, ordered by market cap descending with
    /// ticker ascending as the tie-break, truncated to `limit`.
    fn query_top_by_market_cap(
        &self,
        date: &str,
        limit: usize,
    ) -> Result<Vec<DailyObservation>, EqindexError>;

    /// Most recent stored observation date, or `None` when the store is
    /// empty. The incremental-ingestion cursor.
    fn latest_stored_date(&self) -> Result<Option<NaiveDate>, EqindexError>;

    /// All observations in [start, end], ordered by date then by market cap
    /// descending. Feeds composition reporting.
    fn query_composition(
        &self,
        start: &str,
        end: &str,
    ) -> Result<Vec<DailyObservation>, EqindexError>;

    fn summary(&self) -> Result<StoreSummary, EqindexError>;
}
