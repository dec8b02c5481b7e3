//! External market-data source port trait.

use crate::domain::error::EqindexError;
use crate::domain::observation::DailyObservation;
use chrono::NaiveDate;

/// A per-ticker daily price/cap source. Treated as unreliable: any call may
/// error or return no rows, and the caller isolates that per ticker.
pub trait MarketDataPort {
    fn fetch_daily(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyObservation>, EqindexError>;
}
