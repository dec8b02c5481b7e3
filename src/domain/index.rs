//! Equal-weighted index calculation.
//!
//! The index value for a date is the unweighted arithmetic mean of closing
//! prices over the top N observations by market cap for that date.

use crate::domain::calendar::{business_days, format_date};
use crate::domain::error::EqindexError;
use crate::domain::observation::IndexPoint;
use crate::ports::store_port::StorePort;
use chrono::NaiveDate;

pub const DEFAULT_TOP_N: usize = 100;

/// Index value for a single date. `Ok(None)` when the date has no
/// observations; that is absent data, not an error.
pub fn compute_index_value(
    store: &dyn StorePort,
    date: &str,
    top_n: usize,
) -> Result<Option<f64>, EqindexError> {
    let constituents = store.query_top_by_market_cap(date, top_n)?;
    if constituents.is_empty() {
        return Ok(None);
    }
    let sum: f64 = constituents.iter().map(|c| c.closing_price).sum();
    Ok(Some(sum / constituents.len() as f64))
}

/// One [`IndexPoint`] per business day in [start, end] ascending, including
/// days with no data. An inverted range yields an empty series; callers
/// wanting an error must validate ordering themselves.
pub fn compute_index_range(
    store: &dyn StorePort,
    start: NaiveDate,
    end: NaiveDate,
    top_n: usize,
) -> Result<Vec<IndexPoint>, EqindexError> {
    let mut points = Vec::new();
    for day in business_days(start, end) {
        let index_value = compute_index_value(store, &format_date(day), top_n)?;
        points.push(IndexPoint {
            date: day,
            index_value,
        });
    }
    Ok(points)
}
