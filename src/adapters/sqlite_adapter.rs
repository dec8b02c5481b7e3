//! SQLite store adapter.
//!
//! Two relations: `stocks(ticker PRIMARY KEY, name)` and
//! `daily_data(date, ticker, closing_price, market_cap)` keyed by
//! (date, ticker). `daily_data.ticker` logically references
//! `stocks.ticker`, but the schema carries no FOREIGN KEY clause:
//! observations must be accepted even when no stock row exists yet.

use crate::domain::calendar::{self, parse_date};
use crate::domain::error::EqindexError;
use crate::domain::observation::DailyObservation;
use crate::ports::config_port::ConfigPort;
use crate::ports::store_port::{StorePort, StoreSummary};
use chrono::NaiveDate;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;

pub struct SqliteAdapter {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, EqindexError> {
        let db_path =
            config
                .get_string("sqlite", "path")
                .ok_or_else(|| EqindexError::ConfigMissing {
                    section: "sqlite".into(),
                    key: "path".into(),
                })?;

        let pool_size = config.get_int("sqlite", "pool_size", 4) as u32;

        let manager = SqliteConnectionManager::file(&db_path);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(|e: r2d2::Error| EqindexError::Database {
                reason: e.to_string(),
            })?;

        Ok(Self { pool })
    }

    pub fn in_memory() -> Result<Self, EqindexError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e: r2d2::Error| EqindexError::Database {
                reason: e.to_string(),
            })?;

        Ok(Self { pool })
    }

    fn conn(
        &self,
    ) -> Result<r2d2::PooledConnection<SqliteConnectionManager>, EqindexError> {
        self.pool
            .get()
            .map_err(|e: r2d2::Error| EqindexError::Database {
                reason: e.to_string(),
            })
    }

    pub fn initialize_schema(&self) -> Result<(), EqindexError> {
        let conn = self.conn()?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS stocks (
                ticker TEXT PRIMARY KEY,
                name TEXT
            );
            CREATE TABLE IF NOT EXISTS daily_data (
                date TEXT NOT NULL,
                ticker TEXT NOT NULL,
                closing_price REAL NOT NULL,
                market_cap REAL NOT NULL,
                PRIMARY KEY (date, ticker)
            );
            CREATE INDEX IF NOT EXISTS idx_daily_data_date ON daily_data(date);",
        )
        .map_err(|e: rusqlite::Error| EqindexError::DatabaseQuery {
            reason: e.to_string(),
        })?;

        Ok(())
    }

    fn row_to_observation(row: &rusqlite::Row) -> Result<DailyObservation, rusqlite::Error> {
        let date_str: String = row.get(0)?;
        let date = NaiveDate::parse_from_str(&date_str, calendar::DATE_FORMAT).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                date_str.len(),
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })?;
        Ok(DailyObservation {
            date,
            ticker: row.get(1)?,
            closing_price: row.get(2)?,
            market_cap: row.get(3)?,
        })
    }
}

impl StorePort for SqliteAdapter {
    fn upsert_stock(&self, ticker: &str, name: Option<&str>) -> Result<(), EqindexError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR REPLACE INTO stocks (ticker, name) VALUES (?1, ?2)",
            params![ticker, name],
        )
        .map_err(|e: rusqlite::Error| EqindexError::DatabaseQuery {
            reason: e.to_string(),
        })?;
        Ok(())
    }

    fn upsert_observation(&self, obs: &DailyObservation) -> Result<(), EqindexError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR REPLACE INTO daily_data (date, ticker, closing_price, market_cap)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                calendar::format_date(obs.date),
                obs.ticker,
                obs.closing_price,
                obs.market_cap
            ],
        )
        .map_err(|e: rusqlite::Error| EqindexError::DatabaseQuery {
            reason: e.to_string(),
        })?;
        Ok(())
    }

    fn upsert_observations(&self, obs: &[DailyObservation]) -> Result<(), EqindexError> {
        let mut conn = self.conn()?;

        let tx = conn
            .transaction()
            .map_err(|e: rusqlite::Error| EqindexError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        for o in obs {
            tx.execute(
                "INSERT OR REPLACE INTO daily_data (date, ticker, closing_price, market_cap)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    calendar::format_date(o.date),
                    o.ticker,
                    o.closing_price,
                    o.market_cap
                ],
            )
            .map_err(|e: rusqlite::Error| EqindexError::DatabaseQuery {
                reason: e.to_string(),
            })?;
        }

        tx.commit()
            .map_err(|e: rusqlite::Error| EqindexError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        Ok(())
    }

    fn query_top_by_market_cap(
        &self,
        date: &str,
        limit: usize,
    ) -> Result<Vec<DailyObservation>, EqindexError> {
        // SQLite would accept any string here; validate before querying.
        parse_date(date)?;

        let conn = self.conn()?;

        let query = "SELECT date, ticker, closing_price, market_cap
                     FROM daily_data
                     WHERE date = ?1
                     ORDER BY market_cap DESC, ticker ASC
                     LIMIT ?2";

        let mut stmt =
            conn.prepare(query)
                .map_err(|e: rusqlite::Error| EqindexError::DatabaseQuery {
                    reason: e.to_string(),
                })?;

        let rows = stmt
            .query_map(params![date, limit as i64], Self::row_to_observation)
            .map_err(|e: rusqlite::Error| EqindexError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        let mut observations = Vec::new();
        for row in rows {
            observations.push(row.map_err(|e: rusqlite::Error| {
                EqindexError::DatabaseQuery {
                    reason: e.to_string(),
                }
            })?);
        }

        Ok(observations)
    }

    fn latest_stored_date(&self) -> Result<Option<NaiveDate>, EqindexError> {
        let conn = self.conn()?;

        let result: Option<String> = conn
            .query_row("SELECT MAX(date) FROM daily_data", [], |row| row.get(0))
            .map_err(|e: rusqlite::Error| EqindexError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        match result {
            Some(date_str) => {
                let date = NaiveDate::parse_from_str(&date_str, calendar::DATE_FORMAT).map_err(
                    |e: chrono::ParseError| EqindexError::Database {
                        reason: e.to_string(),
                    },
                )?;
                Ok(Some(date))
            }
            None => Ok(None),
        }
    }

    fn query_composition(
        &self,
        start: &str,
        end: &str,
    ) -> Result<Vec<DailyObservation>, EqindexError> {
        parse_date(start)?;
        parse_date(end)?;

        let conn = self.conn()?;

        let query = "SELECT date, ticker, closing_price, market_cap
                     FROM daily_data
                     WHERE date >= ?1 AND date <= ?2
                     ORDER BY date ASC, market_cap DESC, ticker ASC";

        let mut stmt =
            conn.prepare(query)
                .map_err(|e: rusqlite::Error| EqindexError::DatabaseQuery {
                    reason: e.to_string(),
                })?;

        let rows = stmt
            .query_map(params![start, end], Self::row_to_observation)
            .map_err(|e: rusqlite::Error| EqindexError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        let mut observations = Vec::new();
        for row in rows {
            observations.push(row.map_err(|e: rusqlite::Error| {
                EqindexError::DatabaseQuery {
                    reason: e.to_string(),
                }
            })?);
        }

        Ok(observations)
    }

    fn summary(&self) -> Result<StoreSummary, EqindexError> {
        let conn = self.conn()?;

        let query = "SELECT COUNT(*), COUNT(DISTINCT ticker), MIN(date), MAX(date)
                     FROM daily_data";

        let (total, distinct, min_str, max_str): (i64, i64, Option<String>, Option<String>) =
            conn.query_row(query, [], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
            })
            .map_err(|e: rusqlite::Error| EqindexError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        let parse_opt = |s: Option<String>| -> Result<Option<NaiveDate>, EqindexError> {
            match s {
                Some(v) => NaiveDate::parse_from_str(&v, calendar::DATE_FORMAT)
                    .map(Some)
                    .map_err(|e: chrono::ParseError| EqindexError::Database {
                        reason: e.to_string(),
                    }),
                None => Ok(None),
            }
        };

        Ok(StoreSummary {
            total_observations: total as usize,
            distinct_tickers: distinct as usize,
            first_date: parse_opt(min_str)?,
            last_date: parse_opt(max_str)?,
        })
    }
}
