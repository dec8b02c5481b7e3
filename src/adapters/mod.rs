//! Concrete adapter implementations for ports.

#[cfg(feature = "sqlite")]
pub mod sqlite_adapter;
pub mod csv_export_adapter;
pub mod csv_market_data;
pub mod file_config_adapter;
pub mod typst_export_adapter;
