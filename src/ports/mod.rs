//! Port traits implemented by adapters.

pub mod config_port;
pub mod export_port;
pub mod market_data_port;
pub mod store_port;
