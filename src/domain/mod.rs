//! Core domain types and logic.

pub mod calendar;
pub mod config_validation;
pub mod error;
pub mod index;
pub mod ingest;
pub mod observation;
pub mod universe;
