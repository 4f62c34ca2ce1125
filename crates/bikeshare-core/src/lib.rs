//! Domain layer for the bikeshare insight pipeline.
//!
//! Defines the daily and hourly record types, the derived day-type and
//! time-band classifications, the query date range, errors, CLI settings and
//! small formatting helpers shared by the other crates.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
