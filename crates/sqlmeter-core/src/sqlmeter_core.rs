//! sqlmeter core - shared abstractions for the metrics collector
//!
//! This crate provides the types and traits the collector and the
//! database drivers build on:
//!
//! - `Connection` - trait for an open database connection
//! - `DatabaseDriver` - trait for driver implementations
//! - `ConnectionConfig` - endpoint connection settings with redacted rendering
//! - Common types like `Value`, `Row`, `QueryResult`
//! - `MeterError` / `Result` - the shared error type

mod connection;
mod driver;
mod error;
mod types;

#[cfg(test)]
mod driver_tests;
#[cfg(test)]
mod types_tests;

pub use connection::*;
pub use driver::*;
pub use error::*;
pub use types::*;
