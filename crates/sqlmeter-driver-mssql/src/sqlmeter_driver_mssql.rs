//! MS SQL Server driver for sqlmeter
//!
//! Implements the core `Connection` and `DatabaseDriver` traits on top
//! of tiberius, including ADO-style connection string parsing.

mod connection;
mod driver;

#[cfg(test)]
mod connection_tests;
#[cfg(test)]
mod driver_tests;

pub use connection::{MssqlConnection, MssqlConnectionError};
pub use driver::MssqlDriver;
