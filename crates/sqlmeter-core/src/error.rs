//! Error types for sqlmeter

use thiserror::Error;

/// Core error type for collector operations
#[derive(Error, Debug)]
pub enum MeterError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Driver error: {0}")]
    Driver(String),

    /// A server-side SQL error. Carries the error number reported by the
    /// database so failures can be logged with structured detail.
    #[error("Server error {code}: {message}")]
    Server { code: u32, message: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Not supported: {0}")]
    NotSupported(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for collector operations
pub type Result<T> = std::result::Result<T, MeterError>;
