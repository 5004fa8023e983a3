//! Connection trait

use crate::{QueryResult, Result, Value};
use async_trait::async_trait;

/// An open database connection.
///
/// The collector treats a connection as an opaque resource that can run
/// one query at a time and stream back rows. One connection is opened
/// per polling cycle and shared by every query in the batch.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Get the driver name (e.g., "mssql")
    fn driver_name(&self) -> &str;

    /// Execute a query that returns rows
    async fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult>;

    /// Close the connection
    async fn close(&self) -> Result<()>;

    /// Check if the connection is closed
    fn is_closed(&self) -> bool;
}
