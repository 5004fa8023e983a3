//! Built-in metric query catalogue

mod queries;


pub use queries::default_catalog;

/// How the rows of a query are mapped and post-processed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultKind {
    /// Rows map to `DmlActivitySample` and run through the delta tracker
    DmlActivity,
    /// Rows pass through as generic tabular data
    Tabular,
}

/// One metric query descriptor: an opaque unit of work owned by the
/// catalogue. Immutable once constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricQuery {
    /// Short name used in logs
    pub name: &'static str,
    /// SQL text
    pub sql: &'static str,
    /// Metric path template for the downstream reporter
    pub metric_path: &'static str,
    /// How the result rows are typed
    pub result_kind: ResultKind,
    /// Whether the query runs at all
    pub enabled: bool,
    /// Whether the query can run against Azure SQL (some DMVs are
    /// unavailable there)
    pub azure_compatible: bool,
}
