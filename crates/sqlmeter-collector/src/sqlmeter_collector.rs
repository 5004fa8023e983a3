//! sqlmeter collector - query execution and DML delta tracking
//!
//! One polling cycle runs the enabled metric queries against a single
//! open connection, maps each result set into typed records, and runs
//! the DML activity results through a cross-cycle delta tracker that
//! turns cumulative execution counters into per-interval increases.
//!
//! - `catalog` - the built-in metric query descriptors
//! - `executor` - ordered batch execution with per-query failure isolation
//! - `dml` - DML activity samples, keys, and the delta tracker
//! - `endpoint` - one monitored database target, the public polling unit

mod catalog;
mod context;
mod dml;
mod endpoint;
mod executor;

pub use catalog::{default_catalog, MetricQuery, ResultKind};
pub use context::{QueryContext, QueryRows};
pub use dml::{DmlActivitySample, DmlClass, DmlDeltaTracker, DmlTotals};
pub use endpoint::{Endpoint, EndpointKind};
pub use executor::run_queries;

/// Target for the verbose diagnostic channel. Raw query results and the
/// per-cycle DML summary are emitted here at DEBUG, and only rendered
/// when a subscriber enables the target.
pub const VERBOSE_SQL_TARGET: &str = "sqlmeter::sql";
