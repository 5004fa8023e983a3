//! Query result contexts

use crate::catalog::MetricQuery;
use crate::dml::{DmlActivitySample, DmlTotals};
use sqlmeter_core::Row;

/// The typed payload of one executed query
#[derive(Debug, Clone, PartialEq)]
pub enum QueryRows {
    /// Raw DML activity samples, before delta tracking
    Dml(Vec<DmlActivitySample>),
    /// The per-cycle DML aggregate produced by the delta tracker
    Totals(DmlTotals),
    /// Generic tabular rows, passed through unmodified
    Tabular(Vec<Row>),
}

impl QueryRows {
    /// Number of records carried
    pub fn len(&self) -> usize {
        match self {
            QueryRows::Dml(samples) => samples.len(),
            QueryRows::Totals(_) => 1,
            QueryRows::Tabular(rows) => rows.len(),
        }
    }

    /// Check whether the payload carries no records
    pub fn is_empty(&self) -> bool {
        match self {
            QueryRows::Dml(samples) => samples.is_empty(),
            QueryRows::Totals(_) => false,
            QueryRows::Tabular(rows) => rows.is_empty(),
        }
    }
}

/// One execution outcome: the originating query, its (possibly
/// delta-transformed) results, and the endpoint identity for the
/// downstream reporter.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryContext {
    /// The query that produced these results
    pub query: MetricQuery,
    /// Typed result records
    pub rows: QueryRows,
    /// Endpoint display name
    pub endpoint_name: String,
    /// Component identifier of the endpoint variant
    pub component_guid: &'static str,
}

impl QueryContext {
    /// The metric path template the results should be reported under
    pub fn metric_path(&self) -> &'static str {
        self.query.metric_path
    }
}
