//! Batch query execution over one shared connection

use crate::catalog::{MetricQuery, ResultKind};
use crate::context::{QueryContext, QueryRows};
use crate::dml::{DmlActivitySample, DmlDeltaTracker};
use crate::VERBOSE_SQL_TARGET;
use sqlmeter_core::{Connection, MeterError, QueryResult, Result};
use std::fmt::Write as _;
use tracing::Level;

/// Per-query outcome. Failures carry enough context to be logged and
/// skipped; they never abort the batch.
enum QueryOutcome {
    Completed(QueryContext),
    Failed {
        query: &'static str,
        error: MeterError,
    },
}

/// Execute every query in declaration order against one open connection.
///
/// Each query's rows are fully materialized, mapped into their typed
/// form, verbose-logged, and (for DML activity results) run through the
/// delta tracker. A failing query produces a gap in the output, not a
/// reordering; the returned contexts follow the input order.
pub async fn run_queries(
    conn: &dyn Connection,
    queries: &[MetricQuery],
    tracker: &mut DmlDeltaTracker,
    endpoint_name: &str,
    component_guid: &'static str,
) -> Vec<QueryContext> {
    let mut outcomes = Vec::with_capacity(queries.len());

    for query in queries {
        let outcome = match run_one(conn, query, tracker).await {
            Ok(rows) => QueryOutcome::Completed(QueryContext {
                query: *query,
                rows,
                endpoint_name: endpoint_name.to_string(),
                component_guid,
            }),
            Err(error) => QueryOutcome::Failed {
                query: query.name,
                error,
            },
        };
        outcomes.push(outcome);
    }

    outcomes
        .into_iter()
        .filter_map(|outcome| match outcome {
            QueryOutcome::Completed(context) => Some(context),
            QueryOutcome::Failed { query, error } => {
                log_query_failure(query, endpoint_name, &error);
                None
            }
        })
        .collect()
}

async fn run_one(
    conn: &dyn Connection,
    query: &MetricQuery,
    tracker: &mut DmlDeltaTracker,
) -> Result<QueryRows> {
    let result = conn.query(query.sql, &[]).await?;
    let rows = map_rows(query, result)?;
    log_verbose_results(query, &rows);

    Ok(match query.result_kind {
        ResultKind::DmlActivity => tracker.apply(rows),
        ResultKind::Tabular => rows,
    })
}

/// Row-mapper boundary: raw rows become the query's declared result
/// type. A row that does not map is a per-query failure.
fn map_rows(query: &MetricQuery, result: QueryResult) -> Result<QueryRows> {
    match query.result_kind {
        ResultKind::DmlActivity => {
            let samples = result
                .rows
                .iter()
                .map(DmlActivitySample::from_row)
                .collect::<Option<Vec<_>>>()
                .ok_or_else(|| {
                    MeterError::Query(format!(
                        "query '{}' returned rows that do not map to DML activity samples",
                        query.name
                    ))
                })?;
            Ok(QueryRows::Dml(samples))
        }
        ResultKind::Tabular => Ok(QueryRows::Tabular(result.rows)),
    }
}

/// Render every result row on the verbose channel. Formatting only
/// happens when a subscriber actually enables the target.
fn log_verbose_results(query: &MetricQuery, rows: &QueryRows) {
    if !tracing::enabled!(target: VERBOSE_SQL_TARGET, Level::DEBUG) {
        return;
    }

    let mut rendered = format!("Executed {}\n", query.name);
    match rows {
        QueryRows::Dml(samples) => {
            for sample in samples {
                let _ = writeln!(rendered, "{}", sample);
            }
        }
        QueryRows::Totals(totals) => {
            let _ = writeln!(rendered, "{}", totals);
        }
        QueryRows::Tabular(rows) => {
            for row in rows {
                let _ = writeln!(rendered, "{}", row);
            }
        }
    }

    tracing::debug!(target: VERBOSE_SQL_TARGET, "{}", rendered);
}

fn log_query_failure(query: &'static str, endpoint_name: &str, error: &MeterError) {
    match error {
        MeterError::Server { code, message } => {
            tracing::error!(
                query,
                endpoint = endpoint_name,
                code,
                "query failed with server error: {}",
                message
            );
        }
        other => {
            tracing::error!(
                query,
                endpoint = endpoint_name,
                error = %other,
                "query failed"
            );
        }
    }
}
