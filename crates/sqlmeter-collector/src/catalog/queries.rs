//! SQL text and descriptors for the built-in metric queries

use super::{MetricQuery, ResultKind};

/// Cumulative DML execution counters per cached plan. Classification is
/// derived from the statement text: plain SELECTs count as reads,
/// everything else as writes.
const DML_ACTIVITY_SQL: &str = r#"
SELECT
    qs.creation_time                AS creation_time,
    CAST(qs.query_hash AS VARBINARY(8))  AS statement_hash,
    CAST(qs.plan_handle AS VARBINARY(64)) AS plan_handle,
    qs.execution_count              AS execution_count,
    CASE
        WHEN UPPER(LTRIM(st.text)) LIKE 'SELECT%' THEN 'Reads'
        ELSE 'Writes'
    END                             AS query_class
FROM sys.dm_exec_query_stats qs
CROSS APPLY sys.dm_exec_sql_text(qs.sql_handle) st
WHERE st.text IS NOT NULL
"#;

/// Single-use vs reused plan cache objects per database
const RECOMPILE_SUMMARY_SQL: &str = r#"
SELECT
    DB_NAME(st.dbid)                                        AS database_name,
    SUM(CASE WHEN cp.usecounts = 1 THEN 1 ELSE 0 END)       AS single_use_objects,
    SUM(CASE WHEN cp.usecounts > 1 THEN 1 ELSE 0 END)       AS multiple_use_objects,
    CAST(100.0 * SUM(CASE WHEN cp.usecounts = 1 THEN 1 ELSE 0 END)
        / COUNT(*) AS DECIMAL(5, 2))                        AS single_use_percent
FROM sys.dm_exec_cached_plans cp
CROSS APPLY sys.dm_exec_sql_text(cp.plan_handle) st
WHERE cp.objtype IN ('Adhoc', 'Prepared')
  AND st.dbid IS NOT NULL
GROUP BY DB_NAME(st.dbid)
"#;

/// Current client connection count
const CONNECTION_COUNT_SQL: &str = r#"
SELECT COUNT(*) AS connection_count
FROM sys.dm_exec_connections
"#;

/// The built-in query catalogue, in execution order.
pub fn default_catalog() -> Vec<MetricQuery> {
    vec![
        MetricQuery {
            name: "DML Activity",
            sql: DML_ACTIVITY_SQL,
            metric_path: "Component/DmlActivity",
            result_kind: ResultKind::DmlActivity,
            enabled: true,
            azure_compatible: true,
        },
        MetricQuery {
            name: "Recompile Summary",
            sql: RECOMPILE_SUMMARY_SQL,
            metric_path: "Component/Recompiles/{database_name}",
            result_kind: ResultKind::Tabular,
            enabled: true,
            azure_compatible: false,
        },
        MetricQuery {
            name: "Connection Count",
            sql: CONNECTION_COUNT_SQL,
            metric_path: "Component/Connections",
            result_kind: ResultKind::Tabular,
            enabled: true,
            azure_compatible: true,
        },
    ]
}
