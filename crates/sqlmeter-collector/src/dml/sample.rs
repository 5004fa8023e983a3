//! DML activity sample types

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlmeter_core::Row;

/// Two-valued classification of a DML statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DmlClass {
    Reads,
    Writes,
}

impl DmlClass {
    /// Parse the classification column emitted by the DML activity query
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Reads" => Some(DmlClass::Reads),
            "Writes" => Some(DmlClass::Writes),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DmlClass::Reads => "Reads",
            DmlClass::Writes => "Writes",
        }
    }
}

impl std::fmt::Display for DmlClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One observation of a cached plan's cumulative execution counter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DmlActivitySample {
    /// Creation time of the underlying execution plan
    pub creation_time: NaiveDateTime,
    /// Statement fingerprint (query hash)
    pub statement_hash: Vec<u8>,
    /// Plan fingerprint (plan handle)
    pub plan_handle: Vec<u8>,
    /// Reads or Writes
    pub class: DmlClass,
    /// Cumulative execution count as reported by the server
    pub execution_count: i64,
}

impl DmlActivitySample {
    /// Map one result row into a sample. Returns `None` when a column
    /// is missing or of the wrong type.
    pub fn from_row(row: &Row) -> Option<Self> {
        let creation_time = row.get_by_name("creation_time")?.as_datetime()?;
        let statement_hash = row.get_by_name("statement_hash")?.as_bytes()?.to_vec();
        let plan_handle = row.get_by_name("plan_handle")?.as_bytes()?.to_vec();
        let class = DmlClass::parse(row.get_by_name("query_class")?.as_str()?)?;
        let execution_count = row.get_by_name("execution_count")?.as_i64()?;

        Some(Self {
            creation_time,
            statement_hash,
            plan_handle,
            class,
            execution_count,
        })
    }

    /// Derived identity correlating a sample across cycles. Two samples
    /// with the same key are the same statement instance.
    pub fn activity_key(&self) -> String {
        format!(
            "{}:{}:{}:{}",
            hex::encode(&self.plan_handle),
            hex::encode(&self.statement_hash),
            self.creation_time.and_utc().timestamp_micros(),
            self.class
        )
    }
}

impl std::fmt::Display for DmlActivitySample {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "plan=0x{} statement=0x{} created={} class={} executions={}",
            hex::encode(&self.plan_handle),
            hex::encode(&self.statement_hash),
            self.creation_time,
            self.class,
            self.execution_count
        )
    }
}

/// The single per-cycle aggregate emitted by the delta tracker
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DmlTotals {
    /// Read executions accrued since the previous cycle
    pub reads: i64,
    /// Write executions accrued since the previous cycle
    pub writes: i64,
}

impl std::fmt::Display for DmlTotals {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Reads={} Writes={}", self.reads, self.writes)
    }
}
