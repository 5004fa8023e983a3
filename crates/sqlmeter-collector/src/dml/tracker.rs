//! Cross-cycle delta tracking for DML activity counters

use super::{DmlActivitySample, DmlClass, DmlTotals};
use crate::context::QueryRows;
use crate::VERBOSE_SQL_TARGET;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::Level;

/// Converts cumulative per-statement execution counters into one
/// per-interval aggregate, using the previous cycle's observations as
/// the baseline.
///
/// The history holds exactly the previous cycle's de-duplicated,
/// count-summed samples; it is swapped wholesale at the end of every
/// pass, never merged incrementally. State lives in memory for the
/// process lifetime only.
#[derive(Debug, Default)]
pub struct DmlDeltaTracker {
    pub(crate) history: HashMap<String, DmlActivitySample>,
}

impl DmlDeltaTracker {
    /// Create a tracker with an empty history (first poll baseline)
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of statement instances remembered from the previous cycle
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Post-process one cycle's DML activity results.
    ///
    /// Empty or mismatched input is logged and passed through unchanged;
    /// this is a degenerate cycle, not an error worth aborting the query.
    /// Otherwise the samples collapse into one `QueryRows::Totals` record
    /// and the grouped snapshot becomes the new history.
    pub fn apply(&mut self, rows: QueryRows) -> QueryRows {
        let samples = match rows {
            QueryRows::Dml(samples) if !samples.is_empty() => samples,
            other => {
                tracing::error!(
                    "DML activity post-processing received empty or mismatched results, passing through"
                );
                return other;
            }
        };

        // Duplicate keys within one poll collapse to a single sample with
        // the counts summed; the first-seen fields win.
        let mut current: HashMap<String, DmlActivitySample> = HashMap::new();
        for sample in samples {
            match current.entry(sample.activity_key()) {
                Entry::Occupied(mut entry) => {
                    entry.get_mut().execution_count += sample.execution_count;
                }
                Entry::Vacant(entry) => {
                    entry.insert(sample);
                }
            }
        }

        let mut totals = DmlTotals::default();

        // Without a baseline every delta is implicitly zero.
        if !self.history.is_empty() {
            for (key, sample) in &current {
                let increase = match self.history.get(key) {
                    // New statement instance: its prior count is unknown,
                    // assume a zero baseline.
                    None => sample.execution_count,
                    Some(previous) if previous.class == sample.class => {
                        let delta = sample.execution_count - previous.execution_count;
                        // Counter reset or non-monotonic artifact.
                        if delta <= 0 {
                            continue;
                        }
                        delta
                    }
                    // Key collided across unrelated statements; the delta
                    // is not interpretable.
                    Some(_) => continue,
                };

                match sample.class {
                    DmlClass::Reads => totals.reads += increase,
                    DmlClass::Writes => totals.writes += increase,
                }
            }
        }

        // The current snapshot supersedes the previous one wholesale.
        self.history = current;

        if tracing::enabled!(target: VERBOSE_SQL_TARGET, Level::DEBUG) {
            tracing::debug!(
                target: VERBOSE_SQL_TARGET,
                reads = totals.reads,
                writes = totals.writes,
                "DML activity deltas"
            );
        }

        QueryRows::Totals(totals)
    }
}
