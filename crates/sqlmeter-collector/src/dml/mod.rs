//! DML activity samples and cross-cycle delta tracking

mod sample;
mod tracker;


pub use sample::{DmlActivitySample, DmlClass, DmlTotals};
pub use tracker::DmlDeltaTracker;
