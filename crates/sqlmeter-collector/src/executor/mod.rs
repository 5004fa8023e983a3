//! Ordered batch execution with per-query failure isolation

mod batch;


pub use batch::run_queries;
