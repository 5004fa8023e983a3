//! Monitored database endpoints

mod poll;


pub use poll::{Endpoint, EndpointKind};
