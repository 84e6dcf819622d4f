//! # Transport Client
//!
//! Wire types and the outbound calls to the backend. Stateless: callers own
//! the interpretation of every failure.

pub mod client;
pub mod transport;
pub mod types;

pub use client::HttpTransport;
pub use transport::{Transport, TransportError};
pub use types::{CourseStats, QueryRequest, QueryResponse};
