//! SQLite-backed evaluation store.
//!
//! Evaluations and their servers live in two tables linked by
//! `servers.evaluation_id`. Access is async through tokio-rusqlite, with WAL
//! mode for concurrent readers and versioned migrations applied on open.

pub mod connection;
pub mod evaluations;
pub mod migrations;
pub mod servers;

pub use crate::Error;

pub use connection::EvaluationDb;
