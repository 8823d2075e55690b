//! Core types and shared functionality for sslwatch.
//!
//! This crate provides:
//! - Evaluation store with SQLite backend
//! - Freshness decisions and change detection over stored evaluations
//! - Grade aggregation
//! - Unified error types
//! - Configuration structures

pub mod config;
pub mod error;
pub mod freshness;
pub mod grade;
pub mod history;
pub mod model;
pub mod recent;
pub mod remote;
pub mod store;

pub use config::{AppConfig, ConfigError};
pub use error::{ApiError, Error, ErrorKind};
pub use freshness::{Decision, decide};
pub use grade::{UNGRADED, worst_grade};
pub use history::{NO_EVALUATION, ServerListStatus, have_servers_changed, previous_grade};
pub use model::{Evaluation, Server, format_timestamp, parse_timestamp};
pub use recent::{Clock, RecentEvaluations, SystemClock};
pub use remote::{Evaluator, IpInspector, PageInspector};
pub use store::EvaluationDb;
