//! MCP tool implementations.
//!
//! This module contains all tools exposed by the sslwatch server.

pub mod evaluate;
pub mod recent;

pub use evaluate::{DomainEvaluateParams, evaluate_impl};
pub use recent::{EvaluationsRecentOutput, EvaluationsRecentParams, recent_impl};
