//! domain_evaluate tool implementation.
//!
//! Normalizes the requested domain and returns its report, grading it through
//! SSL Labs when no usable stored evaluation exists.

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sslwatch_client::normalize_domain;
use sslwatch_core::Error;

use crate::report::build_report;
use crate::state::AppState;

/// Parameters for the domain_evaluate tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DomainEvaluateParams {
    /// Domain to evaluate, e.g. "example.com". A full http(s) URL is reduced
    /// to its host.
    pub domain: String,
}

/// Implementation of the domain_evaluate tool.
pub async fn evaluate_impl(state: &AppState, params: DomainEvaluateParams) -> Result<CallToolResult, McpError> {
    let domain = normalize_domain(&params.domain).map_err(Error::from)?;
    let now = state.clock.now();

    tracing::info!(%domain, "evaluating domain");
    let output = build_report(state, &domain, now).await?;

    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize report: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
