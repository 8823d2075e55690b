//! evaluations_recent tool implementation.
//!
//! Lists the latest stored evaluation of every domain, ordered by domain. Served
//! from the in-memory list while it is younger than the configured TTL.

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sslwatch_core::{Error, Evaluation};

use crate::state::AppState;

/// Parameters for the evaluations_recent tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct EvaluationsRecentParams {
    /// Maximum number of evaluations to return (default: all).
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Output from the evaluations_recent tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EvaluationsRecentOutput {
    pub evaluations: Vec<Evaluation>,
}

/// Implementation of the evaluations_recent tool.
pub async fn recent_impl(state: &AppState, params: EvaluationsRecentParams) -> Result<CallToolResult, McpError> {
    if params.limit == Some(0) {
        return Err(Error::InvalidInput("limit must be at least 1".to_string()).into());
    }

    let mut evaluations = state.recent.list().await?;
    if let Some(limit) = params.limit {
        evaluations.truncate(limit);
    }

    let output = EvaluationsRecentOutput { evaluations };
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize evaluations: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::build_report;
    use crate::report::tests::{FakePages, QueueEvaluator, at, graded, state_with};
    use std::sync::Arc;

    fn output_of(result: &CallToolResult) -> EvaluationsRecentOutput {
        let content = serde_json::to_value(&result.content[0]).unwrap();
        let text = content.get("text").and_then(|v| v.as_str()).unwrap();
        serde_json::from_str(text).unwrap()
    }

    #[tokio::test]
    async fn test_recent_impl_empty() {
        let state = state_with(
            Arc::new(QueueEvaluator::default()),
            FakePages { icon: Ok(None), title: Ok(None) },
            at("2024-05-01T15:00:00Z"),
        )
        .await;

        let result = recent_impl(&state, EvaluationsRecentParams::default()).await.unwrap();
        assert!(output_of(&result).evaluations.is_empty());
    }

    #[tokio::test]
    async fn test_recent_impl_lists_and_limits() {
        let now = at("2024-05-01T15:00:00Z");
        let evaluator = Arc::new(QueueEvaluator::default());
        evaluator.push(Ok(graded("A", &["1.1.1.1"])));
        evaluator.push(Ok(graded("C", &["8.8.8.8"])));
        let state = state_with(evaluator, FakePages { icon: Ok(None), title: Ok(None) }, now).await;

        build_report(&state, "a.example.com", now).await.unwrap();
        build_report(&state, "b.example.com", now).await.unwrap();

        let result = recent_impl(&state, EvaluationsRecentParams::default()).await.unwrap();
        let all = output_of(&result).evaluations;
        assert_eq!(all.len(), 2);

        let params = EvaluationsRecentParams { limit: Some(1) };
        let result = recent_impl(&state, params).await.unwrap();
        assert_eq!(output_of(&result).evaluations.len(), 1);
    }

    #[tokio::test]
    async fn test_recent_impl_rejects_zero_limit() {
        let state = state_with(
            Arc::new(QueueEvaluator::default()),
            FakePages { icon: Ok(None), title: Ok(None) },
            at("2024-05-01T15:00:00Z"),
        )
        .await;

        let params = EvaluationsRecentParams { limit: Some(0) };
        let err = recent_impl(&state, params).await.unwrap_err();
        assert_eq!(err.code.0, -32602);
    }
}
