//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use crate::state::AppState;
use crate::tools::{DomainEvaluateParams, EvaluationsRecentParams, evaluate_impl, recent_impl};

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The main MCP server handler for sslwatch.
#[derive(Clone)]
pub struct SslWatchServer {
    state: AppState,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl SslWatchServer {
    /// Create a new server handler over shared state.
    pub fn new(state: AppState) -> Self {
        Self { state, tool_router: Self::tool_router() }
    }

    /// Evaluate a domain's TLS configuration.
    ///
    /// Returns the stored evaluation while it is fresh or still being graded,
    /// otherwise asks SSL Labs for a new one.
    #[tool(
        description = "Evaluate a domain's TLS configuration. Returns SSL grade, servers with country/owner, favicon, page title and whether servers or grade changed in the last hour."
    )]
    async fn domain_evaluate(&self, params: Parameters<DomainEvaluateParams>) -> Result<CallToolResult, McpError> {
        evaluate_impl(&self.state, params.0).await
    }

    #[tool(description = "List the latest stored evaluation of every domain.")]
    async fn evaluations_recent(
        &self, params: Parameters<EvaluationsRecentParams>,
    ) -> Result<CallToolResult, McpError> {
        recent_impl(&self.state, params.0).await
    }
}

impl ServerHandler for SslWatchServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "sslwatch".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(
                "Grades domains through SSL Labs. Results are stored and reused while fresh; repeat calls for a \
                 domain that is still being graded return the pending evaluation."
                    .into(),
            ),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
