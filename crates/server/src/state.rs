//! Shared server state.

use std::sync::Arc;

use sslwatch_client::{PageClient, PageConfig, SslLabsClient, SslLabsConfig, WhoisClient, WhoisConfig};
use sslwatch_core::{AppConfig, Clock, EvaluationDb, Evaluator, IpInspector, PageInspector, RecentEvaluations, SystemClock};

use crate::error::StartupError;

/// Everything a tool call needs. Cloning shares the underlying handles.
#[derive(Clone)]
pub struct AppState {
    pub db: EvaluationDb,
    pub evaluator: Arc<dyn Evaluator>,
    pub pages: Arc<dyn PageInspector>,
    pub ips: Arc<dyn IpInspector>,
    pub clock: Arc<dyn Clock>,
    pub recent: Arc<RecentEvaluations>,
    pub wait_window: chrono::Duration,
    pub lookback: chrono::Duration,
}

impl AppState {
    /// Open the store and build the HTTP collaborators from `config`.
    pub async fn connect(config: &AppConfig) -> Result<Self, StartupError> {
        if let Err(e) = config.require_whois_api_key() {
            tracing::warn!("{e}; server country and owner lookups will fail");
        }

        let db = EvaluationDb::open(&config.db_path).await?;
        let evaluator = SslLabsClient::new(SslLabsConfig::from_app_config(config))?;
        let pages = PageClient::new(PageConfig::from_app_config(config))?;
        let ips = WhoisClient::new(WhoisConfig::from_app_config(config))?;

        tracing::info!(db_path = %config.db_path.display(), "evaluation store ready");

        Ok(Self::new(
            db,
            Arc::new(evaluator),
            Arc::new(pages),
            Arc::new(ips),
            Arc::new(SystemClock),
            config,
        ))
    }

    /// Assemble state from already built parts.
    pub fn new(
        db: EvaluationDb, evaluator: Arc<dyn Evaluator>, pages: Arc<dyn PageInspector>, ips: Arc<dyn IpInspector>,
        clock: Arc<dyn Clock>, config: &AppConfig,
    ) -> Self {
        let recent = Arc::new(RecentEvaluations::new(db.clone(), clock.clone(), config.recent_ttl()));
        Self {
            db,
            evaluator,
            pages,
            ips,
            clock,
            recent,
            wait_window: config.wait_window(),
            lookback: config.lookback(),
        }
    }
}
