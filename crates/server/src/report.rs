//! Report assembly for a single domain.
//!
//! Runs the freshness decision, then enriches a newly stored evaluation with
//! page and per-server metadata, and finally compares it with the evaluation
//! from roughly one lookback window earlier. Only the decision itself can fail
//! the request; every later failure is collected into `errors`.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sslwatch_core::{
    ApiError, Error, Evaluation, Server, ServerListStatus, decide, have_servers_changed, previous_grade,
};

use crate::state::AppState;

/// Domain view returned by `domain_evaluate`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DomainReport {
    pub domain: String,
    /// RFC 3339 timestamp of the evaluation shown.
    pub evaluated_at: String,
    pub in_progress: bool,
    pub is_down: bool,
    pub ssl_grade: String,
    /// Grade from about one lookback window earlier; "NO EVALUATION" when none
    /// exists. Absent while the evaluation is pending or the domain is down.
    pub previous_ssl_grade: Option<String>,
    pub servers_changed: bool,
    pub server_list_status: Option<ServerListStatus>,
    pub logo: String,
    pub title: String,
    pub servers: Vec<Server>,
}

/// Report plus the non-fatal failures met while building it.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EvaluateOutput {
    pub report: DomainReport,
    pub errors: Vec<ApiError>,
}

#[derive(Default)]
struct Comparison {
    previous_ssl_grade: Option<String>,
    server_list_status: Option<ServerListStatus>,
}

/// Build the report for an already normalized `domain` at `now`.
pub async fn build_report(state: &AppState, domain: &str, now: DateTime<Utc>) -> Result<EvaluateOutput, Error> {
    let decision = decide(&state.db, domain, now, state.wait_window, state.evaluator.as_ref()).await?;
    let mut evaluation = decision.evaluation;
    let mut errors = Vec::new();

    if decision.changed {
        if !evaluation.is_down {
            enrich_page(state, &mut evaluation, &mut errors).await;
        }
        if evaluation.is_complete() {
            enrich_servers(state, &mut evaluation, &mut errors).await;
        }
        state.recent.invalidate().await;
    }

    let comparison = if evaluation.is_complete() {
        compare(state, &evaluation, &mut errors).await
    } else {
        Comparison::default()
    };

    if !errors.is_empty() {
        tracing::warn!(domain, failures = errors.len(), "report built with enrichment failures");
    }

    Ok(EvaluateOutput { report: into_report(evaluation, comparison), errors })
}

async fn enrich_page(state: &AppState, evaluation: &mut Evaluation, errors: &mut Vec<ApiError>) {
    let (icon, title) = tokio::join!(state.pages.icon(&evaluation.domain), state.pages.title(&evaluation.domain));

    match icon {
        Ok(icon) => {
            evaluation.logo = icon.unwrap_or_default();
            record(errors, state.db.update_logo(evaluation.id, &evaluation.logo).await);
        }
        Err(e) => record(errors, Err(e)),
    }

    match title {
        Ok(title) => {
            evaluation.title = title.unwrap_or_default();
            record(errors, state.db.update_title(evaluation.id, &evaluation.title).await);
        }
        Err(e) => record(errors, Err(e)),
    }
}

async fn enrich_servers(state: &AppState, evaluation: &mut Evaluation, errors: &mut Vec<ApiError>) {
    for server in &mut evaluation.servers {
        let (country, owner) = tokio::join!(state.ips.country(&server.address), state.ips.owner(&server.address));

        let mut touched = false;
        match country {
            Ok(country) => {
                server.country = country;
                touched = true;
            }
            Err(e) => record(errors, Err(e)),
        }
        match owner {
            Ok(owner) => {
                server.owner = owner;
                touched = true;
            }
            Err(e) => record(errors, Err(e)),
        }

        if touched {
            record(errors, state.db.update_server_details(server).await);
        }
    }
}

async fn compare(state: &AppState, evaluation: &Evaluation, errors: &mut Vec<ApiError>) -> Comparison {
    let mut comparison = Comparison::default();

    match have_servers_changed(&state.db, evaluation, state.lookback).await {
        Ok(status) => comparison.server_list_status = Some(status),
        Err(e) => record(errors, Err(e)),
    }
    match previous_grade(&state.db, evaluation, state.lookback).await {
        Ok(grade) => comparison.previous_ssl_grade = Some(grade),
        Err(e) => record(errors, Err(e)),
    }

    comparison
}

fn record(errors: &mut Vec<ApiError>, result: Result<(), Error>) {
    if let Err(e) = result {
        tracing::debug!(error = %e, "report step failed");
        errors.push(ApiError::from(&e));
    }
}

fn into_report(evaluation: Evaluation, comparison: Comparison) -> DomainReport {
    DomainReport {
        domain: evaluation.domain,
        evaluated_at: evaluation.evaluation_hour,
        in_progress: evaluation.in_progress,
        is_down: evaluation.is_down,
        ssl_grade: evaluation.ssl_grade,
        previous_ssl_grade: comparison.previous_ssl_grade,
        servers_changed: comparison.server_list_status == Some(ServerListStatus::Changed),
        server_list_status: comparison.server_list_status,
        logo: evaluation.logo,
        title: evaluation.title,
        servers: evaluation.servers,
    }
}
