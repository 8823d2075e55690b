//! Freshness decision engine.
//!
//! Given a domain and the current time, decides whether to hand back a stored
//! evaluation, re-probe a stale pending one, or run and persist a brand-new
//! evaluation. A pending record is re-probed only by the caller that wins
//! [`EvaluationDb::claim_pending`]; every other caller gets the stored record.

use chrono::{DateTime, Utc};

use crate::Error;
use crate::model::{Evaluation, format_timestamp};
use crate::remote::Evaluator;
use crate::store::EvaluationDb;

/// Outcome of [`decide`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    /// The evaluation to show the caller, servers loaded.
    pub evaluation: Evaluation,
    /// Whether new data was fetched from the grader and persisted.
    pub changed: bool,
}

impl Decision {
    fn cached(evaluation: Evaluation) -> Self {
        Self { evaluation, changed: false }
    }

    fn fetched(evaluation: Evaluation) -> Self {
        Self { evaluation, changed: true }
    }
}

/// Decide what to show for `domain` at `now`.
///
/// Stored records younger than `wait_window` are returned as-is without
/// touching the grader. Errors from the store, from parsing a stored
/// timestamp, or from the grader abort the call with no retry; a claim made
/// before a failed probe is not rolled back.
pub async fn decide(
    db: &EvaluationDb, domain: &str, now: DateTime<Utc>, wait_window: chrono::Duration, evaluator: &dyn Evaluator,
) -> Result<Decision, Error> {
    if let Some(pending) = db.find_latest_evaluation(domain, true, now).await? {
        return refresh_pending(db, domain, pending, now, wait_window, evaluator).await;
    }

    if let Some(past) = db.find_latest_evaluation(domain, false, now).await?
        && past.is_fresh(now, wait_window)?
    {
        tracing::debug!(domain, id = past.id, "returning fresh evaluation");
        return Ok(Decision::cached(db.with_servers(past).await?));
    }

    let mut evaluation = probe(evaluator, domain, now).await?;
    db.create_evaluation(&mut evaluation).await?;
    tracing::info!(
        domain,
        id = evaluation.id,
        in_progress = evaluation.in_progress,
        grade = %evaluation.ssl_grade,
        "stored new evaluation"
    );
    Ok(Decision::fetched(evaluation))
}

async fn refresh_pending(
    db: &EvaluationDb, domain: &str, mut pending: Evaluation, now: DateTime<Utc>, wait_window: chrono::Duration,
    evaluator: &dyn Evaluator,
) -> Result<Decision, Error> {
    if pending.is_fresh(now, wait_window)? {
        tracing::debug!(domain, id = pending.id, "pending evaluation recently claimed");
        return Ok(Decision::cached(db.with_servers(pending).await?));
    }

    let claimed_hour = format_timestamp(now);
    if !db.claim_pending(pending.id, &pending.evaluation_hour, &claimed_hour).await? {
        tracing::debug!(domain, id = pending.id, "lost claim on pending evaluation");
        let current = db.get_evaluation(pending.id).await?;
        return Ok(Decision::cached(db.with_servers(current).await?));
    }
    pending.evaluation_hour = claimed_hour;

    let mut result = probe(evaluator, domain, now).await?;
    if result.in_progress {
        tracing::debug!(domain, id = pending.id, "grading still in progress");
        return Ok(Decision::cached(db.with_servers(pending).await?));
    }

    result.id = pending.id;
    db.update_evaluation(&mut result).await?;
    tracing::info!(domain, id = result.id, grade = %result.ssl_grade, is_down = result.is_down, "completed pending evaluation");
    Ok(Decision::fetched(result))
}

async fn probe(evaluator: &dyn Evaluator, domain: &str, now: DateTime<Utc>) -> Result<Evaluation, Error> {
    let mut evaluation = evaluator.evaluate(domain).await?;
    evaluation.id = 0;
    evaluation.domain = domain.to_string();
    evaluation.evaluation_hour = format_timestamp(now);
    Ok(evaluation)
}
