//! Change detection against an earlier completed evaluation.
//!
//! Both lookups use the latest completed evaluation strictly older than
//! `evaluation_hour - lookback` for the same domain. They only read.

use serde::{Deserialize, Serialize};

use crate::Error;
use crate::model::{Evaluation, servers_match};
use crate::store::EvaluationDb;

/// Returned by [`previous_grade`] when nothing older exists.
pub const NO_EVALUATION: &str = "NO EVALUATION";

/// Result of comparing server lists with an earlier evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ServerListStatus {
    NoPriorRecord,
    Unchanged,
    Changed,
}

async fn prior_evaluation(
    db: &EvaluationDb, evaluation: &Evaluation, lookback: chrono::Duration,
) -> Result<Option<Evaluation>, Error> {
    let bound = evaluation.hour()? - lookback;
    db.find_latest_evaluation(&evaluation.domain, false, bound).await
}

/// Compare `evaluation`'s servers with the earlier evaluation's.
///
/// The comparison is positional: the same servers in another order count as
/// [`ServerListStatus::Changed`].
pub async fn have_servers_changed(
    db: &EvaluationDb, evaluation: &Evaluation, lookback: chrono::Duration,
) -> Result<ServerListStatus, Error> {
    let Some(prior) = prior_evaluation(db, evaluation, lookback).await? else {
        return Ok(ServerListStatus::NoPriorRecord);
    };

    let prior_servers = db.load_servers(prior.id).await?;
    if servers_match(&evaluation.servers, &prior_servers) {
        Ok(ServerListStatus::Unchanged)
    } else {
        Ok(ServerListStatus::Changed)
    }
}

/// Grade of the earlier evaluation, or [`NO_EVALUATION`].
pub async fn previous_grade(
    db: &EvaluationDb, evaluation: &Evaluation, lookback: chrono::Duration,
) -> Result<String, Error> {
    Ok(prior_evaluation(db, evaluation, lookback)
        .await?
        .map_or_else(|| NO_EVALUATION.to_string(), |prior| prior.ssl_grade))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::freshness::decide;
    use crate::freshness::tests::{ScriptedEvaluator, graded};
    use crate::model::{Server, parse_timestamp};

    const DOMAIN: &str = "prueba1.com";

    fn hour() -> chrono::Duration {
        chrono::Duration::hours(1)
    }

    async fn evaluate_at(db: &EvaluationDb, when: &str, result: Evaluation) -> Evaluation {
        let evaluator = ScriptedEvaluator::default();
        evaluator.push(Ok(result));
        decide(db, DOMAIN, parse_timestamp(when).unwrap(), chrono::Duration::seconds(20), &evaluator)
            .await
            .unwrap()
            .evaluation
    }

    #[tokio::test]
    async fn test_history_over_time() {
        let db = EvaluationDb::open_in_memory().await.unwrap();
        let servers = ["128.30.20.10", "128.28.20.10"];

        let first = evaluate_at(&db, "2016-01-01T15:00:00+02:00", graded("A+", &servers)).await;
        assert_eq!(have_servers_changed(&db, &first, hour()).await.unwrap(), ServerListStatus::NoPriorRecord);
        assert_eq!(previous_grade(&db, &first, hour()).await.unwrap(), NO_EVALUATION);

        let half_hour = evaluate_at(&db, "2016-01-01T15:30:00+02:00", graded("A+", &servers)).await;
        assert_eq!(
            have_servers_changed(&db, &half_hour, hour()).await.unwrap(),
            ServerListStatus::NoPriorRecord
        );
        assert_eq!(previous_grade(&db, &half_hour, hour()).await.unwrap(), NO_EVALUATION);

        let later = evaluate_at(&db, "2016-01-01T16:20:00+02:00", graded("A+", &servers)).await;
        assert_eq!(have_servers_changed(&db, &later, hour()).await.unwrap(), ServerListStatus::Unchanged);
        assert_eq!(previous_grade(&db, &later, hour()).await.unwrap(), "A+");

        let moved = evaluate_at(&db, "2016-01-01T16:25:00+02:00", graded("B", &["128.30.28.10", "128.28.20.10"])).await;
        assert_eq!(have_servers_changed(&db, &moved, hour()).await.unwrap(), ServerListStatus::Changed);
        assert_eq!(previous_grade(&db, &moved, hour()).await.unwrap(), "A+");
    }

    #[tokio::test]
    async fn test_prior_exactly_one_lookback_earlier_is_excluded() {
        let db = EvaluationDb::open_in_memory().await.unwrap();
        evaluate_at(&db, "2016-01-01T13:00:00Z", graded("C", &["10.0.0.1"])).await;
        let current = evaluate_at(&db, "2016-01-01T14:00:00Z", graded("A", &["10.0.0.1"])).await;

        assert_eq!(have_servers_changed(&db, &current, hour()).await.unwrap(), ServerListStatus::NoPriorRecord);
        assert_eq!(previous_grade(&db, &current, hour()).await.unwrap(), NO_EVALUATION);
    }

    #[tokio::test]
    async fn test_reordered_servers_count_as_changed() {
        let db = EvaluationDb::open_in_memory().await.unwrap();
        evaluate_at(&db, "2016-01-01T13:00:00Z", graded("A", &["10.0.0.1", "10.0.0.2"])).await;
        let current = evaluate_at(&db, "2016-01-01T14:30:00Z", graded("A", &["10.0.0.2", "10.0.0.1"])).await;

        assert_eq!(have_servers_changed(&db, &current, hour()).await.unwrap(), ServerListStatus::Changed);
    }

    #[tokio::test]
    async fn test_length_mismatch_is_changed() {
        let db = EvaluationDb::open_in_memory().await.unwrap();
        evaluate_at(&db, "2016-01-01T13:00:00Z", graded("A", &["10.0.0.1"])).await;
        let current = evaluate_at(&db, "2016-01-01T14:30:00Z", graded("A", &["10.0.0.1", "10.0.0.2"])).await;

        assert_eq!(have_servers_changed(&db, &current, hour()).await.unwrap(), ServerListStatus::Changed);
    }

    #[tokio::test]
    async fn test_enriched_fields_are_compared() {
        let db = EvaluationDb::open_in_memory().await.unwrap();
        let prior = evaluate_at(&db, "2016-01-01T13:00:00Z", graded("A", &["10.0.0.1"])).await;
        let mut server = prior.servers[0].clone();
        server.country = "US".into();
        db.update_server_details(&server).await.unwrap();

        let current = evaluate_at(&db, "2016-01-01T14:30:00Z", graded("A", &["10.0.0.1"])).await;
        assert_eq!(have_servers_changed(&db, &current, hour()).await.unwrap(), ServerListStatus::Changed);

        let with_country = Evaluation { servers: vec![Server { country: "US".into(), ..Server::new("10.0.0.1", "A") }], ..current };
        assert_eq!(have_servers_changed(&db, &with_country, hour()).await.unwrap(), ServerListStatus::Unchanged);
    }

    #[tokio::test]
    async fn test_pending_records_are_ignored() {
        let db = EvaluationDb::open_in_memory().await.unwrap();
        let mut pending = Evaluation {
            domain: DOMAIN.into(),
            evaluation_hour: "2016-01-01T12:00:00.000000000Z".into(),
            in_progress: true,
            ..Default::default()
        };
        db.create_evaluation(&mut pending).await.unwrap();

        let mut current = Evaluation {
            domain: DOMAIN.into(),
            evaluation_hour: "2016-01-01T14:30:00.000000000Z".into(),
            ..graded("A", &["10.0.0.1"])
        };
        db.create_evaluation(&mut current).await.unwrap();

        assert_eq!(previous_grade(&db, &current, hour()).await.unwrap(), NO_EVALUATION);
        assert_eq!(have_servers_changed(&db, &current, hour()).await.unwrap(), ServerListStatus::NoPriorRecord);
    }

    #[tokio::test]
    async fn test_lookups_do_not_write() {
        let db = EvaluationDb::open_in_memory().await.unwrap();
        evaluate_at(&db, "2016-01-01T13:00:00Z", graded("A", &["10.0.0.1"])).await;
        let current = evaluate_at(&db, "2016-01-01T14:30:00Z", graded("B", &["10.0.0.1"])).await;
        let before = db.list_recent_evaluations().await.unwrap();

        have_servers_changed(&db, &current, hour()).await.unwrap();
        previous_grade(&db, &current, hour()).await.unwrap();

        assert_eq!(db.list_recent_evaluations().await.unwrap(), before);
    }
}
