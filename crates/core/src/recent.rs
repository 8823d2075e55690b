//! Cached "latest evaluation per domain" list.
//!
//! The list is read from the store at most once per TTL. The clock is
//! injected so expiry can be driven deterministically.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::Error;
use crate::model::Evaluation;
use crate::store::EvaluationDb;

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

struct Snapshot {
    refreshed_at: DateTime<Utc>,
    evaluations: Vec<Evaluation>,
}

/// TTL cache over [`EvaluationDb::list_recent_evaluations`].
pub struct RecentEvaluations {
    db: EvaluationDb,
    clock: Arc<dyn Clock>,
    ttl: chrono::Duration,
    snapshot: Mutex<Option<Snapshot>>,
}

impl RecentEvaluations {
    pub fn new(db: EvaluationDb, clock: Arc<dyn Clock>, ttl: chrono::Duration) -> Self {
        Self { db, clock, ttl, snapshot: Mutex::new(None) }
    }

    pub fn ttl(&self) -> chrono::Duration {
        self.ttl
    }

    /// Latest evaluation per domain.
    ///
    /// Served from memory while the last refresh is within the TTL and the
    /// cached list is non-empty. A failed refresh leaves the cache as it was.
    pub async fn list(&self) -> Result<Vec<Evaluation>, Error> {
        let now = self.clock.now();
        let mut snapshot = self.snapshot.lock().await;

        if let Some(cached) = snapshot.as_ref()
            && !cached.evaluations.is_empty()
            && cached.refreshed_at + self.ttl >= now
        {
            tracing::debug!(count = cached.evaluations.len(), "recent evaluations cache hit");
            return Ok(cached.evaluations.clone());
        }

        let evaluations = self.db.list_recent_evaluations().await?;
        tracing::debug!(count = evaluations.len(), "refreshed recent evaluations");
        *snapshot = Some(Snapshot { refreshed_at: now, evaluations: evaluations.clone() });
        Ok(evaluations)
    }

    /// Drop the cached list so the next call re-reads the store.
    pub async fn invalidate(&self) {
        *self.snapshot.lock().await = None;
    }
}
