//! Interfaces to the slow external collaborators.
//!
//! The decision engine and report assembly depend only on these traits; the
//! HTTP implementations live in `sslwatch-client`.

use crate::Error;
use crate::model::Evaluation;

/// TLS grading probe.
#[async_trait::async_trait]
pub trait Evaluator: Send + Sync {
    /// Grade `domain`.
    ///
    /// Must report `in_progress` while grading is ongoing and `is_down` with no
    /// servers when the host is unreachable. Otherwise the result carries the
    /// aggregated grade and a non-empty server list without country or owner.
    /// `domain` and `evaluation_hour` are stamped by the caller.
    async fn evaluate(&self, domain: &str) -> Result<Evaluation, Error>;
}

/// Homepage metadata lookups.
#[async_trait::async_trait]
pub trait PageInspector: Send + Sync {
    /// Favicon reference of the domain's homepage, if it declares one.
    async fn icon(&self, domain: &str) -> Result<Option<String>, Error>;

    /// Text of the homepage `<title>`, if present.
    async fn title(&self, domain: &str) -> Result<Option<String>, Error>;
}

/// Per-address ownership lookups.
#[async_trait::async_trait]
pub trait IpInspector: Send + Sync {
    async fn country(&self, address: &str) -> Result<String, Error>;

    async fn owner(&self, address: &str) -> Result<String, Error>;
}
