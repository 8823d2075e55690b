//! Evaluation and server records.
//!
//! `evaluation_hour` stays textual on the record so a malformed stored value is
//! surfaced when it is read for a decision, not when the row is loaded.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::Error;

/// One TLS endpoint belonging to an evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Server {
    /// Store-assigned row id; 0 until persisted.
    #[serde(skip)]
    pub id: i64,
    pub address: String,
    pub ssl_grade: String,
    pub country: String,
    pub owner: String,
}

impl Server {
    pub fn new(address: impl Into<String>, ssl_grade: impl Into<String>) -> Self {
        Self { address: address.into(), ssl_grade: ssl_grade.into(), ..Default::default() }
    }

    /// Field equality over the compared tuple, ignoring the row id.
    pub fn same_as(&self, other: &Server) -> bool {
        self.address == other.address
            && self.ssl_grade == other.ssl_grade
            && self.country == other.country
            && self.owner == other.owner
    }
}

/// One grading attempt or result for a domain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Evaluation {
    /// Store-assigned id; 0 means not persisted.
    #[serde(skip)]
    pub id: i64,
    pub domain: String,
    /// RFC 3339 timestamp, see [`format_timestamp`].
    #[serde(rename = "hour")]
    pub evaluation_hour: String,
    pub in_progress: bool,
    pub is_down: bool,
    pub ssl_grade: String,
    pub logo: String,
    pub title: String,
    #[serde(skip)]
    pub servers: Vec<Server>,
}

impl Evaluation {
    pub fn is_persisted(&self) -> bool {
        self.id != 0
    }

    /// Neither in progress nor down.
    pub fn is_complete(&self) -> bool {
        !self.in_progress && !self.is_down
    }

    /// Parse `evaluation_hour`.
    pub fn hour(&self) -> Result<DateTime<Utc>, Error> {
        parse_timestamp(&self.evaluation_hour)
    }

    /// Whether this record is still fresh at `now` for the given window.
    pub fn is_fresh(&self, now: DateTime<Utc>, window: chrono::Duration) -> Result<bool, Error> {
        Ok(self.hour()? + window > now)
    }

    /// Header and server tuples equal, ignoring store ids.
    pub fn same_as(&self, other: &Evaluation) -> bool {
        self.domain == other.domain
            && self.evaluation_hour == other.evaluation_hour
            && self.in_progress == other.in_progress
            && self.is_down == other.is_down
            && self.ssl_grade == other.ssl_grade
            && self.logo == other.logo
            && self.title == other.title
            && servers_match(&self.servers, &other.servers)
    }
}

/// Positional comparison of two server lists.
///
/// Order matters: the same servers in a different order do not match.
pub fn servers_match(a: &[Server], b: &[Server]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_as(y))
}

/// Format an instant in the persisted text form.
///
/// Always UTC with nine fractional digits so the text orders the same way the
/// instants do.
pub fn format_timestamp(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Parse a persisted timestamp. Any RFC 3339 offset is accepted.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| Error::Timestamp { value: value.to_string(), reason: e.to_string() })
}
