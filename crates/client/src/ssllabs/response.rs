//! SSL Labs `analyze` response types and normalization.

use serde::Deserialize;
use sslwatch_core::{Evaluation, Server, worst_grade};

use super::SslLabsError;

/// Raw `analyze` response. Only the members the evaluation needs.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub status_message: Option<String>,
    #[serde(default)]
    pub endpoints: Option<Vec<Endpoint>>,
}

/// One endpoint entry of an assessment.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub grade: Option<String>,
}

/// Assessment state reported in `status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssessmentStatus {
    InProgress,
    Down,
    Ready,
}

impl AssessmentStatus {
    /// `DNS` and `IN_PROGRESS` are still running, `ERROR` means the host
    /// could not be assessed. Anything else is treated as finished.
    pub fn from_api(status: &str) -> Self {
        match status {
            "DNS" | "IN_PROGRESS" => AssessmentStatus::InProgress,
            "ERROR" => AssessmentStatus::Down,
            _ => AssessmentStatus::Ready,
        }
    }
}

impl AnalyzeResponse {
    /// Convert to an unsaved evaluation.
    ///
    /// Endpoints without an address are skipped; endpoints without a grade
    /// are kept with an empty grade, which makes the overall grade ungraded.
    pub fn into_evaluation(self) -> Result<Evaluation, SslLabsError> {
        let status = self.status.as_deref().ok_or(SslLabsError::MissingField("status"))?;

        let mut evaluation = Evaluation::default();
        match AssessmentStatus::from_api(status) {
            AssessmentStatus::InProgress => evaluation.in_progress = true,
            AssessmentStatus::Down => {
                tracing::debug!(message = ?self.status_message, "assessment reported error");
                evaluation.is_down = true;
            }
            AssessmentStatus::Ready => {
                let endpoints = self.endpoints.ok_or(SslLabsError::MissingField("endpoints"))?;
                evaluation.servers = endpoints
                    .into_iter()
                    .filter_map(|e| {
                        let address = e.ip_address?;
                        Some(Server::new(address, e.grade.unwrap_or_default()))
                    })
                    .collect();
                evaluation.ssl_grade = worst_grade(&evaluation.servers);
            }
        }

        Ok(evaluation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sslwatch_core::UNGRADED;

    fn parse(json: &str) -> Result<Evaluation, SslLabsError> {
        serde_json::from_str::<AnalyzeResponse>(json).unwrap().into_evaluation()
    }

    #[test]
    fn test_in_progress_statuses() {
        for status in ["DNS", "IN_PROGRESS"] {
            let e = parse(&format!(r#"{{"host":"example.com","status":"{status}"}}"#)).unwrap();
            assert!(e.in_progress);
            assert!(!e.is_down);
            assert!(e.servers.is_empty());
            assert_eq!(e.ssl_grade, "");
        }
    }

    #[test]
    fn test_error_status_is_down() {
        let e = parse(r#"{"status":"ERROR","statusMessage":"Unable to resolve domain name"}"#).unwrap();
        assert!(e.is_down);
        assert!(!e.in_progress);
        assert!(e.servers.is_empty());
    }

    #[test]
    fn test_ready_aggregates_worst_grade() {
        let e = parse(
            r#"{"status":"READY","endpoints":[
                {"ipAddress":"34.193.69.252","grade":"A+"},
                {"ipAddress":"34.193.204.92","grade":"B"},
                {"ipAddress":"2600:1f18::1","grade":"A"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(e.ssl_grade, "B");
        assert_eq!(e.servers.len(), 3);
        assert_eq!(e.servers[0].address, "34.193.69.252");
        assert_eq!(e.servers[1].ssl_grade, "B");
        assert!(e.servers.iter().all(|s| s.country.is_empty() && s.owner.is_empty()));
    }

    #[test]
    fn test_missing_endpoint_grade_is_ungraded() {
        let e = parse(
            r#"{"status":"READY","endpoints":[
                {"ipAddress":"1.2.3.4","grade":"A"},
                {"ipAddress":"1.2.3.5","statusMessage":"Unable to connect to the server"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(e.ssl_grade, UNGRADED);
        assert_eq!(e.servers[1].ssl_grade, "");
    }

    #[test]
    fn test_endpoint_without_address_is_skipped() {
        let e = parse(r#"{"status":"READY","endpoints":[{"grade":"A"},{"ipAddress":"1.2.3.4","grade":"C"}]}"#)
            .unwrap();
        assert_eq!(e.servers.len(), 1);
        assert_eq!(e.ssl_grade, "C");
    }

    #[test]
    fn test_missing_status() {
        let err = parse(r#"{"host":"example.com"}"#).unwrap_err();
        assert!(matches!(err, SslLabsError::MissingField("status")));
    }

    #[test]
    fn test_ready_without_endpoints() {
        let err = parse(r#"{"status":"READY"}"#).unwrap_err();
        assert!(matches!(err, SslLabsError::MissingField("endpoints")));
    }

    #[test]
    fn test_ready_with_no_endpoints_is_ungraded() {
        let e = parse(r#"{"status":"READY","endpoints":[]}"#).unwrap();
        assert!(e.servers.is_empty());
        assert_eq!(e.ssl_grade, UNGRADED);
    }
}
