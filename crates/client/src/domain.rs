//! Domain name normalization for evaluation requests.

use std::net::IpAddr;

/// Error type for domain normalization failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    #[error("empty domain")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("IP addresses cannot be graded, use a host name: {0}")]
    IpLiteral(String),

    #[error("ports are not supported: {0}")]
    Port(u16),

    #[error("invalid domain: {0}")]
    Invalid(String),
}

impl From<DomainError> for sslwatch_core::Error {
    fn from(err: DomainError) -> Self {
        sslwatch_core::Error::InvalidInput(err.to_string())
    }
}

/// Reduce user input to a bare, lowercase host name.
///
/// Accepts `example.com`, `Example.COM.` and full `http(s)` URLs, discarding
/// path, query and fragment. Credentials, ports, IP literals and single-label
/// names are rejected.
pub fn normalize_domain(input: &str) -> Result<String, DomainError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(DomainError::Empty);
    }

    let url_str = if trimmed.contains("://") { trimmed.to_string() } else { format!("http://{trimmed}") };

    let parsed = url::Url::parse(&url_str).map_err(|e| DomainError::Invalid(format!("{trimmed}: {e}")))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(DomainError::UnsupportedScheme(scheme.to_string())),
    }

    if !parsed.username().is_empty() || parsed.password().is_some() {
        return Err(DomainError::Invalid(format!("{trimmed}: credentials are not allowed")));
    }

    if let Some(port) = parsed.port() {
        return Err(DomainError::Port(port));
    }

    let host = match parsed.host() {
        Some(url::Host::Domain(host)) => host.trim_end_matches('.').to_lowercase(),
        Some(url::Host::Ipv4(ip)) => return Err(DomainError::IpLiteral(ip.to_string())),
        Some(url::Host::Ipv6(ip)) => return Err(DomainError::IpLiteral(ip.to_string())),
        None => return Err(DomainError::Invalid(trimmed.to_string())),
    };

    if host.parse::<IpAddr>().is_ok() {
        return Err(DomainError::IpLiteral(host));
    }

    if !host.contains('.') || host.split('.').any(str::is_empty) {
        return Err(DomainError::Invalid(host));
    }

    Ok(host)
}
