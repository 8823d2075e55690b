//! Client code for sslwatch.
//!
//! This crate provides the HTTP implementations of the external collaborators
//! the core depends on: the SSL Labs grading probe, the homepage icon/title
//! inspector and the WHOIS country/owner lookups, plus domain normalization
//! and SSRF checks.

pub mod domain;
pub mod page;
pub mod ssllabs;
pub mod ssrf;
pub mod whois;

mod ratelimit;

pub use domain::{DomainError, normalize_domain};
pub use page::{PageClient, PageConfig, PageError};
pub use ssllabs::{SslLabsClient, SslLabsConfig, SslLabsError};
pub use ssrf::SsrfError;
pub use whois::{WhoisClient, WhoisConfig, WhoisError};
