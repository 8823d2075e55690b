//! SSRF (Server-Side Request Forgery) protection.
//!
//! The homepage inspector fetches arbitrary user-supplied domains, so every
//! host is resolved first and all of its addresses must be public.

use std::net::{IpAddr, SocketAddr};

/// Error type for SSRF validation failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SsrfError {
    #[error("blocked IP: {0} (private/reserved)")]
    BlockedIp(IpAddr),

    #[error("DNS resolution failed: {0}")]
    DnsError(String),

    #[error("no addresses for host: {0}")]
    NoAddresses(String),
}

/// Check if an IP address is private, reserved, or otherwise blocked.
///
/// This covers:
/// - Loopback addresses (127.0.0.0/8, ::1)
/// - RFC 1918 private ranges (10/8, 172.16/12, 192.168/16)
/// - Carrier-grade NAT (100.64/10)
/// - Link-local addresses (169.254/16, fe80::/10)
/// - Multicast, broadcast and unspecified addresses
/// - IPv6 unique local (fc00::/7)
/// - IPv4-mapped IPv6 addresses of any of the above
pub fn is_private_or_reserved(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            let octets = v4.octets();
            v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_multicast()
                || v4.is_broadcast()
                || v4.is_unspecified()
                || octets[0] == 0
                || (octets[0] == 100 && (octets[1] & 0xc0) == 64)
        }
        IpAddr::V6(v6) => {
            if let Some(mapped) = v6.to_ipv4_mapped() {
                return is_private_or_reserved(IpAddr::V4(mapped));
            }
            v6.is_loopback()
                || v6.is_multicast()
                || v6.is_unspecified()
                || (v6.segments()[0] & 0xfe00) == 0xfc00
                || (v6.segments()[0] & 0xffc0) == 0xfe80
        }
    }
}

/// Validate that an IP address is not private or reserved.
pub fn validate_ip(ip: IpAddr) -> Result<(), SsrfError> {
    if is_private_or_reserved(ip) { Err(SsrfError::BlockedIp(ip)) } else { Ok(()) }
}

/// Resolve `host:port` and require every answer to be public.
pub async fn resolve_public(host: &str, port: u16) -> Result<Vec<SocketAddr>, SsrfError> {
    let addrs: Vec<SocketAddr> = tokio::net::lookup_host((host, port))
        .await
        .map_err(|e| SsrfError::DnsError(e.to_string()))?
        .collect();

    if addrs.is_empty() {
        return Err(SsrfError::NoAddresses(host.to_string()));
    }

    for addr in &addrs {
        validate_ip(addr.ip())?;
    }

    Ok(addrs)
}
