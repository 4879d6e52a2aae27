//! Recognizer endpoint URL validation
//!
//! Endpoints must be `ws://` or `wss://` URLs with a host. Plaintext `ws://`
//! is accepted because Vosk servers usually run on the local network, but a
//! warning is logged when such a URL points at a public IP address.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use thiserror::Error;
use tracing::warn;
use url::{Host, Url};

/// Errors that can occur during URL validation
#[derive(Debug, Error)]
pub enum UrlValidationError {
    #[error("Invalid URL format: {0}")]
    InvalidFormat(#[from] url::ParseError),

    #[error("URL scheme must be ws or wss, got: {0}")]
    UnsupportedScheme(String),

    #[error("URL must have a host")]
    MissingHost,
}

/// Checks if an IPv4 address is private/internal
///
/// Covers loopback, RFC 1918, link-local, broadcast, unspecified,
/// documentation, CGNAT (100.64.0.0/10) and benchmarking (198.18.0.0/15).
pub fn is_private_ipv4(ip: &Ipv4Addr) -> bool {
    if ip.is_loopback()
        || ip.is_private()
        || ip.is_link_local()
        || ip.is_broadcast()
        || ip.is_unspecified()
        || ip.is_documentation()
    {
        return true;
    }
    let octets = ip.octets();
    // Shared address space 100.64.0.0/10
    if octets[0] == 100 && (octets[1] & 0xC0) == 64 {
        return true;
    }
    octets[0] == 198 && (octets[1] == 18 || octets[1] == 19)
}

/// Checks if an IPv6 address is private/internal
///
/// Covers loopback, unspecified, link-local (fe80::/10), unique local
/// (fc00::/7), documentation (2001:db8::/32) and IPv4-mapped private
/// addresses.
pub fn is_private_ipv6(ip: &Ipv6Addr) -> bool {
    if ip.is_loopback() || ip.is_unspecified() {
        return true;
    }
    let segments = ip.segments();
    if segments[0] & 0xFFC0 == 0xFE80 || segments[0] & 0xFE00 == 0xFC00 {
        return true;
    }
    if segments[0] == 0x2001 && segments[1] == 0x0DB8 {
        return true;
    }
    ip.to_ipv4_mapped()
        .is_some_and(|ipv4| is_private_ipv4(&ipv4))
}

/// Checks if an IP address is private/internal
pub fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(ipv4) => is_private_ipv4(ipv4),
        IpAddr::V6(ipv6) => is_private_ipv6(ipv6),
    }
}

/// Whether the URL host is a hostname or private IP literal.
///
/// Hostnames are not resolved; only IP literals can be classified as public.
fn is_local_host(host: &Host<&str>) -> bool {
    match host {
        Host::Domain(domain) => {
            // Bare hostnames and mDNS names stay on the local network
            !domain.contains('.') || domain.ends_with(".local")
        }
        Host::Ipv4(ip) => is_private_ipv4(ip),
        Host::Ipv6(ip) => is_private_ipv6(ip),
    }
}

/// Validates a recognizer websocket URL
///
/// # Errors
/// * `InvalidFormat` when the string does not parse
/// * `UnsupportedScheme` for anything other than `ws`/`wss`
/// * `MissingHost` when the URL has no host
pub fn validate_websocket_url(url_str: &str) -> Result<Url, UrlValidationError> {
    let url = Url::parse(url_str.trim())?;

    match url.scheme() {
        "ws" | "wss" => {}
        other => return Err(UrlValidationError::UnsupportedScheme(other.to_string())),
    }

    let host = url.host().ok_or(UrlValidationError::MissingHost)?;
    if url.scheme() == "ws" && !is_local_host(&host) {
        warn!(
            "Recognizer endpoint {} uses unencrypted ws:// to a non-local host",
            url
        );
    }

    Ok(url)
}
