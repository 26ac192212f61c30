//! Client-network gating.
//!
//! The kiosk only works from inside the space's WiFi, so the service checks
//! the caller's address against a CIDR allow-list. The client IP is the
//! first `X-Forwarded-For` entry, then `X-Real-IP`, then a loopback
//! fallback for direct connections.

use axum::http::HeaderMap;
use ipnet::IpNet;
use std::net::IpAddr;

/// The raw client address string from proxy headers, if any header is set.
///
/// Returns the first comma-separated `X-Forwarded-For` entry untouched, so
/// a malformed value can still be rejected with a 400 rather than silently
/// replaced.
#[must_use]
pub fn raw_client_ip(headers: &HeaderMap) -> Option<String> {
    if let Some(forwarded) = headers.get("X-Forwarded-For") {
        if let Ok(value) = forwarded.to_str() {
            if let Some(first) = value.split(',').next() {
                return Some(first.trim().to_string());
            }
        }
    }
    if let Some(real_ip) = headers.get("X-Real-IP") {
        if let Ok(value) = real_ip.to_str() {
            return Some(value.trim().to_string());
        }
    }
    None
}

/// True when the address belongs to one of the allowed networks.
#[must_use]
pub fn is_allowed(ip: IpAddr, allowed: &[IpNet]) -> bool {
    allowed.iter().any(|net| net.contains(&ip))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn nets(specs: &[&str]) -> Vec<IpNet> {
        specs.iter().map(|s| s.parse().unwrap()).collect()
    }

    #[test]
    fn test_forwarded_for_first_entry_wins() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "X-Forwarded-For",
            HeaderValue::from_static("192.168.0.55, 10.0.0.1"),
        );
        headers.insert("X-Real-IP", HeaderValue::from_static("10.0.0.2"));
        assert_eq!(raw_client_ip(&headers).as_deref(), Some("192.168.0.55"));
    }

    #[test]
    fn test_real_ip_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert("X-Real-IP", HeaderValue::from_static("10.0.0.2"));
        assert_eq!(raw_client_ip(&headers).as_deref(), Some("10.0.0.2"));
    }

    #[test]
    fn test_no_headers() {
        assert_eq!(raw_client_ip(&HeaderMap::new()), None);
    }

    #[test]
    fn test_malformed_value_is_passed_through() {
        let mut headers = HeaderMap::new();
        headers.insert("X-Forwarded-For", HeaderValue::from_static("not-an-ip"));
        assert_eq!(raw_client_ip(&headers).as_deref(), Some("not-an-ip"));
    }

    #[test]
    fn test_allow_list() {
        let allowed = nets(&["192.168.0.0/24"]);
        assert!(is_allowed("192.168.0.1".parse().unwrap(), &allowed));
        assert!(is_allowed("192.168.0.255".parse().unwrap(), &allowed));
        assert!(!is_allowed("192.168.1.1".parse().unwrap(), &allowed));
        assert!(!is_allowed("127.0.0.1".parse().unwrap(), &allowed));
    }

    #[test]
    fn test_multiple_networks() {
        let allowed = nets(&["192.168.0.0/24", "10.8.0.0/16"]);
        assert!(is_allowed("10.8.3.7".parse().unwrap(), &allowed));
        assert!(!is_allowed("10.9.0.1".parse().unwrap(), &allowed));
    }
}
