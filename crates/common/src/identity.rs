//! Uploader identity derived from the connection's source address

use std::net::SocketAddr;

const IPV4_MAPPED_PREFIX: &str = "::ffff:";

/// Canonical identity for a raw address string.
///
/// Strips an IPv4-mapped IPv6 prefix so `::ffff:10.0.0.5` and `10.0.0.5`
/// resolve to the same identity. Returns `None` for an empty address.
pub fn normalize_ip(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let ip = match trimmed.get(..IPV4_MAPPED_PREFIX.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(IPV4_MAPPED_PREFIX) => {
            &trimmed[IPV4_MAPPED_PREFIX.len()..]
        }
        _ => trimmed,
    };

    if ip.is_empty() {
        None
    } else {
        Some(ip.to_string())
    }
}

/// Identity of a connection peer; forwarding headers are not consulted
pub fn identity_from_peer(peer: Option<SocketAddr>) -> Option<String> {
    peer.and_then(|addr| normalize_ip(&addr.ip().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_ipv4() {
        assert_eq!(normalize_ip("10.0.0.5").as_deref(), Some("10.0.0.5"));
    }

    #[test]
    fn test_mapped_ipv6_prefix_is_stripped() {
        assert_eq!(normalize_ip("::ffff:10.0.0.5").as_deref(), Some("10.0.0.5"));
        assert_eq!(normalize_ip("::FFFF:192.168.1.2").as_deref(), Some("192.168.1.2"));
    }

    #[test]
    fn test_native_ipv6_is_kept() {
        assert_eq!(normalize_ip("fe80::1").as_deref(), Some("fe80::1"));
        assert_eq!(normalize_ip("::1").as_deref(), Some("::1"));
    }

    #[test]
    fn test_empty_is_none() {
        assert_eq!(normalize_ip(""), None);
        assert_eq!(normalize_ip("   "), None);
        assert_eq!(normalize_ip("::ffff:"), None);
    }

    #[test]
    fn test_identity_from_peer() {
        let v4: SocketAddr = "10.0.0.5:51234".parse().unwrap();
        assert_eq!(identity_from_peer(Some(v4)).as_deref(), Some("10.0.0.5"));

        let mapped: SocketAddr = "[::ffff:10.0.0.7]:443".parse().unwrap();
        assert_eq!(identity_from_peer(Some(mapped)).as_deref(), Some("10.0.0.7"));

        assert_eq!(identity_from_peer(None), None);
    }
}
