//! Blocked address-range predicates
//!
//! A scrape target is rejected when it sits in any address space that a
//! server-side fetch must never reach: loopback, RFC 1918 private ranges,
//! link-local/metadata, carrier-grade NAT, documentation ranges,
//! multicast, and reserved space.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Blocked IPv4 ranges as (base, prefix) pairs:
///
/// - 127.0.0.0/8      loopback
/// - 10.0.0.0/8       private class A
/// - 172.16.0.0/12    private class B
/// - 192.168.0.0/16   private class C
/// - 169.254.0.0/16   link-local / cloud metadata
/// - 0.0.0.0/8        "this" network
/// - 100.64.0.0/10    carrier-grade NAT (shared address space)
/// - 192.0.0.0/24     IETF protocol assignments
/// - 192.0.2.0/24     TEST-NET-1
/// - 198.51.100.0/24  TEST-NET-2
/// - 203.0.113.0/24   TEST-NET-3
/// - 224.0.0.0/4      multicast
/// - 240.0.0.0/4      reserved
const BLOCKED_IPV4_RANGES: &[(Ipv4Addr, u32)] = &[
    (Ipv4Addr::new(127, 0, 0, 0), 8),
    (Ipv4Addr::new(10, 0, 0, 0), 8),
    (Ipv4Addr::new(172, 16, 0, 0), 12),
    (Ipv4Addr::new(192, 168, 0, 0), 16),
    (Ipv4Addr::new(169, 254, 0, 0), 16),
    (Ipv4Addr::new(0, 0, 0, 0), 8),
    (Ipv4Addr::new(100, 64, 0, 0), 10),
    (Ipv4Addr::new(192, 0, 0, 0), 24),
    (Ipv4Addr::new(192, 0, 2, 0), 24),
    (Ipv4Addr::new(198, 51, 100, 0), 24),
    (Ipv4Addr::new(203, 0, 113, 0), 24),
    (Ipv4Addr::new(224, 0, 0, 0), 4),
    (Ipv4Addr::new(240, 0, 0, 0), 4),
];

/// Checks whether an IPv4 address falls inside a CIDR range
fn in_range(addr: Ipv4Addr, base: Ipv4Addr, prefix: u32) -> bool {
    let mask = if prefix == 0 {
        0
    } else {
        u32::MAX << (32 - prefix)
    };
    (u32::from(addr) & mask) == (u32::from(base) & mask)
}

/// Returns true if the IPv4 address must not be scraped
pub fn is_blocked_ipv4(addr: Ipv4Addr) -> bool {
    BLOCKED_IPV4_RANGES
        .iter()
        .any(|&(base, prefix)| in_range(addr, base, prefix))
}

/// Returns true if the IPv6 address must not be scraped
///
/// Blocks loopback (::1), unspecified (::), unique-local (fc00::/7),
/// link-local (fe80::/10), and multicast (ff00::/8). An IPv4-mapped
/// address (`::ffff:a.b.c.d`) reaches the embedded IPv4 target, so it
/// is judged by the IPv4 rules instead.
pub fn is_blocked_ipv6(addr: Ipv6Addr) -> bool {
    if let Some(v4) = addr.to_ipv4_mapped() {
        return is_blocked_ipv4(v4);
    }

    if addr.is_loopback() || addr.is_unspecified() {
        return true;
    }

    let first = addr.segments()[0];
    // fc00::/7 — unique local
    if first & 0xfe00 == 0xfc00 {
        return true;
    }
    // fe80::/10 — link-local
    if first & 0xffc0 == 0xfe80 {
        return true;
    }
    // ff00::/8 — multicast
    if first & 0xff00 == 0xff00 {
        return true;
    }

    false
}

/// Returns true if the address (either family) must not be scraped
pub fn is_blocked_addr(addr: IpAddr) -> bool {
    match addr {
        IpAddr::V4(v4) => is_blocked_ipv4(v4),
        IpAddr::V6(v6) => is_blocked_ipv6(v6),
    }
}
