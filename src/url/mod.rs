//! URL safety module for Geo-Lens
//!
//! Provides SSRF-safe URL validation: scheme normalization, hostname
//! denylisting, blocked-address-range checks for IP literals, and a
//! DNS-resolution recheck that defeats rebinding of innocuous hostnames.

mod ranges;
mod validator;

pub use ranges::{is_blocked_ipv4, is_blocked_ipv6};
pub use validator::{normalize_input, validate_url, ValidationError};
