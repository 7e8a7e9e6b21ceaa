// ABOUTME: Shared utility functions for Client Watch
// ABOUTME: MAC address normalization

/// Canonical form for MAC identifiers: trimmed, upper-case, ':' separated
pub fn normalize_mac(mac: &str) -> String {
    mac.trim().replace('-', ":").to_ascii_uppercase()
}
