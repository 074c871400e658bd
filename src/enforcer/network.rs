/*!
 * Host Pattern Matching
 * Exact and leading-wildcard matching for network allow-lists
 */

/// Check a host against an allow-list of patterns
///
/// An empty allow-list places no host restriction; the capability flag is
/// the gate.
pub fn is_host_allowed(host: &str, allowed_hosts: &[String]) -> bool {
    if allowed_hosts.is_empty() {
        return true;
    }

    allowed_hosts
        .iter()
        .any(|pattern| host_matches(host, pattern))
}

fn host_matches(host: &str, pattern: &str) -> bool {
    if pattern == "*" || pattern == host {
        return true;
    }

    // Wildcard domain matching (e.g., "*.example.com")
    // Matches "api.example.com" but not the bare "example.com"
    if pattern.starts_with("*.") {
        let domain = &pattern[1..]; // Keep the leading dot: ".example.com"
        host.ends_with(domain) && host.len() > domain.len()
    } else {
        false
    }
}
