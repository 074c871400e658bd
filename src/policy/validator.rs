/*!
 * Policy Validation
 * Consistency checks, compatibility rules, and recommended defaults
 */

use super::types::{
    Permissions, PluginExecutionKind, ResourceLimits, SecurityPolicy,
};
use crate::errors::{PolicyError, PolicyResult};

/// Check a policy for internal consistency
///
/// Fails if any resource limit is zero, an allowed directory is not an
/// absolute path, or a host pattern is malformed.
pub fn validate_policy(policy: &SecurityPolicy) -> PolicyResult<()> {
    validate_limits(&policy.limits)?;

    for dir in &policy.permissions.allowed_directories {
        if !dir.is_absolute() {
            return Err(PolicyError::RelativeDirectory(dir.display().to_string()));
        }
    }

    for host in &policy.permissions.allowed_hosts {
        validate_host_pattern(host)?;
    }

    Ok(())
}

fn validate_limits(limits: &ResourceLimits) -> PolicyResult<()> {
    let fields: [(&str, u64); 6] = [
        ("max_cpu_time_ms", limits.max_cpu_time_ms),
        ("max_memory_mb", limits.max_memory_mb),
        ("max_disk_space_mb", limits.max_disk_space_mb),
        ("max_open_files", u64::from(limits.max_open_files)),
        (
            "max_network_connections",
            u64::from(limits.max_network_connections),
        ),
        ("execution_timeout_ms", limits.execution_timeout_ms),
    ];

    for (name, value) in fields {
        if value == 0 {
            return Err(PolicyError::NonPositiveLimit(name.to_string()));
        }
    }

    Ok(())
}

/// Validate a host allow-list entry
///
/// Accepted forms: an exact host name, `*`, or a single leading `*.` label.
/// A `*` anywhere else is rejected.
fn validate_host_pattern(pattern: &str) -> PolicyResult<()> {
    let invalid = || PolicyError::InvalidHostPattern(pattern.to_string());

    if pattern.is_empty() || pattern.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    if pattern == "*" {
        return Ok(());
    }

    let rest = pattern.strip_prefix("*.").unwrap_or(pattern);
    if rest.is_empty() || rest.contains('*') {
        return Err(invalid());
    }

    Ok(())
}

/// Canonical sensitive-call names guarded by each capability flag
///
/// Used by the compatibility check: a flag that grants an operation family
/// contradicts a policy that globally blocks the family's API name.
fn granted_api_names(permissions: &Permissions) -> Vec<&'static str> {
    let mapping: [(bool, &'static str); 7] = [
        (permissions.allow_file_system_read, "read"),
        (permissions.allow_file_system_write, "write"),
        (permissions.allow_network_access, "connect"),
        (permissions.allow_process_creation, "exec"),
        (permissions.allow_system_calls, "syscall"),
        (permissions.allow_registry_access, "registry"),
        (permissions.allow_environment_access, "getenv"),
    ];

    mapping
        .into_iter()
        .filter_map(|(granted, api)| granted.then_some(api))
        .collect()
}

/// Check whether two policies can coexist or be merged
///
/// Differing security levels never make policies incompatible. The pair is
/// incompatible only when structurally contradictory: one policy's flags
/// grant an operation family whose canonical API name the other globally
/// blocks.
pub fn is_policy_compatible(a: &SecurityPolicy, b: &SecurityPolicy) -> bool {
    !blocks_granted(a, b) && !blocks_granted(b, a)
}

fn blocks_granted(granter: &SecurityPolicy, blocker: &SecurityPolicy) -> bool {
    granted_api_names(&granter.permissions)
        .iter()
        .any(|api| blocker.permissions.blocked_apis.contains(*api))
}

/// Recommended default policy for a plugin execution kind
///
/// Scripted plugins get a policy at least as strict as native ones; scripts
/// offer weaker ahead-of-time verifiability.
pub fn recommended_policy(kind: PluginExecutionKind) -> SecurityPolicy {
    match kind {
        PluginExecutionKind::Native => SecurityPolicy::limited(),
        PluginExecutionKind::Script(_) => SecurityPolicy::sandboxed(),
    }
}
