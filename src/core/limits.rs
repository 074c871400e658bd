/*!
 * System Limits and Constants
 *
 * Centralized location for subsystem-wide limits and thresholds.
 */

/// Maximum security events retained per enforcer (ring buffer)
/// Bounds memory when a hostile plugin hammers denied operations
/// [SECURITY] The log stays append-only up to this cap; oldest entries fall off
pub const MAX_SECURITY_EVENTS: usize = 10_000;

/// Cumulative denial count that triggers a suspicious-activity notification
/// Fires once per threshold crossing, not per denial
pub const SUSPICIOUS_DENIAL_THRESHOLD: u64 = 10;

/// Marker variable present in every isolated environment
/// Lets plugin code detect it is running under a sandbox
pub const SANDBOX_MARKER_VAR: &str = "PLUGIN_SANDBOX";

/// Variable carrying the owning sandbox id in isolated environments
pub const SANDBOX_ID_VAR: &str = "PLUGIN_SANDBOX_ID";

/// Prefix for isolated working directories under the isolation root
pub const ISOLATED_DIR_PREFIX: &str = "sandbox-";
