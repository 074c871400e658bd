/*!
 * Sandbox Traits
 * Abstractions between the registry, the enforcer, and host observers
 */

use crate::enforcer::events::SecurityEvent;
use crate::errors::SandboxResult;
use crate::policy::SecurityPolicy;
use crate::sandbox::PluginSandbox;
use std::sync::Arc;

/// Host-side notification sink
///
/// Callbacks run synchronously on the thread performing the triggering
/// operation; a violation is recorded and delivered before the validating
/// call returns. Consumers needing cross-thread delivery requeue themselves.
pub trait SandboxObserver: Send + Sync {
    /// A sandbox was created and registered
    fn on_sandbox_created(&self, _id: &str) {}

    /// A sandbox was removed and its isolation resources released
    fn on_sandbox_removed(&self, _id: &str) {}

    /// An operation was denied
    fn on_security_violation(&self, _event: &SecurityEvent) {}

    /// Repeated denials crossed the suspicious-activity threshold
    fn on_suspicious_activity(&self, _details: &str) {}
}

/// Sandbox registry interface
pub trait SandboxRegistry: Send + Sync {
    /// Create and register a sandbox under a unique id
    fn create_sandbox(&self, id: &str, policy: SecurityPolicy)
        -> SandboxResult<Arc<PluginSandbox>>;

    /// Look up a sandbox; `None` for unknown ids, never an error
    fn get_sandbox(&self, id: &str) -> Option<Arc<PluginSandbox>>;

    /// Remove a sandbox; no-op for unknown ids
    fn remove_sandbox(&self, id: &str);

    /// Ids of all currently active sandboxes
    fn get_active_sandboxes(&self) -> Vec<String>;

    /// Remove every active sandbox
    fn shutdown_all(&self);
}

/// Named policy template store
pub trait PolicyStore: Send + Sync {
    /// Register a policy under a name; a later registration replaces an
    /// earlier one
    fn register_policy(&self, name: &str, policy: SecurityPolicy);

    /// Fetch a registered policy by name
    fn get_policy(&self, name: &str) -> SandboxResult<SecurityPolicy>;

    /// Names of all registered policies
    fn get_registered_policies(&self) -> Vec<String>;
}
