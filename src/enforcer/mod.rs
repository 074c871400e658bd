/*!
 * Security Enforcer
 * Per-sandbox permission checks with synchronous violation reporting
 */

pub mod events;
pub mod network;
pub mod path;

use crate::core::limits::SUSPICIOUS_DENIAL_THRESHOLD;
use crate::observer::ObserverRegistry;
use crate::policy::SecurityPolicy;
use arc_swap::ArcSwap;
use events::{EventLog, SecurityEvent, SecurityViolationType};
use log::{debug, warn};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Enforces one active policy at every sensitive-operation interposition point
///
/// Each `validate_*` call returns a boolean; every denial appends exactly one
/// `SecurityEvent` and notifies observers before the call returns. Denial is
/// an expected outcome, not an error.
pub struct SecurityEnforcer {
    policy: ArcSwap<SecurityPolicy>,
    events: EventLog,
    observers: ObserverRegistry,
    initialized: AtomicBool,
    denials: AtomicU64,
}

impl SecurityEnforcer {
    /// Create an enforcer; call `initialize` before validating
    pub fn new(policy: SecurityPolicy, observers: ObserverRegistry) -> Self {
        Self {
            policy: ArcSwap::from_pointee(policy),
            events: EventLog::new(),
            observers,
            initialized: AtomicBool::new(false),
            denials: AtomicU64::new(0),
        }
    }

    /// Activate enforcement; idempotent
    pub fn initialize(&self) -> bool {
        if !self.initialized.swap(true, Ordering::SeqCst) {
            debug!(
                "Security enforcer initialized with policy {:?}",
                self.policy.load().policy_name
            );
        }
        true
    }

    /// Deactivate enforcement; idempotent, a later `initialize` restores it
    pub fn shutdown(&self) {
        if self.initialized.swap(false, Ordering::SeqCst) {
            debug!("Security enforcer shut down");
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Current policy
    pub fn policy(&self) -> Arc<SecurityPolicy> {
        self.policy.load_full()
    }

    /// Replace the active policy without re-creating the enforcer
    pub fn update_policy(&self, policy: SecurityPolicy) {
        debug!("Policy hot-swapped to {:?}", policy.policy_name);
        self.policy.store(Arc::new(policy));
    }

    /// Validate a file read or write
    ///
    /// Denied unless the matching flag is set and the path falls under an
    /// allowed directory (empty allow-list permits any path).
    pub fn validate_file_access(&self, file_path: &Path, is_write: bool) -> bool {
        let policy = self.policy.load();
        let permissions = &policy.permissions;
        let flag = if is_write {
            permissions.allow_file_system_write
        } else {
            permissions.allow_file_system_read
        };

        if self.is_initialized()
            && flag
            && path::is_path_allowed(file_path, &permissions.allowed_directories)
        {
            return true;
        }

        let action = if is_write { "write" } else { "read" };
        self.deny(
            SecurityViolationType::UnauthorizedFileAccess,
            format!("file {} denied", action),
            file_path.display().to_string(),
        )
    }

    /// Validate an outbound connection to a host and port
    pub fn validate_network_access(&self, host: &str, port: u16) -> bool {
        let policy = self.policy.load();
        let permissions = &policy.permissions;

        if self.is_initialized()
            && permissions.allow_network_access
            && network::is_host_allowed(host, &permissions.allowed_hosts)
        {
            return true;
        }

        self.deny(
            SecurityViolationType::UnauthorizedNetworkAccess,
            "network connection denied",
            format!("{}:{}", host, port),
        )
    }

    /// Validate spawning a child process
    pub fn validate_process_creation(&self, executable_path: &Path) -> bool {
        if self.is_initialized() && self.policy.load().permissions.allow_process_creation {
            return true;
        }

        self.deny(
            SecurityViolationType::UnauthorizedProcessCreation,
            "process creation denied",
            executable_path.display().to_string(),
        )
    }

    /// Validate a raw system call
    pub fn validate_system_call(&self, call_name: &str) -> bool {
        if self.is_initialized() && self.policy.load().permissions.allow_system_calls {
            return true;
        }

        self.deny(
            SecurityViolationType::UnauthorizedSystemCall,
            "system call denied",
            call_name,
        )
    }

    /// Validate a call into a sensitive host API
    ///
    /// The blocked-API list is checked independently of the capability
    /// flags; a blocked name is denied even under an otherwise-unrestricted
    /// policy.
    pub fn validate_api_call(&self, api_name: &str) -> bool {
        if self.is_initialized() && !self.policy.load().permissions.blocked_apis.contains(api_name)
        {
            return true;
        }

        self.deny(
            SecurityViolationType::BlockedApiCall,
            "api call blocked",
            api_name,
        )
    }

    /// Snapshot copy of recorded violations
    pub fn get_security_events(&self) -> Vec<SecurityEvent> {
        self.events.snapshot()
    }

    /// Drop all recorded violations
    pub fn clear_security_events(&self) {
        self.events.clear();
    }

    /// Total denials since creation (not reset by `clear_security_events`)
    pub fn denial_count(&self) -> u64 {
        self.denials.load(Ordering::SeqCst)
    }

    /// Record and report a denial; always returns `false`
    fn deny(
        &self,
        violation: SecurityViolationType,
        description: impl Into<String>,
        resource: impl Into<String>,
    ) -> bool {
        let event = SecurityEvent::new(violation, description, resource);
        warn!("Security violation: {} ({})", event.description, event.resource);

        // The event is recorded, then observers run, before the validating
        // call returns.
        self.events.append(event.clone());
        self.observers.notify_violation(&event);

        let total = self.denials.fetch_add(1, Ordering::SeqCst) + 1;
        if total % SUSPICIOUS_DENIAL_THRESHOLD == 0 {
            self.observers.notify_suspicious_activity(&format!(
                "{} security violations recorded",
                total
            ));
        }

        false
    }
}
