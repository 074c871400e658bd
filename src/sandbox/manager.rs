/*!
 * Sandbox Manager
 * Thread-safe registry of named sandboxes and reusable policy templates
 */

use super::instance::PluginSandbox;
use super::isolation::IsolationResources;
use crate::core::serde::is_zero_usize;
use crate::enforcer::SecurityEnforcer;
use crate::errors::{SandboxError, SandboxResult};
use crate::observer::ObserverRegistry;
use crate::policy::{validate_policy, SecurityPolicy};
use crate::traits::{PolicyStore, SandboxObserver, SandboxRegistry};
use ahash::RandomState;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use log::info;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Registry of active sandboxes and named policies
///
/// Explicitly constructed; the host owns its lifetime and hands clones to
/// whoever loads or unloads plugins. Cloning yields another handle onto the
/// same registries. All operations are synchronous; notifications fire on
/// the calling thread.
#[derive(Clone)]
pub struct SandboxManager {
    sandboxes: Arc<DashMap<String, Arc<PluginSandbox>, RandomState>>,
    policies: Arc<DashMap<String, SecurityPolicy, RandomState>>,
    observers: ObserverRegistry,
    isolation_root: PathBuf,
    draining: Arc<AtomicBool>,
}

impl SandboxManager {
    /// Create a manager rooted at the system temp directory
    pub fn new() -> Self {
        Self::with_isolation_root(std::env::temp_dir().join("plugin-sandboxes"))
    }

    /// Create a manager that provisions isolated directories under `root`
    pub fn with_isolation_root(root: PathBuf) -> Self {
        let manager = Self {
            sandboxes: Arc::new(DashMap::with_hasher(RandomState::new())),
            policies: Arc::new(DashMap::with_hasher(RandomState::new())),
            observers: ObserverRegistry::new(),
            isolation_root: root,
            draining: Arc::new(AtomicBool::new(false)),
        };

        for policy in [
            SecurityPolicy::unrestricted(),
            SecurityPolicy::limited(),
            SecurityPolicy::sandboxed(),
            SecurityPolicy::strict(),
        ] {
            manager
                .policies
                .insert(policy.policy_name.clone(), policy);
        }

        info!(
            "Sandbox manager initialized with {} default policies",
            manager.policies.len()
        );
        manager
    }

    /// Subscribe a host observer for creation/removal/violation notifications
    pub fn subscribe(&self, observer: Arc<dyn SandboxObserver>) {
        self.observers.subscribe(observer);
    }

    /// Observer registry shared with every enforcer this manager creates
    pub fn observers(&self) -> &ObserverRegistry {
        &self.observers
    }

    /// Create and register a sandbox under a unique id
    ///
    /// Duplicate ids fail with `AlreadyExists`; sandbox ids never overwrite
    /// (policy registration does). A create racing `shutdown_all` loses and
    /// fails with `ShuttingDown`.
    pub fn create_sandbox(
        &self,
        id: &str,
        policy: SecurityPolicy,
    ) -> SandboxResult<Arc<PluginSandbox>> {
        if self.draining.load(Ordering::SeqCst) {
            return Err(SandboxError::ShuttingDown);
        }

        validate_policy(&policy)?;

        let sandbox = match self.sandboxes.entry(id.to_string()) {
            Entry::Occupied(_) => return Err(SandboxError::AlreadyExists(id.to_string())),
            Entry::Vacant(slot) => {
                let isolation =
                    IsolationResources::provision(&policy, id, &self.isolation_root)?;
                let enforcer =
                    Arc::new(SecurityEnforcer::new(policy, self.observers.clone()));
                enforcer.initialize();

                let sandbox = Arc::new(PluginSandbox::new(id, enforcer, isolation));
                slot.insert(sandbox.clone());
                sandbox
            }
        };

        if self.draining.load(Ordering::SeqCst) {
            // Shutdown raced us after the insert; shutdown wins.
            self.sandboxes.remove(id);
            sandbox.deactivate();
            return Err(SandboxError::ShuttingDown);
        }

        info!("Created sandbox {:?}", id);
        self.observers.notify_created(id);
        Ok(sandbox)
    }

    /// Create a sandbox from a registered policy name
    pub fn create_sandbox_with_policy(
        &self,
        id: &str,
        policy_name: &str,
    ) -> SandboxResult<Arc<PluginSandbox>> {
        let policy = self.get_policy(policy_name)?;
        self.create_sandbox(id, policy)
    }

    /// Look up a sandbox; `None` for unknown ids, never an error
    pub fn get_sandbox(&self, id: &str) -> Option<Arc<PluginSandbox>> {
        self.sandboxes.get(id).map(|entry| entry.value().clone())
    }

    /// Remove a sandbox, releasing its isolation resources; unknown ids are
    /// a no-op
    pub fn remove_sandbox(&self, id: &str) {
        if let Some((_, sandbox)) = self.sandboxes.remove(id) {
            sandbox.deactivate();
            info!("Removed sandbox {:?}", id);
            self.observers.notify_removed(id);
        }
    }

    /// Register a policy template; the last registration under a name wins
    pub fn register_policy(&self, name: &str, policy: SecurityPolicy) {
        if self.policies.insert(name.to_string(), policy).is_some() {
            info!("Replaced policy {:?}", name);
        } else {
            info!("Registered policy {:?}", name);
        }
    }

    /// Fetch a registered policy by name
    pub fn get_policy(&self, name: &str) -> SandboxResult<SecurityPolicy> {
        self.policies
            .get(name)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| SandboxError::PolicyNotFound(name.to_string()))
    }

    /// Names of all registered policies
    pub fn get_registered_policies(&self) -> Vec<String> {
        self.policies.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Ids of all currently active sandboxes
    pub fn get_active_sandboxes(&self) -> Vec<String> {
        self.sandboxes.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Remove every active sandbox, one removed-notification per sandbox
    ///
    /// Safe with zero sandboxes and safe to call repeatedly. Creates racing
    /// this call fail with `ShuttingDown` rather than surviving the sweep.
    pub fn shutdown_all(&self) {
        self.draining.store(true, Ordering::SeqCst);

        while !self.sandboxes.is_empty() {
            for id in self.get_active_sandboxes() {
                self.remove_sandbox(&id);
            }
        }

        self.draining.store(false, Ordering::SeqCst);
        info!("All sandboxes shut down");
    }

    /// Registry statistics
    pub fn stats(&self) -> ManagerStats {
        ManagerStats {
            active_sandboxes: self.sandboxes.len(),
            registered_policies: self.policies.len(),
        }
    }
}

impl Default for SandboxManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SandboxRegistry for SandboxManager {
    fn create_sandbox(
        &self,
        id: &str,
        policy: SecurityPolicy,
    ) -> SandboxResult<Arc<PluginSandbox>> {
        SandboxManager::create_sandbox(self, id, policy)
    }

    fn get_sandbox(&self, id: &str) -> Option<Arc<PluginSandbox>> {
        SandboxManager::get_sandbox(self, id)
    }

    fn remove_sandbox(&self, id: &str) {
        SandboxManager::remove_sandbox(self, id)
    }

    fn get_active_sandboxes(&self) -> Vec<String> {
        SandboxManager::get_active_sandboxes(self)
    }

    fn shutdown_all(&self) {
        SandboxManager::shutdown_all(self)
    }
}

impl PolicyStore for SandboxManager {
    fn register_policy(&self, name: &str, policy: SecurityPolicy) {
        SandboxManager::register_policy(self, name, policy)
    }

    fn get_policy(&self, name: &str) -> SandboxResult<SecurityPolicy> {
        SandboxManager::get_policy(self, name)
    }

    fn get_registered_policies(&self) -> Vec<String> {
        SandboxManager::get_registered_policies(self)
    }
}

/// Registry statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ManagerStats {
    #[serde(skip_serializing_if = "is_zero_usize")]
    pub active_sandboxes: usize,
    #[serde(skip_serializing_if = "is_zero_usize")]
    pub registered_policies: usize,
}
