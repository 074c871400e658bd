/*!
 * Plugin Sandbox
 * One enforcer, one set of isolation resources, one usage record per plugin
 */

use super::isolation::IsolationResources;
use crate::enforcer::SecurityEnforcer;
use crate::policy::SecurityPolicy;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, TimestampSeconds};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

/// Snapshot of one sandbox's live resource counters
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ResourceUsage {
    #[serde_as(as = "TimestampSeconds<i64>")]
    pub started_at: SystemTime,
    pub memory_bytes: u64,
    pub cpu_time_ms: u64,
    pub open_handles: u64,
    pub network_connections: u64,
}

/// Live counters; written only by the owning sandbox
#[derive(Debug)]
struct ResourceTracker {
    started_at: SystemTime,
    memory_bytes: AtomicU64,
    cpu_time_ms: AtomicU64,
    open_handles: AtomicU64,
    network_connections: AtomicU64,
}

impl ResourceTracker {
    fn new() -> Self {
        Self {
            started_at: SystemTime::now(),
            memory_bytes: AtomicU64::new(0),
            cpu_time_ms: AtomicU64::new(0),
            open_handles: AtomicU64::new(0),
            network_connections: AtomicU64::new(0),
        }
    }

    fn snapshot(&self) -> ResourceUsage {
        ResourceUsage {
            started_at: self.started_at,
            memory_bytes: self.memory_bytes.load(Ordering::SeqCst),
            cpu_time_ms: self.cpu_time_ms.load(Ordering::SeqCst),
            open_handles: self.open_handles.load(Ordering::SeqCst),
            network_connections: self.network_connections.load(Ordering::SeqCst),
        }
    }
}

fn saturating_decrement(counter: &AtomicU64) {
    let _ = counter.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |v| {
        Some(v.saturating_sub(1))
    });
}

/// Isolation context bound to one running plugin instance
///
/// Owned by exactly one `SandboxManager` entry; it has no independent
/// destruction path and is deactivated when that entry is removed.
pub struct PluginSandbox {
    id: String,
    enforcer: Arc<SecurityEnforcer>,
    isolation: IsolationResources,
    usage: ResourceTracker,
    active: AtomicBool,
}

impl PluginSandbox {
    pub(crate) fn new(
        id: impl Into<String>,
        enforcer: Arc<SecurityEnforcer>,
        isolation: IsolationResources,
    ) -> Self {
        Self {
            id: id.into(),
            enforcer,
            isolation,
            usage: ResourceTracker::new(),
            active: AtomicBool::new(true),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The enforcer guarding this plugin's sensitive operations
    pub fn enforcer(&self) -> &Arc<SecurityEnforcer> {
        &self.enforcer
    }

    /// The enforcer's current policy
    pub fn policy(&self) -> Arc<SecurityPolicy> {
        self.enforcer.policy()
    }

    /// Whether the sandbox is registered and not yet removed
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Isolated working directory scoped to this sandbox
    pub fn work_dir(&self) -> &Path {
        self.isolation.work_dir()
    }

    /// Isolated environment-variable set for plugin execution
    pub fn environment(&self) -> &HashMap<String, String> {
        self.isolation.environment()
    }

    /// Snapshot of the live resource counters
    pub fn resource_usage(&self) -> ResourceUsage {
        self.usage.snapshot()
    }

    /// Record the plugin's current memory footprint (gauge)
    pub fn record_memory_usage(&self, bytes: u64) {
        self.usage.memory_bytes.store(bytes, Ordering::SeqCst);
    }

    /// Accumulate CPU time consumed by the plugin
    pub fn record_cpu_time(&self, ms: u64) {
        self.usage.cpu_time_ms.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn record_handle_opened(&self) {
        self.usage.open_handles.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_handle_closed(&self) {
        saturating_decrement(&self.usage.open_handles);
    }

    pub fn record_connection_opened(&self) {
        self.usage.network_connections.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_connection_closed(&self) {
        saturating_decrement(&self.usage.network_connections);
    }

    /// Deactivate and release isolation resources; idempotent
    pub(crate) fn deactivate(&self) {
        if self.active.swap(false, Ordering::SeqCst) {
            self.enforcer.shutdown();
            self.isolation.release();
        }
    }
}

impl std::fmt::Debug for PluginSandbox {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("PluginSandbox")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .field("work_dir", &self.isolation.work_dir())
            .finish_non_exhaustive()
    }
}
