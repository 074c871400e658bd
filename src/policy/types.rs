/*!
 * Policy Types
 * Declarative description of what a sandbox allows
 */

use crate::core::serde::is_empty_vec;
use crate::errors::{PolicyError, PolicyResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

/// Sandbox security classification, ordered from most to least trusting
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum SandboxSecurityLevel {
    Unrestricted,
    Limited,
    #[default]
    Sandboxed,
    Strict,
}

impl std::fmt::Display for SandboxSecurityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            SandboxSecurityLevel::Unrestricted => write!(f, "unrestricted"),
            SandboxSecurityLevel::Limited => write!(f, "limited"),
            SandboxSecurityLevel::Sandboxed => write!(f, "sandboxed"),
            SandboxSecurityLevel::Strict => write!(f, "strict"),
        }
    }
}

/// Resource ceilings enforced on a sandboxed plugin
///
/// Every field is a hard positive ceiling; zero is rejected at validation
/// time, never clamped or treated as unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ResourceLimits {
    pub max_cpu_time_ms: u64,
    pub max_memory_mb: u64,
    pub max_disk_space_mb: u64,
    pub max_open_files: u32,
    pub max_network_connections: u32,
    pub execution_timeout_ms: u64,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            max_cpu_time_ms: 60_000, // 1 minute
            max_memory_mb: 256,
            max_disk_space_mb: 512,
            max_open_files: 256,
            max_network_connections: 32,
            execution_timeout_ms: 120_000, // 2 minutes
        }
    }
}

impl ResourceLimits {
    /// Generous ceilings for trusted plugins
    #[must_use]
    pub const fn generous() -> Self {
        Self {
            max_cpu_time_ms: 3_600_000, // 1 hour
            max_memory_mb: 4_096,
            max_disk_space_mb: 16_384,
            max_open_files: 4_096,
            max_network_connections: 512,
            execution_timeout_ms: 3_600_000,
        }
    }

    /// Tight ceilings for scripted plugins
    #[must_use]
    pub const fn restricted() -> Self {
        Self {
            max_cpu_time_ms: 30_000, // 30 seconds
            max_memory_mb: 128,
            max_disk_space_mb: 128,
            max_open_files: 64,
            max_network_connections: 8,
            execution_timeout_ms: 60_000,
        }
    }

    /// Minimal ceilings for untrusted plugins
    #[must_use]
    pub const fn minimal() -> Self {
        Self {
            max_cpu_time_ms: 5_000, // 5 seconds
            max_memory_mb: 32,
            max_disk_space_mb: 16,
            max_open_files: 16,
            max_network_connections: 1,
            execution_timeout_ms: 10_000,
        }
    }

    #[inline]
    #[must_use]
    pub fn with_cpu_time_ms(mut self, ms: u64) -> Self {
        self.max_cpu_time_ms = ms;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_memory_mb(mut self, mb: u64) -> Self {
        self.max_memory_mb = mb;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_disk_space_mb(mut self, mb: u64) -> Self {
        self.max_disk_space_mb = mb;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_open_files(mut self, count: u32) -> Self {
        self.max_open_files = count;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_network_connections(mut self, count: u32) -> Self {
        self.max_network_connections = count;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_execution_timeout_ms(mut self, ms: u64) -> Self {
        self.execution_timeout_ms = ms;
        self
    }
}

/// Capability flags and allow-lists for a sandbox
///
/// Empty allow-lists place no additional restriction; the matching boolean
/// flag is the gate. `blocked_apis` is independent of and additional to the
/// capability flags.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Permissions {
    #[serde(default)]
    pub allow_file_system_read: bool,
    #[serde(default)]
    pub allow_file_system_write: bool,
    #[serde(default)]
    pub allow_network_access: bool,
    #[serde(default)]
    pub allow_process_creation: bool,
    #[serde(default)]
    pub allow_system_calls: bool,
    #[serde(default)]
    pub allow_registry_access: bool,
    #[serde(default)]
    pub allow_environment_access: bool,
    #[serde(default, skip_serializing_if = "is_empty_vec")]
    pub allowed_directories: Vec<PathBuf>,
    #[serde(default, skip_serializing_if = "is_empty_vec")]
    pub allowed_hosts: Vec<String>,
    #[serde(default, skip_serializing_if = "HashSet::is_empty")]
    pub blocked_apis: HashSet<String>,
}

impl Permissions {
    /// All capability flags denied, no allow-lists
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// All capability flags granted, no allow-lists
    #[must_use]
    pub fn all() -> Self {
        Self {
            allow_file_system_read: true,
            allow_file_system_write: true,
            allow_network_access: true,
            allow_process_creation: true,
            allow_system_calls: true,
            allow_registry_access: true,
            allow_environment_access: true,
            allowed_directories: Vec::new(),
            allowed_hosts: Vec::new(),
            blocked_apis: HashSet::new(),
        }
    }

    /// Add an allowed directory prefix
    pub fn allow_directory(&mut self, path: PathBuf) {
        self.allowed_directories.push(path);
    }

    /// Add an allowed host pattern
    pub fn allow_host(&mut self, host: impl Into<String>) {
        self.allowed_hosts.push(host.into());
    }

    /// Block a sensitive API by name
    pub fn block_api(&mut self, api: impl Into<String>) {
        self.blocked_apis.insert(api.into());
    }
}

/// Named security policy aggregating level, limits, and permissions
///
/// Identity is by `policy_name` within a registry; a later registration under
/// the same name replaces the earlier one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SecurityPolicy {
    pub policy_name: String,
    #[serde(default)]
    pub description: String,
    pub level: SandboxSecurityLevel,
    #[serde(default)]
    pub limits: ResourceLimits,
    #[serde(default)]
    pub permissions: Permissions,
}

impl SecurityPolicy {
    pub fn new(name: impl Into<String>, level: SandboxSecurityLevel) -> Self {
        Self {
            policy_name: name.into(),
            description: String::new(),
            level,
            limits: ResourceLimits::default(),
            permissions: Permissions::none(),
        }
    }

    /// Everything permitted (for fully trusted plugins)
    #[must_use]
    pub fn unrestricted() -> Self {
        Self {
            policy_name: "unrestricted".to_string(),
            description: "Full access for trusted plugins".to_string(),
            level: SandboxSecurityLevel::Unrestricted,
            limits: ResourceLimits::generous(),
            permissions: Permissions::all(),
        }
    }

    /// File-system and network access, no process or system-call rights
    #[must_use]
    pub fn limited() -> Self {
        Self {
            policy_name: "limited".to_string(),
            description: "File and network access without process control".to_string(),
            level: SandboxSecurityLevel::Limited,
            limits: ResourceLimits::default(),
            permissions: Permissions {
                allow_file_system_read: true,
                allow_file_system_write: true,
                allow_network_access: true,
                allow_environment_access: true,
                ..Permissions::none()
            },
        }
    }

    /// Read-only file access within allowed directories
    #[must_use]
    pub fn sandboxed() -> Self {
        Self {
            policy_name: "sandboxed".to_string(),
            description: "Read-only file access, everything else denied".to_string(),
            level: SandboxSecurityLevel::Sandboxed,
            limits: ResourceLimits::restricted(),
            permissions: Permissions {
                allow_file_system_read: true,
                ..Permissions::none()
            },
        }
    }

    /// Everything denied
    #[must_use]
    pub fn strict() -> Self {
        Self {
            policy_name: "strict".to_string(),
            description: "All capabilities denied".to_string(),
            level: SandboxSecurityLevel::Strict,
            limits: ResourceLimits::minimal(),
            permissions: Permissions::none(),
        }
    }

    /// Parse a policy from a JSON document
    ///
    /// Unknown fields are ignored; missing allow-lists default to empty.
    pub fn from_json(document: &str) -> PolicyResult<Self> {
        serde_json::from_str(document).map_err(|e| PolicyError::Malformed(e.to_string()))
    }

    /// Serialize the policy to a JSON document
    pub fn to_json(&self) -> PolicyResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| PolicyError::Malformed(e.to_string()))
    }
}

/// How a plugin executes, used to pick a recommended policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "runtime")]
pub enum PluginExecutionKind {
    /// Ahead-of-time compiled plugin binary
    Native,
    /// Plugin running inside a script interpreter
    Script(ScriptRuntime),
}

/// Interpreter hosting a scripted plugin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptRuntime {
    Lua,
    Python,
    JavaScript,
    Wasm,
}
