/*!
 * Process Isolation Utilities
 * Environment and filesystem resources scoped to one sandbox
 */

use crate::core::limits::{ISOLATED_DIR_PREFIX, SANDBOX_ID_VAR, SANDBOX_MARKER_VAR};
use crate::policy::SecurityPolicy;
use log::{debug, warn};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Derive the environment-variable set for a sandboxed plugin
///
/// The sandbox marker variables are always present. The host environment is
/// inherited only when the policy grants environment access; otherwise only
/// `PATH` survives.
pub fn isolated_environment(
    policy: &SecurityPolicy,
    sandbox_id: &str,
) -> HashMap<String, String> {
    let mut environment: HashMap<String, String> =
        if policy.permissions.allow_environment_access {
            std::env::vars().collect()
        } else {
            std::env::var("PATH")
                .into_iter()
                .map(|path| ("PATH".to_string(), path))
                .collect()
        };

    environment.insert(SANDBOX_MARKER_VAR.to_string(), "1".to_string());
    environment.insert(SANDBOX_ID_VAR.to_string(), sandbox_id.to_string());
    environment
}

/// Create a fresh, empty working directory under `base_path`
pub fn setup_isolated_directory(base_path: &Path) -> io::Result<PathBuf> {
    let dir = base_path.join(format!("{}{}", ISOLATED_DIR_PREFIX, Uuid::new_v4()));
    fs::create_dir_all(&dir)?;
    debug!("Created isolated directory {:?}", dir);
    Ok(dir)
}

/// Recursively remove an isolated directory
///
/// After cleanup the path does not exist; an already-absent path is a no-op.
pub fn cleanup_isolated_resources(path: &Path) -> io::Result<()> {
    if !path.exists() {
        return Ok(());
    }
    fs::remove_dir_all(path)?;
    debug!("Removed isolated directory {:?}", path);
    Ok(())
}

/// Isolation resources owned by exactly one sandbox
#[derive(Debug, Clone)]
pub struct IsolationResources {
    work_dir: PathBuf,
    environment: HashMap<String, String>,
}

impl IsolationResources {
    /// Provision a working directory and environment for a sandbox
    pub fn provision(
        policy: &SecurityPolicy,
        sandbox_id: &str,
        isolation_root: &Path,
    ) -> io::Result<Self> {
        Ok(Self {
            work_dir: setup_isolated_directory(isolation_root)?,
            environment: isolated_environment(policy, sandbox_id),
        })
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn environment(&self) -> &HashMap<String, String> {
        &self.environment
    }

    /// Tear down the working directory
    pub fn release(&self) {
        if let Err(e) = cleanup_isolated_resources(&self.work_dir) {
            warn!("Failed to clean up {:?}: {}", self.work_dir, e);
        }
    }
}
