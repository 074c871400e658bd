/*!
 * Sandbox Module
 * Per-plugin isolation contexts and the process-wide registry
 */

pub mod instance;
pub mod isolation;
pub mod manager;

pub use instance::{PluginSandbox, ResourceUsage};
pub use manager::{ManagerStats, SandboxManager};
