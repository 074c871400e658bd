/*!
 * Isolation Tests
 * Working directories and environment sets provisioned through the manager
 */

use plugin_sandbox::core::limits::{SANDBOX_ID_VAR, SANDBOX_MARKER_VAR};
use plugin_sandbox::{SandboxManager, SecurityPolicy};

fn manager() -> (tempfile::TempDir, SandboxManager) {
    let root = tempfile::tempdir().unwrap();
    let manager = SandboxManager::with_isolation_root(root.path().to_path_buf());
    (root, manager)
}

#[test]
fn test_sandbox_gets_fresh_directory_under_root() {
    let (root, manager) = manager();

    let sandbox = manager
        .create_sandbox("writer", SecurityPolicy::sandboxed())
        .unwrap();

    let work_dir = sandbox.work_dir().to_path_buf();
    assert!(work_dir.starts_with(root.path()));
    assert!(work_dir.exists());
    assert!(
        work_dir.read_dir().unwrap().next().is_none(),
        "directory starts empty"
    );
}

#[test]
fn test_distinct_sandboxes_get_distinct_directories() {
    let (_root, manager) = manager();

    let a = manager
        .create_sandbox("a", SecurityPolicy::strict())
        .unwrap();
    let b = manager
        .create_sandbox("b", SecurityPolicy::strict())
        .unwrap();

    assert_ne!(a.work_dir(), b.work_dir());
}

#[test]
fn test_removal_cleans_directory() {
    let (_root, manager) = manager();

    let sandbox = manager
        .create_sandbox("cleanup", SecurityPolicy::sandboxed())
        .unwrap();
    let work_dir = sandbox.work_dir().to_path_buf();

    // Plugin leaves files behind; removal still cleans up recursively
    std::fs::write(work_dir.join("scratch.txt"), b"leftover").unwrap();

    manager.remove_sandbox("cleanup");
    assert!(!work_dir.exists());
}

#[test]
fn test_environment_carries_sandbox_markers() {
    let (_root, manager) = manager();

    let sandbox = manager
        .create_sandbox("marked", SecurityPolicy::strict())
        .unwrap();

    let environment = sandbox.environment();
    assert_eq!(environment.get(SANDBOX_MARKER_VAR).map(String::as_str), Some("1"));
    assert_eq!(
        environment.get(SANDBOX_ID_VAR).map(String::as_str),
        Some("marked")
    );
}

#[test]
#[serial_test::serial]
fn test_environment_inheritance_follows_policy() {
    std::env::set_var("PLUGIN_HOST_TOKEN", "secret");

    let (_root, manager) = manager();

    let restricted = manager
        .create_sandbox("restricted", SecurityPolicy::strict())
        .unwrap();
    assert!(
        !restricted.environment().contains_key("PLUGIN_HOST_TOKEN"),
        "restricted sandbox must not inherit host variables"
    );

    let trusted = manager
        .create_sandbox("trusted", SecurityPolicy::unrestricted())
        .unwrap();
    assert_eq!(
        trusted.environment().get("PLUGIN_HOST_TOKEN").map(String::as_str),
        Some("secret")
    );

    std::env::remove_var("PLUGIN_HOST_TOKEN");
}
