/*!
 * Security Enforcer Tests
 * Denial rules, event recording, and synchronous notification ordering
 */

use plugin_sandbox::core::limits::SUSPICIOUS_DENIAL_THRESHOLD;
use plugin_sandbox::{
    FnObserver, ObserverRegistry, Permissions, SandboxObserver, SandboxSecurityLevel,
    SecurityEnforcer, SecurityEvent, SecurityPolicy, SecurityViolationType,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

fn enforcer_with(policy: SecurityPolicy) -> SecurityEnforcer {
    let enforcer = SecurityEnforcer::new(policy, ObserverRegistry::new());
    enforcer.initialize();
    enforcer
}

fn read_only_policy() -> SecurityPolicy {
    let mut policy = SecurityPolicy::new("read-only", SandboxSecurityLevel::Sandboxed);
    policy.permissions = Permissions {
        allow_file_system_read: true,
        ..Permissions::none()
    };
    policy
}

#[test]
fn test_read_denied_without_flag_records_one_event_per_call() {
    let enforcer = enforcer_with(SecurityPolicy::strict());

    assert!(!enforcer.validate_file_access(Path::new("/tmp/a"), false));
    let events = enforcer.get_security_events();
    assert_eq!(events.len(), 1);
    assert_eq!(
        events[0].violation,
        SecurityViolationType::UnauthorizedFileAccess
    );

    assert!(!enforcer.validate_file_access(Path::new("/tmp/b"), false));
    assert_eq!(enforcer.get_security_events().len(), 2);
}

#[test]
fn test_allowed_directories_gate_reads() {
    let mut policy = read_only_policy();
    policy
        .permissions
        .allow_directory(PathBuf::from("/tmp/sandbox"));
    let enforcer = enforcer_with(policy);

    assert!(enforcer.validate_file_access(Path::new("/tmp/sandbox/x"), false));
    assert!(!enforcer.validate_file_access(Path::new("/etc/passwd"), false));
}

#[test]
fn test_empty_allowed_directories_permits_any_path() {
    let enforcer = enforcer_with(read_only_policy());
    assert!(enforcer.validate_file_access(Path::new("/etc/hosts"), false));
}

#[test]
fn test_traversal_cannot_escape_allowed_directory() {
    let mut policy = read_only_policy();
    policy
        .permissions
        .allow_directory(PathBuf::from("/tmp/sandbox"));
    let enforcer = enforcer_with(policy);

    assert!(!enforcer.validate_file_access(Path::new("/tmp/sandbox/../../etc/passwd"), false));
}

#[test]
fn test_write_needs_write_flag() {
    let enforcer = enforcer_with(read_only_policy());

    assert!(enforcer.validate_file_access(Path::new("/data/in"), false));
    assert!(!enforcer.validate_file_access(Path::new("/data/out"), true));
    assert_eq!(enforcer.get_security_events().len(), 1);
}

#[test]
fn test_network_access_rules() {
    let mut policy = SecurityPolicy::new("net", SandboxSecurityLevel::Limited);
    policy.permissions.allow_network_access = true;
    policy.permissions.allow_host("*.example.com");
    let enforcer = enforcer_with(policy);

    assert!(enforcer.validate_network_access("api.example.com", 443));
    assert!(!enforcer.validate_network_access("example.com", 443));
    assert!(!enforcer.validate_network_access("evil.com", 80));

    let events = enforcer.get_security_events();
    assert_eq!(events.len(), 2);
    assert!(events
        .iter()
        .all(|e| e.violation == SecurityViolationType::UnauthorizedNetworkAccess));
    assert_eq!(events[1].resource, "evil.com:80");
}

#[test]
fn test_network_denied_without_flag() {
    let enforcer = enforcer_with(SecurityPolicy::sandboxed());
    assert!(!enforcer.validate_network_access("localhost", 8080));
}

#[test]
fn test_process_and_system_call_flags() {
    let enforcer = enforcer_with(SecurityPolicy::strict());

    assert!(!enforcer.validate_process_creation(Path::new("/bin/sh")));
    assert!(!enforcer.validate_system_call("fork"));

    let events = enforcer.get_security_events();
    assert_eq!(events.len(), 2);
    assert_eq!(
        events[0].violation,
        SecurityViolationType::UnauthorizedProcessCreation
    );
    assert_eq!(
        events[1].violation,
        SecurityViolationType::UnauthorizedSystemCall
    );
}

#[test]
fn test_blocked_api_denied_despite_full_permissions() {
    let mut policy = SecurityPolicy::unrestricted();
    policy.permissions.block_api("system");
    let enforcer = enforcer_with(policy);

    assert!(!enforcer.validate_api_call("system"));

    let events = enforcer.get_security_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].violation, SecurityViolationType::BlockedApiCall);
    assert_eq!(events[0].resource, "system");

    // Everything else still passes
    assert!(enforcer.validate_api_call("malloc"));
    assert!(enforcer.validate_file_access(Path::new("/anywhere"), true));
}

#[test]
fn test_clear_events_then_single_denial_appends_one() {
    let enforcer = enforcer_with(SecurityPolicy::strict());

    enforcer.validate_system_call("fork");
    enforcer.validate_system_call("execve");
    assert_eq!(enforcer.get_security_events().len(), 2);

    enforcer.clear_security_events();
    assert!(enforcer.get_security_events().is_empty());

    enforcer.validate_system_call("ptrace");
    assert_eq!(enforcer.get_security_events().len(), 1);
}

#[test]
fn test_violation_recorded_before_observer_runs() {
    let observers = ObserverRegistry::new();
    let enforcer = Arc::new(SecurityEnforcer::new(SecurityPolicy::strict(), observers.clone()));
    enforcer.initialize();

    let recorded_first = Arc::new(AtomicBool::new(false));
    let flag = recorded_first.clone();
    let inner = enforcer.clone();
    observers.subscribe(Arc::new(FnObserver(move |_event: &SecurityEvent| {
        // The event must already be queryable when the callback fires.
        flag.store(!inner.get_security_events().is_empty(), Ordering::SeqCst);
    })));

    assert!(!enforcer.validate_system_call("fork"));
    assert!(recorded_first.load(Ordering::SeqCst));
}

#[test]
fn test_suspicious_activity_threshold() {
    struct Suspicion(AtomicUsize);
    impl SandboxObserver for Suspicion {
        fn on_suspicious_activity(&self, _details: &str) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    let observers = ObserverRegistry::new();
    let suspicion = Arc::new(Suspicion(AtomicUsize::new(0)));
    observers.subscribe(suspicion.clone());

    let enforcer = SecurityEnforcer::new(SecurityPolicy::strict(), observers);
    enforcer.initialize();

    let threshold = SUSPICIOUS_DENIAL_THRESHOLD as usize;
    for _ in 0..threshold {
        enforcer.validate_system_call("fork");
    }
    assert_eq!(suspicion.0.load(Ordering::SeqCst), 1);

    for _ in 0..threshold {
        enforcer.validate_system_call("fork");
    }
    assert_eq!(suspicion.0.load(Ordering::SeqCst), 2);
}

#[test]
fn test_update_policy_keeps_event_history() {
    let enforcer = enforcer_with(SecurityPolicy::strict());
    enforcer.validate_system_call("fork");
    assert_eq!(enforcer.get_security_events().len(), 1);

    enforcer.update_policy(SecurityPolicy::unrestricted());
    assert!(enforcer.validate_system_call("fork"));
    assert_eq!(enforcer.get_security_events().len(), 1, "history survives the swap");
    assert_eq!(enforcer.policy().policy_name, "unrestricted");
}

#[test]
fn test_shutdown_then_reinitialize_restores_enforcement() {
    let enforcer = enforcer_with(SecurityPolicy::unrestricted());
    assert!(enforcer.validate_api_call("open"));

    enforcer.shutdown();
    enforcer.shutdown(); // idempotent
    assert!(!enforcer.validate_api_call("open"));

    assert!(enforcer.initialize());
    assert!(enforcer.validate_api_call("open"));
}
