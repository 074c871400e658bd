/*!
 * Observer Registry
 * Synchronous notification fan-out on the calling thread
 */

use crate::enforcer::events::SecurityEvent;
use crate::traits::SandboxObserver;
use parking_lot::RwLock;
use std::sync::Arc;

/// Shared set of subscribed observers
///
/// Cloning yields another handle onto the same subscription list. Delivery
/// is synchronous and in subscription order; the list is snapshotted before
/// fan-out so a callback may itself subscribe without deadlocking.
#[derive(Clone, Default)]
pub struct ObserverRegistry {
    observers: Arc<RwLock<Vec<Arc<dyn SandboxObserver>>>>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe an observer for all future notifications
    pub fn subscribe(&self, observer: Arc<dyn SandboxObserver>) {
        self.observers.write().push(observer);
    }

    pub fn notify_created(&self, id: &str) {
        for observer in self.current() {
            observer.on_sandbox_created(id);
        }
    }

    pub fn notify_removed(&self, id: &str) {
        for observer in self.current() {
            observer.on_sandbox_removed(id);
        }
    }

    pub fn notify_violation(&self, event: &SecurityEvent) {
        for observer in self.current() {
            observer.on_security_violation(event);
        }
    }

    pub fn notify_suspicious_activity(&self, details: &str) {
        for observer in self.current() {
            observer.on_suspicious_activity(details);
        }
    }

    fn current(&self) -> Vec<Arc<dyn SandboxObserver>> {
        self.observers.read().clone()
    }
}

/// Closure adapter for violation callbacks
///
/// Lets a host subscribe with a plain function instead of a full
/// `SandboxObserver` implementation.
pub struct FnObserver<F>(pub F)
where
    F: Fn(&SecurityEvent) + Send + Sync;

impl<F> SandboxObserver for FnObserver<F>
where
    F: Fn(&SecurityEvent) + Send + Sync,
{
    fn on_security_violation(&self, event: &SecurityEvent) {
        (self.0)(event);
    }
}
