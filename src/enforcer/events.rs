/*!
 * Security Events
 * Append-only violation records with a bounded in-memory log
 */

use crate::core::limits::MAX_SECURITY_EVENTS;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, TimestampSeconds};
use std::collections::VecDeque;
use std::time::SystemTime;

/// Category of a denied operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityViolationType {
    UnauthorizedFileAccess,
    UnauthorizedNetworkAccess,
    UnauthorizedProcessCreation,
    UnauthorizedSystemCall,
    BlockedApiCall,
}

impl std::fmt::Display for SecurityViolationType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            SecurityViolationType::UnauthorizedFileAccess => write!(f, "unauthorized file access"),
            SecurityViolationType::UnauthorizedNetworkAccess => {
                write!(f, "unauthorized network access")
            }
            SecurityViolationType::UnauthorizedProcessCreation => {
                write!(f, "unauthorized process creation")
            }
            SecurityViolationType::UnauthorizedSystemCall => {
                write!(f, "unauthorized system call")
            }
            SecurityViolationType::BlockedApiCall => write!(f, "blocked api call"),
        }
    }
}

/// Immutable record of one denied operation
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SecurityEvent {
    pub violation: SecurityViolationType,
    pub description: String,
    pub resource: String,
    #[serde_as(as = "TimestampSeconds<i64>")]
    pub timestamp: SystemTime,
}

impl SecurityEvent {
    pub fn new(
        violation: SecurityViolationType,
        description: impl Into<String>,
        resource: impl Into<String>,
    ) -> Self {
        Self {
            violation,
            description: description.into(),
            resource: resource.into(),
            timestamp: SystemTime::now(),
        }
    }
}

/// Violation log owned by one enforcer
///
/// Append-only until explicitly cleared; bounded by `MAX_SECURITY_EVENTS`,
/// oldest entries fall off first.
#[derive(Debug, Default)]
pub struct EventLog {
    events: RwLock<VecDeque<SecurityEvent>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self {
            events: RwLock::new(VecDeque::new()),
        }
    }

    pub fn append(&self, event: SecurityEvent) {
        let mut events = self.events.write();
        if events.len() >= MAX_SECURITY_EVENTS {
            events.pop_front();
        }
        events.push_back(event);
    }

    /// Snapshot copy of the current log
    pub fn snapshot(&self) -> Vec<SecurityEvent> {
        self.events.read().iter().cloned().collect()
    }

    pub fn clear(&self) {
        self.events.write().clear();
    }

    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }
}
