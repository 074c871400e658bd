/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sandbox operation result
///
/// # Must Use
/// Sandbox operations can fail and must be handled
#[must_use = "sandbox operations can fail and must be handled"]
pub type SandboxResult<T> = Result<T, SandboxError>;

/// Policy validation result
///
/// # Must Use
/// Policy validation can fail and must be handled
#[must_use = "policy validation can fail and must be handled"]
pub type PolicyResult<T> = Result<T, PolicyError>;

/// Registry-level sandbox errors
///
/// A denied validation is a boolean outcome, never an error; these variants
/// cover registry misuse and isolation-resource failures only.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(rename_all = "snake_case", tag = "error", content = "details")]
pub enum SandboxError {
    #[error("Sandbox {0:?} already exists")]
    #[diagnostic(
        code(sandbox::already_exists),
        help("Sandbox ids are unique. Remove the existing sandbox before re-creating it.")
    )]
    AlreadyExists(String),

    #[error("Policy {0:?} not registered")]
    #[diagnostic(
        code(sandbox::policy_not_found),
        help("Register the policy first or use one of the default policies.")
    )]
    PolicyNotFound(String),

    #[error("Invalid policy: {0}")]
    #[diagnostic(
        code(sandbox::invalid_policy),
        help("Fix the policy definition; limits must be positive and patterns well-formed.")
    )]
    InvalidPolicy(#[from] PolicyError),

    #[error("Sandbox registry is shutting down")]
    #[diagnostic(
        code(sandbox::shutting_down),
        help("A shutdown is draining the registry. Retry after it completes.")
    )]
    ShuttingDown,

    #[error("Isolation setup failed: {0}")]
    #[diagnostic(
        code(sandbox::isolation_failed),
        help("Check that the isolation root directory exists and is writable.")
    )]
    Isolation(String),
}

impl From<std::io::Error> for SandboxError {
    fn from(err: std::io::Error) -> Self {
        SandboxError::Isolation(err.to_string())
    }
}

/// Policy validation errors
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(rename_all = "snake_case", tag = "error", content = "details")]
pub enum PolicyError {
    #[error("Resource limit {0:?} must be positive")]
    #[diagnostic(
        code(policy::non_positive_limit),
        help("Every resource limit is a hard ceiling; zero is rejected, not treated as unlimited.")
    )]
    NonPositiveLimit(String),

    #[error("Allowed directory {0:?} is not an absolute path")]
    #[diagnostic(
        code(policy::relative_directory),
        help("Allowed directories are absolute path prefixes.")
    )]
    RelativeDirectory(String),

    #[error("Invalid host pattern {0:?}")]
    #[diagnostic(
        code(policy::invalid_host_pattern),
        help("Host patterns are exact names, \"*\", or a leading \"*.\" wildcard label.")
    )]
    InvalidHostPattern(String),

    #[error("Malformed policy document: {0}")]
    #[diagnostic(
        code(policy::malformed),
        help("The policy record could not be parsed. Check field names and types.")
    )]
    Malformed(String),
}
