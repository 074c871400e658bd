/*!
 * Directory Prefix Checks
 * Lexical path matching; never touches the filesystem
 */

use path_clean::PathClean;
use std::path::{Path, PathBuf};

/// Check a path against a directory allow-list
///
/// Both sides are lexically cleaned before prefix comparison, so `..`
/// segments cannot escape an allowed prefix. An empty allow-list places no
/// path restriction; the capability flag is the gate.
pub fn is_path_allowed(path: &Path, allowed_directories: &[PathBuf]) -> bool {
    if allowed_directories.is_empty() {
        return true;
    }

    let candidate = path.clean();
    allowed_directories
        .iter()
        .any(|prefix| candidate.starts_with(prefix.clean()))
}
