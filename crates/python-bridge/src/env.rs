// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Process environment handling for the embedded interpreter.
//!
//! Both operations here mutate process-wide state and are not reversible.
//! Concurrent readers of the same variables elsewhere in the process may
//! observe the old or the new value.

/// Module search path read by the interpreter at startup.
pub const SEARCH_PATH_VAR: &str = "PYTHONPATH";

/// Set when the host runs inside an isolated Python environment.
pub const VENV_MARKER_VAR: &str = "VIRTUAL_ENV";

/// Interpreter home directory (standard library and site-packages root).
pub const HOME_VAR: &str = "PYTHONHOME";

/// Builds the merged search path: every addition followed by `:`, then
/// the existing value unchanged.
///
/// ```
/// use python_bridge::env::merge_search_path;
/// let additions = vec!["/a".to_string(), "/b".to_string()];
/// assert_eq!(merge_search_path(&additions, None), "/a:/b:");
/// assert_eq!(merge_search_path(&["/c".to_string()], Some("/a:/b:")), "/c:/a:/b:");
/// ```
pub fn merge_search_path(additions: &[String], existing: Option<&str>) -> String {
    let mut merged = String::new();
    for dir in additions {
        merged.push_str(dir);
        merged.push(':');
    }
    if let Some(existing) = existing {
        merged.push_str(existing);
    }
    merged
}

/// Prepends `additions` to the environment variable `var` and returns the
/// value written.
pub fn prepend_search_path(var: &str, additions: &[String]) -> String {
    let existing = std::env::var(var).ok();
    let merged = merge_search_path(additions, existing.as_deref());
    std::env::set_var(var, &merged);
    tracing::debug!("python bridge: {var}={merged}");
    merged
}

/// Copies the value of `marker` into `home` when `marker` is set.
///
/// Returns the new home directory, if any.
pub fn redirect_home(marker: &str, home: &str) -> Option<String> {
    let venv = std::env::var(marker).ok()?;
    std::env::set_var(home, &venv);
    tracing::info!("python bridge: {marker} is set, using {home}={venv}");
    Some(venv)
}
