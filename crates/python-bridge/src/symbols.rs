// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Global symbol visibility for the linked libpython.
//!
//! The host links libpython with local symbol visibility. Extension modules
//! that the interpreter `dlopen`s later (numpy, torch, ...) expect to
//! resolve `Py*` symbols globally, so before the interpreter starts the
//! already-loaded library is re-opened with `RTLD_GLOBAL | RTLD_NOLOAD`.
//! macOS resolves these through two-level namespaces and needs no promotion.

use backend_core::SymbolPromotion;

/// File name of the libpython this crate was built against.
pub const BUILD_PYTHON_LIBRARY: &str = env!("BRIDGE_PYTHON_LIBRARY");

/// Full path of that library, when the build configuration knows it.
const BUILD_PYTHON_LIBRARY_PATH: &str = env!("BRIDGE_PYTHON_LIBRARY_PATH");

/// Whether the build links a shared libpython.
pub const BUILD_PYTHON_SHARED: bool = cfg!(python_shared);

const PLATFORM_NEEDS_PROMOTION: bool = cfg!(all(unix, not(target_os = "macos")));

/// Decides whether promotion runs for `mode` on this build and platform.
pub fn needs_promotion(mode: SymbolPromotion) -> bool {
    match mode {
        SymbolPromotion::Skip => false,
        SymbolPromotion::Required => PLATFORM_NEEDS_PROMOTION,
        SymbolPromotion::Auto => PLATFORM_NEEDS_PROMOTION && BUILD_PYTHON_SHARED,
    }
}

/// Suffix of the versioned soname that runtime-only installs ship instead
/// of the unversioned development symlink.
const SONAME_SUFFIX: &str = ".1.0";

/// Libraries to try, most specific first.
///
/// Without a configured name, the unversioned build library is tried
/// before its `.so.1.0` soname.
pub(crate) fn candidates(configured: Option<&str>) -> Vec<String> {
    match configured {
        Some(name) => vec![name.to_string()],
        None => {
            let built: Vec<&str> = [BUILD_PYTHON_LIBRARY_PATH, BUILD_PYTHON_LIBRARY]
                .into_iter()
                .filter(|c| !c.is_empty())
                .collect();
            let versioned = built.iter().map(|c| format!("{c}{SONAME_SUFFIX}"));
            built
                .iter()
                .map(|c| c.to_string())
                .chain(versioned)
                .collect()
        }
    }
}

/// Promotes the first loadable candidate to global visibility.
///
/// Idempotent: once a library has been promoted, later calls return
/// immediately. The promoted handle is kept for the life of the process.
#[cfg(all(unix, not(target_os = "macos")))]
pub fn promote(candidates: &[String]) -> Result<(), String> {
    use libloading::os::unix::{Library, RTLD_GLOBAL, RTLD_NOW};
    use std::sync::OnceLock;

    static PROMOTED: OnceLock<Library> = OnceLock::new();
    if PROMOTED.get().is_some() {
        return Ok(());
    }

    let mut last_error = String::from("no libpython candidates");
    for name in candidates {
        // SAFETY: RTLD_NOLOAD only re-opens an already-mapped library, so no
        // initialisers run.
        match unsafe { Library::open(Some(name), RTLD_NOW | RTLD_GLOBAL | libc::RTLD_NOLOAD) } {
            Ok(lib) => {
                tracing::info!("python bridge: promoted '{name}' to RTLD_GLOBAL");
                let _ = PROMOTED.set(lib);
                return Ok(());
            }
            Err(e) => {
                tracing::debug!("python bridge: cannot promote '{name}': {e}");
                last_error = format!("'{name}': {e}");
            }
        }
    }
    Err(format!(
        "failed to promote libpython to RTLD_GLOBAL. Error from dlopen: {last_error}"
    ))
}

#[cfg(not(all(unix, not(target_os = "macos"))))]
pub fn promote(_candidates: &[String]) -> Result<(), String> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_never_promotes() {
        assert!(!needs_promotion(SymbolPromotion::Skip));
    }

    #[test]
    fn test_auto_follows_build() {
        assert_eq!(
            needs_promotion(SymbolPromotion::Auto),
            PLATFORM_NEEDS_PROMOTION && BUILD_PYTHON_SHARED
        );
    }

    #[test]
    fn test_candidates() {
        assert_eq!(candidates(Some("libpython3.9.so")), vec!["libpython3.9.so"]);
        let defaults = candidates(None);
        let soname = format!("{BUILD_PYTHON_LIBRARY}{SONAME_SUFFIX}");
        assert!(!defaults.is_empty());
        assert!(defaults
            .iter()
            .all(|c| c.ends_with(BUILD_PYTHON_LIBRARY) || c.ends_with(&soname)));
        // Unversioned names come first, the soname is the fallback.
        assert!(defaults[0].ends_with(BUILD_PYTHON_LIBRARY));
        assert_eq!(defaults.last(), Some(&soname));
    }

    #[cfg(all(unix, not(target_os = "macos")))]
    #[test]
    fn test_promote_unloaded_library_fails() {
        let err = promote(&["libpython-bridge-not-loaded.so".to_string()]).unwrap_err();
        assert!(err.contains("RTLD_GLOBAL"));
        assert!(err.contains("libpython-bridge-not-loaded.so"));
    }
}
