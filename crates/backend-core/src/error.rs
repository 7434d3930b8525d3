// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types shared by every backend.

use std::path::PathBuf;

/// Errors that can occur while constructing a backend or running inference.
///
/// Construction-time failures (`Initialization`, `Resolution`, `Load`,
/// `UnregisteredBackend`, `Config`) are fatal for that construction and are
/// never retried. `Inference` failures affect one call only; the backend
/// stays usable.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The embedded runtime could not be started, or its symbols could not
    /// be made globally visible.
    #[error("runtime initialization failed: {0}")]
    Initialization(String),

    /// A required entrypoint or helper is missing from the runtime's libraries.
    #[error("cannot resolve '{entrypoint}': {detail}")]
    Resolution { entrypoint: String, detail: String },

    /// The model artifact could not be localised or was rejected by the loader.
    #[error("failed to load model '{}': {detail}", .path.display())]
    Load { path: PathBuf, detail: String },

    /// A single inference call failed.
    #[error("inference failed: {0}")]
    Inference(String),

    /// No factory is registered for the requested key.
    #[error("no backend registered for kind '{kind}' and platform '{platform}'")]
    UnregisteredBackend { kind: String, platform: String },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// A host tensor could not be built from backend output.
    #[error("tensor error: {0}")]
    Tensor(#[from] tensor_core::TensorError),

    /// The model manifest could not be read.
    #[error("model package error: {0}")]
    Loader(#[from] model_loader::LoaderError),
}

impl BackendError {
    /// Returns `true` for errors that leave no usable backend behind.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, BackendError::Inference(_) | BackendError::Tensor(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatality() {
        assert!(BackendError::Initialization("x".into()).is_fatal());
        assert!(BackendError::Load {
            path: "/m".into(),
            detail: "bad".into()
        }
        .is_fatal());
        assert!(!BackendError::Inference("boom".into()).is_fatal());
    }

    #[test]
    fn test_display() {
        let err = BackendError::Resolution {
            entrypoint: "pkg.loader:load".into(),
            detail: "ModuleNotFoundError".into(),
        };
        assert_eq!(
            err.to_string(),
            "cannot resolve 'pkg.loader:load': ModuleNotFoundError"
        );
        let err = BackendError::Load {
            path: "/models/a".into(),
            detail: "bad".into(),
        };
        assert_eq!(err.to_string(), "failed to load model '/models/a': bad");
    }
}
