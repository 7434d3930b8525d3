// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for model localisation and manifest parsing.

use std::path::PathBuf;

/// Errors that can occur while making a model available locally.
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    /// The model path does not exist.
    #[error("model path '{0}' does not exist")]
    NotFound(PathBuf),

    /// A filesystem operation failed.
    #[error("i/o error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An archive entry would be extracted outside the target directory.
    #[error("archive entry '{0}' escapes the extraction directory")]
    UnsafeEntry(PathBuf),

    /// The manifest file could not be read.
    #[error("failed to read manifest: {0}")]
    ManifestReadError(#[from] std::io::Error),

    /// The manifest JSON is malformed.
    #[error("failed to parse manifest: {0}")]
    ManifestParseError(#[from] serde_json::Error),

    /// The manifest parsed but is not internally consistent.
    #[error("invalid manifest: {0}")]
    InvalidManifest(String),
}

impl LoaderError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
