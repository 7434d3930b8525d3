// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Registry of backend constructors keyed by (execution kind, platform).
//!
//! The registry is an explicit object filled in at process startup:
//!
//! ```ignore
//! let mut registry = BackendRegistry::new();
//! python_bridge::register(&mut registry);
//! let backend = registry.create("python", "pytorch", path, &options, &[])?;
//! ```
//!
//! One kind may serve several platforms, each registered under its own key.

use crate::{Backend, BackendError, RuntimeOptions};
use model_loader::ModelManifest;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Constructor signature shared by all backends:
/// `(model_path, options, path_additions) -> backend`.
pub type BackendFactory = Arc<
    dyn Fn(&Path, &RuntimeOptions, &[String]) -> Result<Box<dyn Backend>, BackendError>
        + Send
        + Sync,
>;

/// Maps `(kind, platform)` to a [`BackendFactory`].
#[derive(Default, Clone)]
pub struct BackendRegistry {
    factories: HashMap<(String, String), BackendFactory>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `factory` under `(kind, platform)`.
    ///
    /// Registering an existing key replaces the previous factory.
    pub fn register<F>(&mut self, kind: &str, platform: &str, factory: F)
    where
        F: Fn(&Path, &RuntimeOptions, &[String]) -> Result<Box<dyn Backend>, BackendError>
            + Send
            + Sync
            + 'static,
    {
        let key = (kind.to_string(), platform.to_string());
        if self.factories.insert(key, Arc::new(factory)).is_some() {
            tracing::warn!("backend registry: replaced factory for ({kind}, {platform})");
        } else {
            tracing::debug!("backend registry: registered ({kind}, {platform})");
        }
    }

    /// Returns `true` if a factory exists for the exact key.
    pub fn contains(&self, kind: &str, platform: &str) -> bool {
        self.factories
            .contains_key(&(kind.to_string(), platform.to_string()))
    }

    /// Returns all registered keys, sorted.
    pub fn keys(&self) -> Vec<(String, String)> {
        let mut keys: Vec<_> = self.factories.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Looks up the factory for `(kind, platform)`.
    ///
    /// A missing key is a configuration error, not something to retry.
    pub fn factory(&self, kind: &str, platform: &str) -> Result<BackendFactory, BackendError> {
        self.factories
            .get(&(kind.to_string(), platform.to_string()))
            .cloned()
            .ok_or_else(|| BackendError::UnregisteredBackend {
                kind: kind.to_string(),
                platform: platform.to_string(),
            })
    }

    /// Constructs a backend for `model_path` with the factory registered
    /// under `(kind, platform)`.
    pub fn create(
        &self,
        kind: &str,
        platform: &str,
        model_path: &Path,
        options: &RuntimeOptions,
        path_additions: &[String],
    ) -> Result<Box<dyn Backend>, BackendError> {
        let factory = self.factory(kind, platform)?;
        tracing::info!(
            "backend registry: constructing ({kind}, {platform}) for '{}'",
            model_path.display()
        );
        factory(model_path, options, path_additions)
    }

    /// Reads the model's manifest and constructs the backend registered for
    /// `(kind, manifest.platform)`.
    pub fn create_for_manifest(
        &self,
        kind: &str,
        model_path: &Path,
        options: &RuntimeOptions,
        path_additions: &[String],
    ) -> Result<Box<dyn Backend>, BackendError> {
        let manifest = ModelManifest::locate(model_path)?;
        manifest.validate()?;
        tracing::info!("{}", manifest.summary());
        self.create(kind, &manifest.platform, model_path, options, path_additions)
    }
}

impl std::fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendRegistry")
            .field("keys", &self.keys())
            .finish()
    }
}
