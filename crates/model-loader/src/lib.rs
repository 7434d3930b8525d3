// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # model-loader
//!
//! Localisation of model packages and parsing of their manifests.
//!
//! - [`ModelLoader`]: the `ensure_local()` contract every backend uses to
//!   get a local directory for its model.
//! - [`DirectoryLoader`] / [`ArchiveLoader`]: the two built-in loaders,
//!   selected by [`loader_for`].
//! - [`ModelManifest`]: the `config.json` descriptor naming the model's
//!   platform and its input/output tensors.
//!
//! # Example
//! ```no_run
//! use model_loader::{loader_for, ModelManifest};
//! use std::path::Path;
//!
//! let loader = loader_for(Path::new("./models/addition_model.tar.gz"));
//! let local = loader.ensure_local().unwrap();
//! let manifest = ModelManifest::from_model_dir(&local).unwrap();
//! println!("{}", manifest.summary());
//! ```

mod error;
mod loader;
mod manifest;

pub use error::LoaderError;
pub use loader::{loader_for, ArchiveLoader, DirectoryLoader, ModelLoader};
pub use manifest::{Dim, ModelManifest, TensorSpec, MANIFEST_FILE};
