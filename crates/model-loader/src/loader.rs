// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Making model packages available on the local filesystem.
//!
//! A model path is either a package directory or a gzipped tarball of one.
//! [`loader_for`] picks the right [`ModelLoader`]; backends then call
//! [`ModelLoader::ensure_local`] to get a directory they can hand to their
//! runtime.

use crate::{LoaderError, MANIFEST_FILE};
use flate2::read::GzDecoder;
use std::fs::File;
use std::path::{Component, Path, PathBuf};
use std::sync::Mutex;
use tar::{Archive, EntryType};

/// Resolves a model path to a local directory.
pub trait ModelLoader: Send + Sync + std::fmt::Debug {
    /// Returns a local filesystem path for the model package.
    ///
    /// Implementations may do work (extraction, download) on the first
    /// call; repeated calls return the same path.
    fn ensure_local(&self) -> Result<PathBuf, LoaderError>;
}

/// Picks a loader for `path`: [`ArchiveLoader`] for `.tar.gz` / `.tgz`
/// files, [`DirectoryLoader`] for everything else.
pub fn loader_for(path: &Path) -> Box<dyn ModelLoader> {
    if is_archive(path) {
        Box::new(ArchiveLoader::new(path))
    } else {
        Box::new(DirectoryLoader::new(path))
    }
}

fn is_archive(path: &Path) -> bool {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    path.is_file() && (name.ends_with(".tar.gz") || name.ends_with(".tgz"))
}

/// Loader for a model that already lives on local disk.
#[derive(Debug, Clone)]
pub struct DirectoryLoader {
    path: PathBuf,
}

impl DirectoryLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ModelLoader for DirectoryLoader {
    fn ensure_local(&self) -> Result<PathBuf, LoaderError> {
        if !self.path.exists() {
            return Err(LoaderError::NotFound(self.path.clone()));
        }
        self.path
            .canonicalize()
            .map_err(|e| LoaderError::io(&self.path, e))
    }
}

/// Loader for a gzipped tarball, extracted once into a temporary directory.
///
/// The extracted files live as long as the loader, so a backend that
/// keeps its loader keeps its model files.
#[derive(Debug)]
pub struct ArchiveLoader {
    archive: PathBuf,
    extracted: Mutex<Option<(tempfile::TempDir, PathBuf)>>,
}

impl ArchiveLoader {
    pub fn new(archive: impl Into<PathBuf>) -> Self {
        Self {
            archive: archive.into(),
            extracted: Mutex::new(None),
        }
    }

    fn extract(&self) -> Result<(tempfile::TempDir, PathBuf), LoaderError> {
        let file = File::open(&self.archive).map_err(|e| LoaderError::io(&self.archive, e))?;
        let dir = tempfile::Builder::new()
            .prefix("model-")
            .tempdir()
            .map_err(|e| LoaderError::io(std::env::temp_dir(), e))?;

        let mut archive = Archive::new(GzDecoder::new(file));
        let entries = archive
            .entries()
            .map_err(|e| LoaderError::io(&self.archive, e))?;
        let mut count = 0usize;
        for entry in entries {
            let mut entry = entry.map_err(|e| LoaderError::io(&self.archive, e))?;
            let entry_path = entry
                .path()
                .map_err(|e| LoaderError::io(&self.archive, e))?
                .into_owned();
            // Link entries can redirect later entries outside the
            // extraction directory.
            let is_link = matches!(
                entry.header().entry_type(),
                EntryType::Symlink | EntryType::Link
            );
            if is_link
                || entry_path
                    .components()
                    .any(|c| matches!(c, Component::ParentDir | Component::RootDir))
            {
                return Err(LoaderError::UnsafeEntry(entry_path));
            }
            let unpacked = entry
                .unpack_in(dir.path())
                .map_err(|e| LoaderError::io(dir.path().join(&entry_path), e))?;
            if !unpacked {
                return Err(LoaderError::UnsafeEntry(entry_path));
            }
            count += 1;
        }

        let root = package_root(dir.path());
        tracing::info!(
            "model loader: extracted {} entries from '{}' into '{}'",
            count,
            self.archive.display(),
            root.display(),
        );
        Ok((dir, root))
    }
}

impl ModelLoader for ArchiveLoader {
    fn ensure_local(&self) -> Result<PathBuf, LoaderError> {
        let mut slot = self
            .extracted
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some((_, root)) = slot.as_ref() {
            return Ok(root.clone());
        }
        if !self.archive.exists() {
            return Err(LoaderError::NotFound(self.archive.clone()));
        }
        let (dir, root) = self.extract()?;
        *slot = Some((dir, root.clone()));
        Ok(root)
    }
}

/// Archives usually wrap the package in one top-level directory. If the
/// extraction root has no manifest but exactly one subdirectory that does,
/// that subdirectory is the package.
fn package_root(extracted: &Path) -> PathBuf {
    if extracted.join(MANIFEST_FILE).is_file() {
        return extracted.to_path_buf();
    }
    let subdirs: Vec<PathBuf> = std::fs::read_dir(extracted)
        .map(|rd| {
            rd.filter_map(Result::ok)
                .map(|e| e.path())
                .filter(|p| p.is_dir())
                .collect()
        })
        .unwrap_or_default();
    match subdirs.as_slice() {
        [only] if only.join(MANIFEST_FILE).is_file() => only.clone(),
        _ => extracted.to_path_buf(),
    }
}
