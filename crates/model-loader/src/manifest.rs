// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! JSON model manifest parsing.
//!
//! Every model package carries a `config.json` naming the model, the
//! platform that executes it, and the tensors it consumes and produces.
//!
//! # Format
//! ```json
//! {
//!   "name": "addition_model",
//!   "platform": "python",
//!   "input_spec": [
//!     { "name": "x", "dtype": "float32", "shape": [null, 2] }
//!   ],
//!   "output_spec": [
//!     { "name": "out", "dtype": "float32", "shape": [null, "batch"] }
//!   ],
//!   "custom_ops": []
//! }
//! ```
//! A shape entry is a fixed size, `null` for "any size", or a symbol
//! name that must resolve to the same size everywhere it appears.

use crate::LoaderError;
use flate2::read::GzDecoder;
use std::collections::HashSet;
use std::ffi::OsStr;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tar::Archive;
use tensor_core::DType;

/// Manifest filename inside a model package.
pub const MANIFEST_FILE: &str = "config.json";

/// One dimension of a [`TensorSpec`] shape.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum Dim {
    Fixed(usize),
    Symbolic(String),
    Any,
}

impl std::fmt::Display for Dim {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dim::Fixed(n) => write!(f, "{n}"),
            Dim::Symbolic(s) => f.write_str(s),
            Dim::Any => f.write_str("?"),
        }
    }
}

/// Declared name, dtype and shape of a model input or output.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TensorSpec {
    pub name: String,
    pub dtype: String,
    pub shape: Vec<Dim>,
}

impl TensorSpec {
    /// Resolves the declared dtype string.
    pub fn dtype(&self) -> Option<DType> {
        DType::from_name(&self.dtype)
    }

    /// Renders the tensor declaration as `name: dtype[d0, d1, ...]`.
    pub fn summary(&self) -> String {
        let dims: Vec<String> = self.shape.iter().map(Dim::to_string).collect();
        format!("{}: {}[{}]", self.name, self.dtype, dims.join(", "))
    }
}

/// Top-level model manifest, deserialized from `config.json`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ModelManifest {
    /// Human-readable model name.
    pub name: String,
    /// Platform tag selecting the backend (e.g. `"python"`, `"pytorch"`).
    pub platform: String,
    pub input_spec: Vec<TensorSpec>,
    pub output_spec: Vec<TensorSpec>,
    /// Custom op libraries shipped with the model, relative to the package.
    #[serde(default)]
    pub custom_ops: Vec<String>,
}

impl ModelManifest {
    /// Loads the manifest from a model package directory.
    pub fn from_model_dir(model_dir: &Path) -> Result<Self, LoaderError> {
        Self::from_file(&model_dir.join(MANIFEST_FILE))
    }

    /// Reads the manifest of a model package without extracting it.
    ///
    /// `model_path` may be a package directory or a `.tar.gz` / `.tgz`
    /// archive; for archives only the `config.json` entry is read.
    pub fn locate(model_path: &Path) -> Result<Self, LoaderError> {
        if !model_path.exists() {
            return Err(LoaderError::NotFound(model_path.to_path_buf()));
        }
        if model_path.is_dir() {
            return Self::from_model_dir(model_path);
        }
        let file = File::open(model_path).map_err(|e| LoaderError::io(model_path, e))?;
        let mut archive = Archive::new(GzDecoder::new(file));
        let entries = archive
            .entries()
            .map_err(|e| LoaderError::io(model_path, e))?;
        for entry in entries {
            let mut entry = entry.map_err(|e| LoaderError::io(model_path, e))?;
            let is_manifest = entry
                .path()
                .map(|p| {
                    p.file_name() == Some(OsStr::new(MANIFEST_FILE)) && p.components().count() <= 2
                })
                .unwrap_or(false);
            if is_manifest {
                let mut content = String::new();
                entry.read_to_string(&mut content)?;
                return Self::from_json(&content);
            }
        }
        Err(LoaderError::InvalidManifest(format!(
            "'{}' contains no {MANIFEST_FILE}",
            model_path.display()
        )))
    }

    /// Loads a manifest from a JSON file path.
    pub fn from_file(path: &Path) -> Result<Self, LoaderError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parses a manifest from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, LoaderError> {
        let manifest: Self = serde_json::from_str(json)?;
        Ok(manifest)
    }

    /// Validates that the manifest is internally consistent.
    ///
    /// Checks:
    /// - The name and platform are non-empty.
    /// - Every dtype string is recognised.
    /// - No duplicate names within the input spec or within the output spec.
    pub fn validate(&self) -> Result<(), LoaderError> {
        if self.name.trim().is_empty() {
            return Err(LoaderError::InvalidManifest("model name is empty".into()));
        }
        if self.platform.trim().is_empty() {
            return Err(LoaderError::InvalidManifest(format!(
                "model '{}' declares no platform",
                self.name
            )));
        }
        for (kind, specs) in [("input", &self.input_spec), ("output", &self.output_spec)] {
            let mut seen = HashSet::new();
            for spec in specs {
                if !seen.insert(spec.name.as_str()) {
                    return Err(LoaderError::InvalidManifest(format!(
                        "duplicate {kind} name '{}'",
                        spec.name
                    )));
                }
                if spec.dtype().is_none() {
                    return Err(LoaderError::InvalidManifest(format!(
                        "{kind} '{}' has unsupported dtype '{}'",
                        spec.name, spec.dtype
                    )));
                }
            }
        }
        Ok(())
    }

    /// Returns a one-line summary for logging.
    pub fn summary(&self) -> String {
        format!(
            "model '{}' (platform '{}'): {} inputs, {} outputs",
            self.name,
            self.platform,
            self.input_spec.len(),
            self.output_spec.len(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_manifest_json() -> &'static str {
        r#"{
            "name": "addition_model",
            "platform": "python",
            "input_spec": [
                { "name": "x", "dtype": "float32", "shape": [null, 2] },
                { "name": "y", "dtype": "float32", "shape": ["batch", 2] }
            ],
            "output_spec": [
                { "name": "out", "dtype": "float32", "shape": ["batch", 2] }
            ]
        }"#
    }

    #[test]
    fn test_parse_manifest() {
        let m = ModelManifest::from_json(sample_manifest_json()).unwrap();
        assert_eq!(m.name, "addition_model");
        assert_eq!(m.platform, "python");
        assert_eq!(m.input_spec.len(), 2);
        assert_eq!(m.input_spec[0].shape, vec![Dim::Any, Dim::Fixed(2)]);
        assert_eq!(
            m.input_spec[1].shape,
            vec![Dim::Symbolic("batch".into()), Dim::Fixed(2)]
        );
        assert!(m.custom_ops.is_empty());
    }

    #[test]
    fn test_validate_ok() {
        let m = ModelManifest::from_json(sample_manifest_json()).unwrap();
        m.validate().unwrap();
    }

    #[test]
    fn test_validate_duplicate_inputs() {
        let json = r#"{
            "name": "dup", "platform": "python",
            "input_spec": [
                { "name": "x", "dtype": "float32", "shape": [1] },
                { "name": "x", "dtype": "int64", "shape": [1] }
            ],
            "output_spec": []
        }"#;
        let m = ModelManifest::from_json(json).unwrap();
        assert!(m.validate().is_err());
    }

    #[test]
    fn test_same_name_in_and_out_allowed() {
        let json = r#"{
            "name": "echo", "platform": "python",
            "input_spec": [{ "name": "x", "dtype": "string", "shape": [null] }],
            "output_spec": [{ "name": "x", "dtype": "string", "shape": [null] }]
        }"#;
        ModelManifest::from_json(json).unwrap().validate().unwrap();
    }

    #[test]
    fn test_validate_bad_dtype() {
        let json = r#"{
            "name": "bad", "platform": "python",
            "input_spec": [{ "name": "x", "dtype": "complex128", "shape": [] }],
            "output_spec": []
        }"#;
        let m = ModelManifest::from_json(json).unwrap();
        let err = m.validate().unwrap_err();
        assert!(err.to_string().contains("complex128"));
    }

    #[test]
    fn test_validate_missing_platform() {
        let json = r#"{ "name": "p", "platform": " ", "input_spec": [], "output_spec": [] }"#;
        let m = ModelManifest::from_json(json).unwrap();
        assert!(m.validate().is_err());
    }

    #[test]
    fn test_spec_summary() {
        let m = ModelManifest::from_json(sample_manifest_json()).unwrap();
        assert_eq!(m.input_spec[0].summary(), "x: float32[?, 2]");
        assert_eq!(m.output_spec[0].summary(), "out: float32[batch, 2]");
    }

    #[test]
    fn test_serde_roundtrip() {
        let m = ModelManifest::from_json(sample_manifest_json()).unwrap();
        let json = serde_json::to_string_pretty(&m).unwrap();
        let back = ModelManifest::from_json(&json).unwrap();
        assert_eq!(back.input_spec, m.input_spec);
    }
}
