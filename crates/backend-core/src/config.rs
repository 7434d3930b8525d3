// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Backend options loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! path_additions = ["/opt/models/lib"]
//!
//! [python]
//! library = "libpython3.11.so"
//! symbol_promotion = "auto"
//! load_entrypoint = "neuropod.loader:load_neuropod"
//! normalize_entrypoint = "neuropod.utils.dtype_utils:maybe_convert_bindings_types"
//! ```

use crate::BackendError;
use std::path::Path;

/// Options passed to every backend constructor.
///
/// Backends read the sections that concern them and ignore the rest.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct RuntimeOptions {
    /// Module-search-path entries added after the ones the caller passes
    /// at construction.
    #[serde(default)]
    pub path_additions: Vec<String>,
    /// Settings for backends that embed a Python interpreter.
    #[serde(default)]
    pub python: PythonOptions,
}

/// How the embedded interpreter's shared library is made globally visible
/// before the interpreter starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolPromotion {
    /// Promote when the host links a shared libpython on a platform that
    /// needs it.
    #[default]
    Auto,
    /// Always promote; failure is fatal.
    Required,
    /// Never promote.
    Skip,
}

/// Settings for the embedded Python runtime.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PythonOptions {
    /// File name of the shared libpython to promote. Defaults to the
    /// library the host was built against.
    pub library: Option<String>,
    pub symbol_promotion: SymbolPromotion,
    /// `module:attribute` of the callable that loads a model from a local path.
    pub load_entrypoint: String,
    /// `module:attribute` of the callable applied to every raw output dict.
    pub normalize_entrypoint: String,
}

impl Default for PythonOptions {
    fn default() -> Self {
        Self {
            library: None,
            symbol_promotion: SymbolPromotion::Auto,
            load_entrypoint: "neuropod.loader:load_neuropod".to_string(),
            normalize_entrypoint: "neuropod.utils.dtype_utils:maybe_convert_bindings_types"
                .to_string(),
        }
    }
}

/// A parsed `module:attribute` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entrypoint {
    pub module: String,
    pub attribute: String,
}

impl Entrypoint {
    /// Parses `"package.module:attribute"`.
    pub fn parse(spec: &str) -> Result<Self, BackendError> {
        match spec.split_once(':') {
            Some((module, attribute))
                if !module.trim().is_empty()
                    && !attribute.trim().is_empty()
                    && !attribute.contains(':') =>
            {
                Ok(Self {
                    module: module.trim().to_string(),
                    attribute: attribute.trim().to_string(),
                })
            }
            _ => Err(BackendError::Config(format!(
                "invalid entrypoint '{spec}'; expected 'module:attribute'"
            ))),
        }
    }
}

impl std::fmt::Display for Entrypoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.module, self.attribute)
    }
}

impl RuntimeOptions {
    /// Loads options from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, BackendError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            BackendError::Config(format!("cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses options from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, BackendError> {
        toml::from_str(toml_str)
            .map_err(|e| BackendError::Config(format!("TOML parse error: {e}")))
    }

    /// Serialises options to TOML.
    pub fn to_toml(&self) -> Result<String, BackendError> {
        toml::to_string_pretty(self)
            .map_err(|e| BackendError::Config(format!("TOML serialise error: {e}")))
    }

    /// Combines the caller's search-path additions with the configured
    /// ones, caller first.
    pub fn merged_path_additions(&self, caller: &[String]) -> Vec<String> {
        caller
            .iter()
            .chain(self.path_additions.iter())
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let o = RuntimeOptions::default();
        assert!(o.path_additions.is_empty());
        assert_eq!(o.python.symbol_promotion, SymbolPromotion::Auto);
        assert_eq!(o.python.load_entrypoint, "neuropod.loader:load_neuropod");
        assert!(o.python.library.is_none());
    }

    #[test]
    fn test_from_toml() {
        let toml = r#"
path_additions = ["/srv/lib"]

[python]
library = "libpython3.10.so"
symbol_promotion = "skip"
load_entrypoint = "fixture.loader:load"
"#;
        let o = RuntimeOptions::from_toml(toml).unwrap();
        assert_eq!(o.path_additions, vec!["/srv/lib".to_string()]);
        assert_eq!(o.python.library.as_deref(), Some("libpython3.10.so"));
        assert_eq!(o.python.symbol_promotion, SymbolPromotion::Skip);
        assert_eq!(o.python.load_entrypoint, "fixture.loader:load");
        // Unset keys keep their defaults.
        assert_eq!(
            o.python.normalize_entrypoint,
            PythonOptions::default().normalize_entrypoint
        );
    }

    #[test]
    fn test_from_toml_empty() {
        let o = RuntimeOptions::from_toml("").unwrap();
        assert_eq!(o, RuntimeOptions::default());
    }

    #[test]
    fn test_from_toml_bad_promotion() {
        let toml = "[python]\nsymbol_promotion = \"sometimes\"\n";
        assert!(matches!(
            RuntimeOptions::from_toml(toml),
            Err(BackendError::Config(_))
        ));
    }

    #[test]
    fn test_to_toml_roundtrip() {
        let mut o = RuntimeOptions::default();
        o.path_additions.push("/x".into());
        o.python.symbol_promotion = SymbolPromotion::Required;
        let toml = o.to_toml().unwrap();
        let back = RuntimeOptions::from_toml(&toml).unwrap();
        assert_eq!(back, o);
    }

    #[test]
    fn test_from_file_missing() {
        let err = RuntimeOptions::from_file(Path::new("/nope/options.toml")).unwrap_err();
        assert!(err.to_string().contains("/nope/options.toml"));
    }

    #[test]
    fn test_merged_path_additions() {
        let o = RuntimeOptions {
            path_additions: vec!["/cfg".into()],
            ..Default::default()
        };
        assert_eq!(
            o.merged_path_additions(&["/caller".to_string()]),
            vec!["/caller".to_string(), "/cfg".to_string()]
        );
    }

    #[test]
    fn test_entrypoint_parse() {
        let e = Entrypoint::parse("neuropod.loader:load_neuropod").unwrap();
        assert_eq!(e.module, "neuropod.loader");
        assert_eq!(e.attribute, "load_neuropod");
        assert_eq!(e.to_string(), "neuropod.loader:load_neuropod");

        assert!(Entrypoint::parse("no_colon").is_err());
        assert!(Entrypoint::parse(":attr").is_err());
        assert!(Entrypoint::parse("mod:").is_err());
        assert!(Entrypoint::parse("a:b:c").is_err());
    }
}
