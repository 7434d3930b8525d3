// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Integration tests: manifest-driven dispatch through the registry.

use backend_core::{Backend, BackendError, BackendRegistry, RuntimeOptions, SealedValueMap};
use std::any::Any;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tensor_core::{Tensor, ValueMap};

#[derive(Debug, Default)]
struct NullMap(usize);

impl SealedValueMap for NullMap {
    fn seal(&mut self, _: &str, _: &Tensor) -> Result<(), BackendError> {
        self.0 += 1;
        Ok(())
    }

    fn len(&self) -> usize {
        self.0
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

struct PlatformBackend(String);

impl Backend for PlatformBackend {
    fn kind(&self) -> &str {
        &self.0
    }

    fn get_sealed_map(&self) -> Result<Box<dyn SealedValueMap>, BackendError> {
        Ok(Box::new(NullMap::default()))
    }

    fn infer(&self, _: &dyn SealedValueMap) -> Result<ValueMap, BackendError> {
        Ok(ValueMap::new())
    }
}

fn write_manifest(dir: &Path, platform: &str) {
    let json = format!(
        r#"{{ "name": "m", "platform": "{platform}",
              "input_spec": [{{ "name": "x", "dtype": "float32", "shape": [1] }}],
              "output_spec": [] }}"#
    );
    std::fs::write(dir.join("config.json"), json).unwrap();
}

fn registry_with_counter(hits: Arc<AtomicUsize>) -> BackendRegistry {
    let mut registry = BackendRegistry::new();
    for platform in ["pytorch", "tensorflow"] {
        let hits = hits.clone();
        registry.register("python", platform, move |_: &Path, _: &RuntimeOptions, _: &[String]| {
            hits.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(PlatformBackend(format!("python/{platform}"))) as Box<dyn Backend>)
        });
    }
    registry
}

#[test]
fn test_dispatch_on_manifest_platform() {
    let dir = tempfile::tempdir().unwrap();
    write_manifest(dir.path(), "tensorflow");

    let hits = Arc::new(AtomicUsize::new(0));
    let registry = registry_with_counter(hits.clone());
    let backend = registry
        .create_for_manifest("python", dir.path(), &RuntimeOptions::default(), &[])
        .unwrap();

    assert_eq!(backend.kind(), "python/tensorflow");
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn test_manifest_platform_not_registered() {
    let dir = tempfile::tempdir().unwrap();
    write_manifest(dir.path(), "onnx");

    let registry = registry_with_counter(Arc::new(AtomicUsize::new(0)));
    let err = registry
        .create_for_manifest("python", dir.path(), &RuntimeOptions::default(), &[])
        .unwrap_err();
    match err {
        BackendError::UnregisteredBackend { kind, platform } => {
            assert_eq!(kind, "python");
            assert_eq!(platform, "onnx");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_missing_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let registry = registry_with_counter(Arc::new(AtomicUsize::new(0)));
    let err = registry
        .create_for_manifest("python", dir.path(), &RuntimeOptions::default(), &[])
        .unwrap_err();
    assert!(matches!(err, BackendError::Loader(_)));
}

#[test]
fn test_sealed_map_counts() {
    let backend = PlatformBackend("x".into());
    let mut sealed = backend.get_sealed_map().unwrap();
    assert!(sealed.is_empty());
    sealed
        .seal("a", &Tensor::zeros(tensor_core::Shape::scalar(), tensor_core::DType::Int8))
        .unwrap();
    assert_eq!(sealed.len(), 1);
}
