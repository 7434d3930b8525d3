// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Inputs already converted to numpy arrays, waiting for one inference call.

use crate::convert;
use crate::runtime::PythonRuntime;
use backend_core::{BackendError, SealedValueMap};
use pyo3::prelude::*;
use pyo3::types::PyDict;
use std::any::Any;
use std::collections::BTreeSet;
use tensor_core::Tensor;

/// A Python dict of `name -> numpy.ndarray`.
///
/// Each map is independent; maps from one backend may be filled on
/// different threads at the same time. Sealing a name twice keeps the
/// last value.
pub struct SealedPythonValueMap {
    runtime: &'static PythonRuntime,
    dict: Option<Py<PyDict>>,
    names: BTreeSet<String>,
}

impl SealedPythonValueMap {
    pub(crate) fn new(runtime: &'static PythonRuntime) -> Self {
        let dict = runtime.lock().run(|py| PyDict::new_bound(py).unbind());
        Self {
            runtime,
            dict: Some(dict),
            names: BTreeSet::new(),
        }
    }

    /// Names sealed so far, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// The underlying dict. Callers must hold the execution lock.
    pub(crate) fn dict<'py>(&self, py: Python<'py>) -> Result<&Bound<'py, PyDict>, BackendError> {
        self.dict
            .as_ref()
            .map(|d| d.bind(py))
            .ok_or_else(|| BackendError::Inference("sealed map already released".into()))
    }
}

impl SealedValueMap for SealedPythonValueMap {
    fn seal(&mut self, name: &str, value: &Tensor) -> Result<(), BackendError> {
        self.runtime.lock().run(|py| {
            let dict = self.dict(py)?;
            convert::tensor_to_numpy(py, value)
                .and_then(|array| dict.set_item(name, array))
                .map_err(|e| BackendError::Inference(format!("failed to seal '{name}': {e}")))
        })?;
        self.names.insert(name.to_string());
        Ok(())
    }

    fn len(&self) -> usize {
        self.names.len()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Drop for SealedPythonValueMap {
    fn drop(&mut self) {
        if let Some(dict) = self.dict.take() {
            self.runtime.lock().run(move |_| drop(dict));
        }
    }
}

impl std::fmt::Debug for SealedPythonValueMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SealedPythonValueMap")
            .field("names", &self.names)
            .finish()
    }
}
