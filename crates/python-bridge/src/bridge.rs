// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The Python execution backend.
//!
//! Construction sequence:
//! 1. merge search-path additions into the environment;
//! 2. start the interpreter (once per process);
//! 3. under the execution lock: sync `sys.path`, resolve the load and
//!    normalize entrypoints, make the model local, call the loader.
//!
//! Inference runs the model and the output normalizer under one lock
//! acquisition and builds host tensors after releasing it.

use crate::env;
use crate::runtime::PythonRuntime;
use crate::sealed::SealedPythonValueMap;
use backend_core::{
    Backend, BackendError, BackendRegistry, Entrypoint, RuntimeOptions, SealedValueMap,
};
use model_loader::ModelLoader;
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tensor_core::{DefaultTensorAllocator, RawTensor, TensorAllocator, ValueMap};

/// Execution kind served by this backend.
pub const EXECUTION_KIND: &str = "python";

/// Model platforms executed by the Python backend.
pub const PLATFORMS: [&str; 3] = ["python", "pytorch", "tensorflow"];

/// Registers the Python backend for every platform in [`PLATFORMS`].
pub fn register(registry: &mut BackendRegistry) {
    for platform in PLATFORMS {
        registry.register(
            EXECUTION_KIND,
            platform,
            |path: &Path, options: &RuntimeOptions, additions: &[String]| {
                PythonBridge::new(path, options, additions).map(|b| Box::new(b) as Box<dyn Backend>)
            },
        );
    }
}

/// A model loaded into the embedded interpreter.
pub struct PythonBridge {
    runtime: &'static PythonRuntime,
    model: Option<Py<PyAny>>,
    normalizer: Option<Py<PyAny>>,
    allocator: Arc<dyn TensorAllocator>,
    local_path: PathBuf,
    // Keeps extracted archives on disk for the model's lifetime.
    _loader: Box<dyn ModelLoader>,
}

impl PythonBridge {
    /// Loads the model at `model_path`, with `path_additions` searched
    /// before the configured ones.
    pub fn new(
        model_path: &Path,
        options: &RuntimeOptions,
        path_additions: &[String],
    ) -> Result<Self, BackendError> {
        Self::with_allocator(
            model_path,
            options,
            path_additions,
            Arc::new(DefaultTensorAllocator),
        )
    }

    /// Like [`PythonBridge::new`], building outputs with `allocator`.
    pub fn with_allocator(
        model_path: &Path,
        options: &RuntimeOptions,
        path_additions: &[String],
        allocator: Arc<dyn TensorAllocator>,
    ) -> Result<Self, BackendError> {
        let start = Instant::now();
        let additions = options.merged_path_additions(path_additions);
        env::prepend_search_path(env::SEARCH_PATH_VAR, &additions);

        let runtime = PythonRuntime::global();
        runtime.ensure_started(&options.python)?;

        let load_entrypoint = Entrypoint::parse(&options.python.load_entrypoint)?;
        let normalize_entrypoint = Entrypoint::parse(&options.python.normalize_entrypoint)?;
        let loader = model_loader::loader_for(model_path);

        let (model, normalizer, local_path) = runtime.lock().run(|py| {
            sync_sys_path(py, &additions).map_err(|e| {
                BackendError::Initialization(format!("cannot update sys.path: {}", describe(py, &e)))
            })?;
            let load = resolve(py, &load_entrypoint)?;
            let normalizer = resolve(py, &normalize_entrypoint)?;

            let local_path = loader.ensure_local().map_err(|e| BackendError::Load {
                path: model_path.to_path_buf(),
                detail: e.to_string(),
            })?;
            let path_arg = local_path.to_string_lossy().into_owned();
            let model = load.call1((path_arg,)).map_err(|e| BackendError::Load {
                path: local_path.clone(),
                detail: describe(py, &e),
            })?;
            Ok::<_, BackendError>((model.unbind(), normalizer.unbind(), local_path))
        })?;

        tracing::info!(
            "python bridge: loaded '{}' via {} in {:.1} ms",
            local_path.display(),
            load_entrypoint,
            start.elapsed().as_secs_f64() * 1000.0,
        );
        Ok(Self {
            runtime,
            model: Some(model),
            normalizer: Some(normalizer),
            allocator,
            local_path,
            _loader: loader,
        })
    }

    /// Local directory the model was loaded from.
    pub fn local_path(&self) -> &Path {
        &self.local_path
    }

    fn run_model(&self, inputs: &SealedPythonValueMap) -> Result<Vec<RawTensor>, BackendError> {
        self.runtime.lock().run(|py| {
            let (Some(model), Some(normalizer)) = (&self.model, &self.normalizer) else {
                return Err(BackendError::Inference("model already released".into()));
            };
            let raw = model
                .bind(py)
                .call_method1("infer", (inputs.dict(py)?,))
                .map_err(|e| BackendError::Inference(format!("model raised {}", describe(py, &e))))?;
            let normalized = normalizer.bind(py).call1((raw,)).map_err(|e| {
                BackendError::Inference(format!("output normalization raised {}", describe(py, &e)))
            })?;
            let outputs = normalized.downcast::<PyDict>().map_err(|_| {
                BackendError::Inference(format!(
                    "model returned {}, expected a dict of arrays",
                    normalized.get_type()
                ))
            })?;
            crate::convert::stage_outputs(py, outputs)
                .map_err(|e| BackendError::Inference(describe(py, &e)))
        })
    }
}

impl Backend for PythonBridge {
    fn kind(&self) -> &str {
        EXECUTION_KIND
    }

    fn get_sealed_map(&self) -> Result<Box<dyn SealedValueMap>, BackendError> {
        Ok(Box::new(SealedPythonValueMap::new(self.runtime)))
    }

    fn infer(&self, inputs: &dyn SealedValueMap) -> Result<ValueMap, BackendError> {
        let inputs = inputs
            .as_any()
            .downcast_ref::<SealedPythonValueMap>()
            .ok_or_else(|| {
                BackendError::Inference(format!(
                    "sealed map {inputs:?} was not created by the python backend"
                ))
            })?;

        let start = Instant::now();
        let staged = self.run_model(inputs)?;
        let outputs = self.allocator.from_native_container(staged)?;
        tracing::debug!(
            "python bridge: inference with {} inputs -> {} outputs in {:.2} ms",
            inputs.len(),
            outputs.len(),
            start.elapsed().as_secs_f64() * 1000.0,
        );
        Ok(outputs)
    }
}

impl Drop for PythonBridge {
    fn drop(&mut self) {
        let normalizer = self.normalizer.take();
        let model = self.model.take();
        if normalizer.is_none() && model.is_none() {
            return;
        }
        self.runtime.lock().run(move |_| {
            drop(normalizer);
            drop(model);
        });
        tracing::debug!("python bridge: released model '{}'", self.local_path.display());
    }
}

impl std::fmt::Debug for PythonBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PythonBridge")
            .field("local_path", &self.local_path)
            .field("loaded", &self.model.is_some())
            .finish()
    }
}

/// Imports `entrypoint.module` and fetches the callable attribute.
fn resolve<'py>(py: Python<'py>, entrypoint: &Entrypoint) -> Result<Bound<'py, PyAny>, BackendError> {
    let fail = |detail: String| BackendError::Resolution {
        entrypoint: entrypoint.to_string(),
        detail,
    };
    let module = py
        .import_bound(entrypoint.module.as_str())
        .map_err(|e| fail(describe(py, &e)))?;
    let attr = module
        .getattr(entrypoint.attribute.as_str())
        .map_err(|e| fail(describe(py, &e)))?;
    if !attr.is_callable() {
        return Err(fail(format!("{} is not callable", attr.get_type())));
    }
    Ok(attr)
}

/// Puts `additions` at the front of `sys.path`, in order, skipping entries
/// already present. `PYTHONPATH` is only read when the interpreter starts.
fn sync_sys_path(py: Python<'_>, additions: &[String]) -> PyResult<()> {
    let sys_path = py.import_bound("sys")?.getattr("path")?;
    let sys_path = sys_path.downcast::<PyList>()?;
    for dir in additions.iter().rev() {
        if dir.is_empty() || sys_path.contains(dir)? {
            continue;
        }
        sys_path.insert(0, dir)?;
    }
    Ok(())
}

/// Formats a Python exception; the traceback goes to the debug log.
fn describe(py: Python<'_>, err: &PyErr) -> String {
    if let Some(tb) = err.traceback_bound(py) {
        if let Ok(formatted) = tb.format() {
            tracing::debug!("python bridge: traceback:\n{formatted}");
        }
    }
    err.to_string()
}
