// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The uniform contract every execution backend implements.
//!
//! ```text
//! backend.get_sealed_map()      -> Box<dyn SealedValueMap>
//!     │  .seal(name, tensor)   (repeat per input)
//!     ▼
//! backend.infer(&sealed)        -> ValueMap
//! ```
//!
//! Sealing converts host tensors into whatever representation the backend
//! executes on, so a backend can do the conversion as inputs arrive and
//! keep the inference call itself short.

use crate::BackendError;
use std::any::Any;
use tensor_core::{Tensor, ValueMap};

/// Backend-specific container of named, converted inputs for one call.
///
/// Sealing the same name twice replaces the earlier value without error.
pub trait SealedValueMap: Send + std::fmt::Debug {
    /// Converts `value` into the backend's representation and stores it
    /// under `name`.
    fn seal(&mut self, name: &str, value: &Tensor) -> Result<(), BackendError>;

    /// Number of sealed entries.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Access to the concrete type, for the backend that created the map.
    fn as_any(&self) -> &dyn Any;
}

/// An execution backend holding one loaded model.
///
/// Backends are shared across threads; implementations serialise whatever
/// internal state needs it.
pub trait Backend: Send + Sync {
    /// Execution kind this backend was registered under (e.g. `"python"`).
    fn kind(&self) -> &str;

    /// Returns a fresh, empty sealed map for this backend.
    fn get_sealed_map(&self) -> Result<Box<dyn SealedValueMap>, BackendError>;

    /// Runs the model on previously sealed inputs.
    ///
    /// Returns no partial results: either every output or an error.
    fn infer(&self, inputs: &dyn SealedValueMap) -> Result<ValueMap, BackendError>;

    /// Seals every entry of `inputs` into a fresh map and runs the model.
    fn infer_values(&self, inputs: &ValueMap) -> Result<ValueMap, BackendError> {
        let mut sealed = self.get_sealed_map()?;
        for (name, value) in inputs {
            sealed.seal(name, value)?;
        }
        self.infer(sealed.as_ref())
    }
}

impl std::fmt::Debug for dyn Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backend").field("kind", &self.kind()).finish()
    }
}
