// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for host tensor construction.

use crate::{DType, Shape};

/// Errors that can occur while building or reading host tensors.
#[derive(Debug, thiserror::Error)]
pub enum TensorError {
    /// The provided buffer size does not match the expected size for the given shape and dtype.
    #[error("buffer size mismatch for shape {shape}: expected {expected} bytes, got {actual}")]
    BufferSizeMismatch {
        shape: Shape,
        expected: usize,
        actual: usize,
    },

    /// The number of string elements does not match the shape.
    #[error("element count mismatch for shape {shape}: expected {expected}, got {actual}")]
    ElementCountMismatch {
        shape: Shape,
        expected: usize,
        actual: usize,
    },

    /// The payload kind does not match the declared dtype (bytes for a string tensor or vice versa).
    #[error("payload does not match dtype {dtype}")]
    PayloadMismatch { dtype: DType },

    /// The requested typed access does not match the tensor's dtype.
    #[error("dtype mismatch in {op}: tensor is {actual}, requested {requested}")]
    DTypeMismatch {
        op: &'static str,
        actual: DType,
        requested: DType,
    },

    /// A dtype name could not be mapped to a supported [`DType`].
    #[error("unsupported dtype '{0}'")]
    UnsupportedDType(String),

    /// A JSON tensor description could not be converted.
    #[error("invalid tensor '{name}': {detail}")]
    InvalidValue { name: String, detail: String },
}
