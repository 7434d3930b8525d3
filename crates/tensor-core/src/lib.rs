// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # tensor-core
//!
//! Host-side tensor types exchanged with model backends.
//!
//! This crate provides:
//! - [`Tensor`]: an owned n-dimensional tensor holding numeric bytes or strings.
//! - [`Shape`]: runtime shape descriptors.
//! - [`DType`]: supported element data types, named after their numpy equivalents.
//! - [`ValueMap`]: a set of named tensors, the unit of backend input and output.
//! - [`TensorAllocator`]: builds host tensors from outputs staged out of a backend.
//! - JSON conversion helpers for command-line use.
//!
//! No tensor math lives here; backends own all computation.

mod allocator;
mod dtype;
mod error;
pub mod json;
mod shape;
mod tensor;

pub use allocator::{DefaultTensorAllocator, RawTensor, TensorAllocator};
pub use dtype::DType;
pub use error::TensorError;
pub use shape::Shape;
pub use tensor::{Element, Tensor, TensorData};

/// Named tensors passed into or returned from a backend.
pub type ValueMap = std::collections::HashMap<String, Tensor>;
