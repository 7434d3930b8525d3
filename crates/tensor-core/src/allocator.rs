// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Host-side tensor allocation from staged backend outputs.
//!
//! Backends that execute inside a foreign runtime first copy each output
//! out of that runtime into a [`RawTensor`] while they still have access
//! to it. The [`TensorAllocator`] then turns the staged outputs into host
//! [`Tensor`]s without touching the foreign runtime at all.

use crate::{DType, Shape, Tensor, TensorData, TensorError, ValueMap};

/// One output copied out of a backend's native container.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTensor {
    pub name: String,
    pub dtype: DType,
    pub shape: Vec<usize>,
    pub data: TensorData,
}

/// Builds host tensors from staged native outputs.
pub trait TensorAllocator: Send + Sync {
    /// Converts a full set of staged outputs into a [`ValueMap`].
    ///
    /// Later entries with a duplicate name replace earlier ones.
    fn from_native_container(&self, container: Vec<RawTensor>) -> Result<ValueMap, TensorError>;
}

/// Allocator that validates each staged output and moves its payload into
/// an owned [`Tensor`].
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultTensorAllocator;

impl TensorAllocator for DefaultTensorAllocator {
    fn from_native_container(&self, container: Vec<RawTensor>) -> Result<ValueMap, TensorError> {
        let mut values = ValueMap::with_capacity(container.len());
        for raw in container {
            let tensor = Tensor::from_data(Shape::new(raw.shape), raw.dtype, raw.data).map_err(
                |e| TensorError::InvalidValue {
                    name: raw.name.clone(),
                    detail: e.to_string(),
                },
            )?;
            values.insert(raw.name, tensor);
        }
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_f32(name: &str, shape: Vec<usize>, values: &[f32]) -> RawTensor {
        let data = values.iter().flat_map(|v| v.to_ne_bytes()).collect();
        RawTensor {
            name: name.into(),
            dtype: DType::Float32,
            shape,
            data: TensorData::Bytes(data),
        }
    }

    #[test]
    fn test_allocates_all_outputs() {
        let staged = vec![
            raw_f32("a", vec![2], &[1.0, 2.0]),
            RawTensor {
                name: "s".into(),
                dtype: DType::String,
                shape: vec![1],
                data: TensorData::Strings(vec!["hi".into()]),
            },
        ];
        let values = DefaultTensorAllocator.from_native_container(staged).unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values["a"].to_vec::<f32>().unwrap(), vec![1.0, 2.0]);
        assert_eq!(values["s"].as_strings().unwrap(), &["hi".to_string()]);
    }

    #[test]
    fn test_rejects_bad_payload_with_name() {
        let staged = vec![raw_f32("broken", vec![3], &[1.0])];
        let err = DefaultTensorAllocator
            .from_native_container(staged)
            .unwrap_err();
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn test_empty_container() {
        let values = DefaultTensorAllocator.from_native_container(vec![]).unwrap();
        assert!(values.is_empty());
    }
}
