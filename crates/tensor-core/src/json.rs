// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! JSON form of host tensors, used for CLI inputs and outputs.
//!
//! # Format
//! ```json
//! {
//!   "x": { "dtype": "float32", "shape": [2, 2], "data": [1, 2, 3, 4] },
//!   "names": { "dtype": "string", "shape": [2], "data": ["a", "b"] }
//! }
//! ```
//! `data` is the flattened row-major element list.

use crate::{DType, Element, Shape, Tensor, TensorError, ValueMap};
use serde_json::Value;
use std::collections::BTreeMap;

/// A single tensor in JSON form.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TensorJson {
    pub dtype: DType,
    pub shape: Vec<usize>,
    pub data: Vec<Value>,
}

impl TensorJson {
    /// Converts into a host tensor, checking every element against the dtype.
    pub fn into_tensor(self, name: &str) -> Result<Tensor, TensorError> {
        let invalid = |detail: String| TensorError::InvalidValue {
            name: name.to_string(),
            detail,
        };
        let shape = Shape::new(self.shape);
        match self.dtype {
            DType::String => {
                let values = self
                    .data
                    .into_iter()
                    .map(|v| match v {
                        Value::String(s) => Ok(s),
                        other => Err(invalid(format!("expected string, got {other}"))),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Tensor::from_strings(shape, values)
            }
            DType::Bool => {
                let bytes = self
                    .data
                    .iter()
                    .map(|v| v.as_bool().map(u8::from))
                    .collect::<Option<Vec<_>>>()
                    .ok_or_else(|| invalid("expected booleans".into()))?;
                Tensor::from_bytes(shape, DType::Bool, bytes)
            }
            DType::Float32 => typed(shape, &self.data, |v| v.as_f64().map(|f| f as f32), name),
            DType::Float64 => typed(shape, &self.data, Value::as_f64, name),
            DType::Int8 => typed(shape, &self.data, |v| int(v).and_then(|i| i8::try_from(i).ok()), name),
            DType::Int16 => typed(shape, &self.data, |v| int(v).and_then(|i| i16::try_from(i).ok()), name),
            DType::Int32 => typed(shape, &self.data, |v| int(v).and_then(|i| i32::try_from(i).ok()), name),
            DType::Int64 => typed(shape, &self.data, int, name),
            DType::Uint8 => typed(shape, &self.data, |v| uint(v).and_then(|i| u8::try_from(i).ok()), name),
            DType::Uint16 => typed(shape, &self.data, |v| uint(v).and_then(|i| u16::try_from(i).ok()), name),
            DType::Uint32 => typed(shape, &self.data, |v| uint(v).and_then(|i| u32::try_from(i).ok()), name),
            DType::Uint64 => typed(shape, &self.data, uint, name),
            DType::Float16 => Err(TensorError::UnsupportedDType("float16 in JSON".into())),
        }
    }

    /// Converts a host tensor into JSON form.
    pub fn from_tensor(tensor: &Tensor) -> Result<Self, TensorError> {
        let data: Vec<Value> = match tensor.dtype() {
            DType::String => tensor
                .as_strings()
                .unwrap_or_default()
                .iter()
                .cloned()
                .map(Value::String)
                .collect(),
            DType::Bool => tensor
                .as_bytes()
                .unwrap_or_default()
                .iter()
                .map(|&b| Value::Bool(b != 0))
                .collect(),
            DType::Float32 => to_values(tensor.to_vec::<f32>()?),
            DType::Float64 => to_values(tensor.to_vec::<f64>()?),
            DType::Int8 => to_values(tensor.to_vec::<i8>()?),
            DType::Int16 => to_values(tensor.to_vec::<i16>()?),
            DType::Int32 => to_values(tensor.to_vec::<i32>()?),
            DType::Int64 => to_values(tensor.to_vec::<i64>()?),
            DType::Uint8 => to_values(tensor.to_vec::<u8>()?),
            DType::Uint16 => to_values(tensor.to_vec::<u16>()?),
            DType::Uint32 => to_values(tensor.to_vec::<u32>()?),
            DType::Uint64 => to_values(tensor.to_vec::<u64>()?),
            DType::Float16 => return Err(TensorError::UnsupportedDType("float16 in JSON".into())),
        };
        Ok(Self {
            dtype: tensor.dtype(),
            shape: tensor.shape().dims().to_vec(),
            data,
        })
    }
}

/// Parses a JSON object of named tensors into a [`ValueMap`].
pub fn values_from_json(json: &str) -> Result<ValueMap, TensorError> {
    let parsed: BTreeMap<String, TensorJson> =
        serde_json::from_str(json).map_err(|e| TensorError::InvalidValue {
            name: "<document>".into(),
            detail: e.to_string(),
        })?;
    parsed
        .into_iter()
        .map(|(name, t)| t.into_tensor(&name).map(|tensor| (name, tensor)))
        .collect()
}

/// Renders a [`ValueMap`] as a JSON object with keys in sorted order.
pub fn values_to_json(values: &ValueMap) -> Result<Value, TensorError> {
    let sorted: BTreeMap<&String, TensorJson> = values
        .iter()
        .map(|(name, t)| TensorJson::from_tensor(t).map(|j| (name, j)))
        .collect::<Result<_, _>>()?;
    serde_json::to_value(sorted).map_err(|e| TensorError::InvalidValue {
        name: "<document>".into(),
        detail: e.to_string(),
    })
}

fn typed<T: Element>(
    shape: Shape,
    data: &[Value],
    convert: impl Fn(&Value) -> Option<T>,
    name: &str,
) -> Result<Tensor, TensorError> {
    let values = data
        .iter()
        .map(|v| {
            convert(v).ok_or_else(|| TensorError::InvalidValue {
                name: name.to_string(),
                detail: format!("{v} is not a valid {}", T::DTYPE),
            })
        })
        .collect::<Result<Vec<T>, _>>()?;
    Tensor::from_values(shape, &values)
}

fn int(v: &Value) -> Option<i64> {
    v.as_i64()
}

fn uint(v: &Value) -> Option<u64> {
    v.as_u64()
}

fn to_values<T: Into<Value>>(values: Vec<T>) -> Vec<Value> {
    values.into_iter().map(Into::into).collect()
}
