// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Conversion between host tensors and numpy arrays.
//!
//! Both directions must run inside the execution lock. Host→numpy copies
//! the tensor's bytes into a fresh buffer owned by the interpreter, so the
//! array never aliases host memory. Numpy→host only stages the data into
//! [`RawTensor`]s; building host tensors from them happens after the lock
//! is released.

use pyo3::exceptions::{PyTypeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyByteArray, PyBytes, PyDict, PyList, PyTuple};
use tensor_core::{DType, RawTensor, Tensor, TensorData};

/// Copies `tensor` into a new numpy array with the same dtype and shape.
///
/// String tensors become unicode arrays (`dtype.kind == 'U'`).
pub fn tensor_to_numpy<'py>(py: Python<'py>, tensor: &Tensor) -> PyResult<Bound<'py, PyAny>> {
    let numpy = py.import_bound("numpy")?;
    let shape = PyTuple::new_bound(py, tensor.shape().dims());

    match tensor.data() {
        TensorData::Strings(values) => {
            let list = PyList::new_bound(py, values);
            let kwargs = PyDict::new_bound(py);
            kwargs.set_item("dtype", numpy.getattr("str_")?)?;
            let flat = numpy.getattr("array")?.call((list,), Some(&kwargs))?;
            flat.call_method1("reshape", (shape,))
        }
        TensorData::Bytes(bytes) if bytes.is_empty() => numpy
            .getattr("zeros")?
            .call1((shape, tensor.dtype().as_str())),
        TensorData::Bytes(bytes) => {
            let buffer = PyByteArray::new_bound(py, bytes);
            let kwargs = PyDict::new_bound(py);
            kwargs.set_item("dtype", tensor.dtype().as_str())?;
            let flat = numpy.getattr("frombuffer")?.call((buffer,), Some(&kwargs))?;
            flat.call_method1("reshape", (shape,))
        }
    }
}

/// Stages every entry of an output dict for host allocation.
///
/// Keys must be strings and values numpy arrays. Numeric arrays are copied
/// in C order and native byte order; unicode, bytes and object arrays of
/// text become string tensors.
pub fn stage_outputs(py: Python<'_>, outputs: &Bound<'_, PyDict>) -> PyResult<Vec<RawTensor>> {
    let numpy = py.import_bound("numpy")?;
    let ndarray = numpy.getattr("ndarray")?;

    let mut staged = Vec::with_capacity(outputs.len());
    for (key, value) in outputs.iter() {
        let name: String = key
            .extract()
            .map_err(|_| PyTypeError::new_err(format!("output key {key} is not a string")))?;
        if !value.is_instance(&ndarray)? {
            return Err(PyTypeError::new_err(format!(
                "output '{name}' is {}, expected numpy.ndarray",
                value.get_type()
            )));
        }
        let raw = stage_array(name.clone(), &value)
            .map_err(|e| PyValueError::new_err(format!("output '{name}': {e}")))?;
        staged.push(raw);
    }
    Ok(staged)
}

fn stage_array(name: String, array: &Bound<'_, PyAny>) -> PyResult<RawTensor> {
    let shape: Vec<usize> = array.getattr("shape")?.extract()?;
    let dtype = array.getattr("dtype")?;
    let kind: String = dtype.getattr("kind")?.extract()?;

    if matches!(kind.as_str(), "U" | "S" | "O") {
        return Ok(RawTensor {
            name,
            dtype: DType::String,
            shape,
            data: TensorData::Strings(text_items(array)?),
        });
    }

    let dtype_name: String = dtype.getattr("name")?.extract()?;
    let host_dtype = DType::from_name(&dtype_name)
        .filter(|d| !d.is_string())
        .ok_or_else(|| PyTypeError::new_err(format!("unsupported dtype '{dtype_name}'")))?;

    let native = dtype.call_method1("newbyteorder", ("=",))?;
    let kwargs = PyDict::new_bound(array.py());
    kwargs.set_item("copy", false)?;
    let native_array = array.call_method("astype", (native,), Some(&kwargs))?;
    let bytes = native_array.call_method0("tobytes")?;
    let bytes = bytes.downcast::<PyBytes>()?.as_bytes().to_vec();

    Ok(RawTensor {
        name,
        dtype: host_dtype,
        shape,
        data: TensorData::Bytes(bytes),
    })
}

fn text_items(array: &Bound<'_, PyAny>) -> PyResult<Vec<String>> {
    let items = array.call_method0("ravel")?.call_method0("tolist")?;
    let items = items.downcast::<PyList>()?;
    items
        .iter()
        .map(|item| match item.downcast::<PyBytes>() {
            Ok(bytes) => String::from_utf8(bytes.as_bytes().to_vec())
                .map_err(|e| PyValueError::new_err(format!("bytes element is not UTF-8: {e}"))),
            Err(_) => item.extract::<String>(),
        })
        .collect()
}
