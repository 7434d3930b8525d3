// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Host tensor type.

use crate::{DType, Shape, TensorError};

/// The payload of a [`Tensor`].
#[derive(Debug, Clone, PartialEq)]
pub enum TensorData {
    /// Row-major native-endian element bytes for fixed-width dtypes.
    Bytes(Vec<u8>),
    /// One string per element, row-major, for [`DType::String`].
    Strings(Vec<String>),
}

/// Fixed-width element types with typed access into a [`Tensor`].
pub trait Element: Copy + Sized {
    /// The dtype this Rust type maps to.
    const DTYPE: DType;
    /// Width of one element in bytes.
    const WIDTH: usize;

    /// Appends the native-endian encoding of `self`.
    fn write_ne(self, out: &mut Vec<u8>);

    /// Decodes one element from exactly `WIDTH` native-endian bytes.
    fn read_ne(bytes: &[u8]) -> Self;
}

macro_rules! impl_element {
    ($($ty:ty => $dtype:expr),* $(,)?) => {
        $(
            impl Element for $ty {
                const DTYPE: DType = $dtype;
                const WIDTH: usize = std::mem::size_of::<$ty>();

                fn write_ne(self, out: &mut Vec<u8>) {
                    out.extend_from_slice(&self.to_ne_bytes());
                }

                fn read_ne(bytes: &[u8]) -> Self {
                    let mut buf = [0u8; std::mem::size_of::<$ty>()];
                    buf.copy_from_slice(bytes);
                    <$ty>::from_ne_bytes(buf)
                }
            }
        )*
    };
}

impl_element! {
    f32 => DType::Float32,
    f64 => DType::Float64,
    i8 => DType::Int8,
    i16 => DType::Int16,
    i32 => DType::Int32,
    i64 => DType::Int64,
    u8 => DType::Uint8,
    u16 => DType::Uint16,
    u32 => DType::Uint32,
    u64 => DType::Uint64,
}

/// An owned, n-dimensional host tensor.
///
/// `Tensor` is what callers hand to a backend and what a backend hands back.
/// Numeric data is stored as a flat native-endian byte buffer in row-major
/// order; text data as one `String` per element.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    shape: Shape,
    dtype: DType,
    data: TensorData,
}

impl Tensor {
    /// Creates a numeric tensor filled with zeros.
    ///
    /// String tensors are filled with empty strings.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::{Tensor, Shape, DType};
    /// let t = Tensor::zeros(Shape::matrix(2, 3), DType::Float32);
    /// assert_eq!(t.size_bytes(), 24);
    /// ```
    pub fn zeros(shape: Shape, dtype: DType) -> Self {
        let data = match shape.size_bytes(dtype) {
            Some(size) => TensorData::Bytes(vec![0u8; size]),
            None => TensorData::Strings(vec![String::new(); shape.num_elements()]),
        };
        Self { shape, dtype, data }
    }

    /// Creates a tensor from raw native-endian bytes.
    ///
    /// Returns an error for string dtypes or if the buffer size does not
    /// match `shape.size_bytes(dtype)`.
    pub fn from_bytes(shape: Shape, dtype: DType, data: Vec<u8>) -> Result<Self, TensorError> {
        let expected = shape
            .size_bytes(dtype)
            .ok_or(TensorError::PayloadMismatch { dtype })?;
        if data.len() != expected {
            return Err(TensorError::BufferSizeMismatch {
                shape,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            shape,
            dtype,
            data: TensorData::Bytes(data),
        })
    }

    /// Creates a string tensor.
    pub fn from_strings(shape: Shape, values: Vec<String>) -> Result<Self, TensorError> {
        let expected = shape.num_elements();
        if values.len() != expected {
            return Err(TensorError::ElementCountMismatch {
                shape,
                expected,
                actual: values.len(),
            });
        }
        Ok(Self {
            shape,
            dtype: DType::String,
            data: TensorData::Strings(values),
        })
    }

    /// Creates a tensor from a declared dtype and a payload of either kind.
    pub fn from_data(shape: Shape, dtype: DType, data: TensorData) -> Result<Self, TensorError> {
        match (dtype.is_string(), data) {
            (true, TensorData::Strings(values)) => Self::from_strings(shape, values),
            (false, TensorData::Bytes(bytes)) => Self::from_bytes(shape, dtype, bytes),
            _ => Err(TensorError::PayloadMismatch { dtype }),
        }
    }

    /// Creates a tensor from a slice of typed values.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::{Tensor, Shape};
    /// let t = Tensor::from_values(Shape::vector(3), &[1.0f32, 2.0, 3.0]).unwrap();
    /// assert_eq!(t.to_vec::<f32>().unwrap(), vec![1.0, 2.0, 3.0]);
    /// ```
    pub fn from_values<T: Element>(shape: Shape, values: &[T]) -> Result<Self, TensorError> {
        let expected = shape.num_elements();
        if values.len() != expected {
            return Err(TensorError::ElementCountMismatch {
                shape,
                expected,
                actual: values.len(),
            });
        }
        let mut bytes = Vec::with_capacity(values.len() * T::WIDTH);
        for &v in values {
            v.write_ne(&mut bytes);
        }
        Ok(Self {
            shape,
            dtype: T::DTYPE,
            data: TensorData::Bytes(bytes),
        })
    }

    /// Returns the tensor's shape.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Returns the tensor's data type.
    pub fn dtype(&self) -> DType {
        self.dtype
    }

    /// Returns the payload.
    pub fn data(&self) -> &TensorData {
        &self.data
    }

    /// Consumes the tensor, returning its shape, dtype and payload.
    pub fn into_parts(self) -> (Shape, DType, TensorData) {
        (self.shape, self.dtype, self.data)
    }

    /// Returns the number of elements.
    pub fn num_elements(&self) -> usize {
        self.shape.num_elements()
    }

    /// Returns the raw bytes of a numeric tensor, `None` for strings.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match &self.data {
            TensorData::Bytes(bytes) => Some(bytes),
            TensorData::Strings(_) => None,
        }
    }

    /// Returns the elements of a string tensor, `None` for numeric tensors.
    pub fn as_strings(&self) -> Option<&[String]> {
        match &self.data {
            TensorData::Strings(values) => Some(values),
            TensorData::Bytes(_) => None,
        }
    }

    /// Returns the payload size in bytes (UTF-8 length for string tensors).
    pub fn size_bytes(&self) -> usize {
        match &self.data {
            TensorData::Bytes(bytes) => bytes.len(),
            TensorData::Strings(values) => values.iter().map(String::len).sum(),
        }
    }

    /// Copies the elements out as typed values.
    ///
    /// Fails if `T` does not match the tensor's dtype.
    pub fn to_vec<T: Element>(&self) -> Result<Vec<T>, TensorError> {
        let mismatch = TensorError::DTypeMismatch {
            op: "to_vec",
            actual: self.dtype,
            requested: T::DTYPE,
        };
        if self.dtype != T::DTYPE {
            return Err(mismatch);
        }
        let bytes = self.as_bytes().ok_or(mismatch)?;
        Ok(bytes.chunks_exact(T::WIDTH).map(T::read_ne).collect())
    }
}
