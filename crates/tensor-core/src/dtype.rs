// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Supported tensor element data types.

/// Enumerates the element types a [`crate::Tensor`] can hold.
///
/// Every variant except [`DType::String`] is a fixed-width numeric type
/// stored as raw native-endian bytes. String tensors carry one UTF-8
/// string per element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DType {
    Float32,
    Float64,
    Float16,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Bool,
    /// Variable-length UTF-8 text.
    String,
}

impl DType {
    /// All supported data types.
    pub const ALL: [DType; 13] = [
        DType::Float32,
        DType::Float64,
        DType::Float16,
        DType::Int8,
        DType::Int16,
        DType::Int32,
        DType::Int64,
        DType::Uint8,
        DType::Uint16,
        DType::Uint32,
        DType::Uint64,
        DType::Bool,
        DType::String,
    ];

    /// Returns the size of a single element in bytes, or `None` for strings.
    pub fn size_bytes(self) -> Option<usize> {
        match self {
            DType::Float64 | DType::Int64 | DType::Uint64 => Some(8),
            DType::Float32 | DType::Int32 | DType::Uint32 => Some(4),
            DType::Float16 | DType::Int16 | DType::Uint16 => Some(2),
            DType::Int8 | DType::Uint8 | DType::Bool => Some(1),
            DType::String => None,
        }
    }

    /// Returns `true` for text tensors.
    pub fn is_string(self) -> bool {
        matches!(self, DType::String)
    }

    /// Returns the canonical name, which is also the numpy dtype name for
    /// numeric types (`"float32"`, `"int64"`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            DType::Float32 => "float32",
            DType::Float64 => "float64",
            DType::Float16 => "float16",
            DType::Int8 => "int8",
            DType::Int16 => "int16",
            DType::Int32 => "int32",
            DType::Int64 => "int64",
            DType::Uint8 => "uint8",
            DType::Uint16 => "uint16",
            DType::Uint32 => "uint32",
            DType::Uint64 => "uint64",
            DType::Bool => "bool",
            DType::String => "string",
        }
    }

    /// Parses a dtype name. Accepts the canonical names plus the short
    /// aliases found in model configs (`"f32"`, `"i64"`, `"str"`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        let dtype = match name.trim().to_ascii_lowercase().as_str() {
            "float32" | "f32" | "float" => DType::Float32,
            "float64" | "f64" | "double" => DType::Float64,
            "float16" | "f16" | "half" => DType::Float16,
            "int8" | "i8" => DType::Int8,
            "int16" | "i16" => DType::Int16,
            "int32" | "i32" => DType::Int32,
            "int64" | "i64" => DType::Int64,
            "uint8" | "u8" => DType::Uint8,
            "uint16" | "u16" => DType::Uint16,
            "uint32" | "u32" => DType::Uint32,
            "uint64" | "u64" => DType::Uint64,
            "bool" => DType::Bool,
            "string" | "str" => DType::String,
            _ => return None,
        };
        Some(dtype)
    }
}

impl std::fmt::Display for DType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_roundtrip() {
        for dtype in DType::ALL {
            assert_eq!(DType::from_name(dtype.as_str()), Some(dtype));
        }
    }

    #[test]
    fn test_aliases() {
        assert_eq!(DType::from_name("f32"), Some(DType::Float32));
        assert_eq!(DType::from_name(" I64 "), Some(DType::Int64));
        assert_eq!(DType::from_name("str"), Some(DType::String));
        assert_eq!(DType::from_name("complex64"), None);
    }

    #[test]
    fn test_sizes() {
        assert_eq!(DType::Float64.size_bytes(), Some(8));
        assert_eq!(DType::Float16.size_bytes(), Some(2));
        assert_eq!(DType::Bool.size_bytes(), Some(1));
        assert_eq!(DType::String.size_bytes(), None);
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&DType::Uint16).unwrap();
        assert_eq!(json, "\"uint16\"");
        let back: DType = serde_json::from_str("\"string\"").unwrap();
        assert_eq!(back, DType::String);
    }
}
