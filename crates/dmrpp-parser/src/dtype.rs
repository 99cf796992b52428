//! DAP4 atomic types and their array dtype equivalents.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::DmrppError;

/// The fixed set of DAP4 atomic types a DMR++ variable or attribute may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DapType {
    Byte,
    UByte,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Url,
    Float32,
    Float64,
    String,
}

/// Array element type the DAP type maps onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    UInt8,
    Int8,
    UInt16,
    Int16,
    UInt32,
    Int32,
    UInt64,
    Int64,
    Float32,
    Float64,
    /// Variable-length strings, stored as object references.
    Object,
}

impl DapType {
    pub const ALL: [DapType; 14] = [
        DapType::Byte,
        DapType::UByte,
        DapType::Int8,
        DapType::UInt8,
        DapType::Int16,
        DapType::UInt16,
        DapType::Int32,
        DapType::UInt32,
        DapType::Int64,
        DapType::UInt64,
        DapType::Url,
        DapType::Float32,
        DapType::Float64,
        DapType::String,
    ];

    /// Element name used in the DMR++ document.
    pub fn as_str(&self) -> &'static str {
        match self {
            DapType::Byte => "Byte",
            DapType::UByte => "UByte",
            DapType::Int8 => "Int8",
            DapType::UInt8 => "UInt8",
            DapType::Int16 => "Int16",
            DapType::UInt16 => "UInt16",
            DapType::Int32 => "Int32",
            DapType::UInt32 => "UInt32",
            DapType::Int64 => "Int64",
            DapType::UInt64 => "UInt64",
            DapType::Url => "Url",
            DapType::Float32 => "Float32",
            DapType::Float64 => "Float64",
            DapType::String => "String",
        }
    }

    /// Look up a type by its element name, `None` if it is not a DAP atomic type.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.as_str() == name)
    }

    pub fn data_type(&self) -> DataType {
        match self {
            DapType::Byte | DapType::UByte | DapType::UInt8 => DataType::UInt8,
            DapType::Int8 => DataType::Int8,
            DapType::Int16 => DataType::Int16,
            DapType::UInt16 => DataType::UInt16,
            DapType::Int32 => DataType::Int32,
            DapType::UInt32 => DataType::UInt32,
            DapType::Int64 => DataType::Int64,
            DapType::UInt64 => DataType::UInt64,
            DapType::Float32 => DataType::Float32,
            DapType::Float64 => DataType::Float64,
            DapType::Url | DapType::String => DataType::Object,
        }
    }
}

impl FromStr for DapType {
    type Err = DmrppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| DmrppError::UnknownDapType(s.to_string()))
    }
}

impl fmt::Display for DapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl DataType {
    /// Width of one element in bytes. Object references are pointer sized.
    pub fn item_size(&self) -> usize {
        match self {
            DataType::UInt8 | DataType::Int8 => 1,
            DataType::UInt16 | DataType::Int16 => 2,
            DataType::UInt32 | DataType::Int32 | DataType::Float32 => 4,
            DataType::UInt64 | DataType::Int64 | DataType::Float64 | DataType::Object => 8,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::UInt8 => "uint8",
            DataType::Int8 => "int8",
            DataType::UInt16 => "uint16",
            DataType::Int16 => "int16",
            DataType::UInt32 => "uint32",
            DataType::Int32 => "int32",
            DataType::UInt64 => "uint64",
            DataType::Int64 => "int64",
            DataType::Float32 => "float32",
            DataType::Float64 => "float64",
            DataType::Object => "object",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
