//! Casting of DMR++ `<Attribute>` elements into native values.

use indexmap::IndexMap;
use serde::Serialize;

use crate::dtype::{DapType, DataType};
use crate::error::{DmrppError, DmrppResult};
use crate::xml::{Element, XmlNamespace};

/// Attribute name to value, in document order.
pub type Attributes = IndexMap<String, AttrValue>;

/// Value text that stands for a missing value in any declared type.
const MISSING_VALUE_TEXT: &str = "*";

/// A single typed attribute value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    UInt8(u8),
    Int8(i8),
    UInt16(u16),
    Int16(i16),
    UInt32(u32),
    Int32(i32),
    UInt64(u64),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    String(String),
}

impl Scalar {
    /// The floating missing-value sentinel.
    pub fn missing() -> Self {
        Scalar::Float64(f64::NAN)
    }

    /// Cast `text` to the native type declared by `dtype`.
    ///
    /// `"*"` always yields [`Scalar::missing`]; strings and URLs are never cast.
    pub fn parse(dtype: DapType, text: &str) -> DmrppResult<Self> {
        if text.trim() == MISSING_VALUE_TEXT {
            return Ok(Self::missing());
        }
        let scalar = match dtype.data_type() {
            DataType::UInt8 => Scalar::UInt8(parse_number(dtype, text)?),
            DataType::Int8 => Scalar::Int8(parse_number(dtype, text)?),
            DataType::UInt16 => Scalar::UInt16(parse_number(dtype, text)?),
            DataType::Int16 => Scalar::Int16(parse_number(dtype, text)?),
            DataType::UInt32 => Scalar::UInt32(parse_number(dtype, text)?),
            DataType::Int32 => Scalar::Int32(parse_number(dtype, text)?),
            DataType::UInt64 => Scalar::UInt64(parse_number(dtype, text)?),
            DataType::Int64 => Scalar::Int64(parse_number(dtype, text)?),
            DataType::Float32 => Scalar::Float32(parse_number(dtype, text)?),
            DataType::Float64 => Scalar::Float64(parse_number(dtype, text)?),
            DataType::Object => Scalar::String(text.to_string()),
        };
        Ok(scalar)
    }

    /// Numeric value widened to `f64`, `None` for strings.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Scalar::UInt8(v) => Some(v as f64),
            Scalar::Int8(v) => Some(v as f64),
            Scalar::UInt16(v) => Some(v as f64),
            Scalar::Int16(v) => Some(v as f64),
            Scalar::UInt32(v) => Some(v as f64),
            Scalar::Int32(v) => Some(v as f64),
            Scalar::UInt64(v) => Some(v as f64),
            Scalar::Int64(v) => Some(v as f64),
            Scalar::Float32(v) => Some(v as f64),
            Scalar::Float64(v) => Some(v),
            Scalar::String(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_nan(&self) -> bool {
        self.as_f64().is_some_and(f64::is_nan)
    }
}

fn parse_number<T: std::str::FromStr>(dtype: DapType, text: &str) -> DmrppResult<T> {
    text.trim()
        .parse()
        .map_err(|_| DmrppError::invalid_value(text, format!("{} attribute", dtype)))
}

/// An attribute value: one scalar, or several in document order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttrValue {
    Scalar(Scalar),
    List(Vec<Scalar>),
}

impl AttrValue {
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            AttrValue::Scalar(s) => Some(s),
            AttrValue::List(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_scalar().and_then(Scalar::as_str)
    }

    pub fn as_list(&self) -> Option<&[Scalar]> {
        match self {
            AttrValue::List(values) => Some(values),
            AttrValue::Scalar(_) => None,
        }
    }
}

impl From<Scalar> for AttrValue {
    fn from(scalar: Scalar) -> Self {
        AttrValue::Scalar(scalar)
    }
}

/// Cast one `<Attribute>` element.
///
/// Returns `Ok(None)` for `Container` attributes, which group other
/// attributes rather than carrying a value.
pub(crate) fn parse_attribute(element: &Element) -> DmrppResult<Option<(String, AttrValue)>> {
    let name = element.require_attr("name")?;
    let type_name = element.require_attr("type")?;
    if type_name == "Container" {
        return Ok(None);
    }
    let dtype: DapType = type_name.parse()?;

    let mut values = element
        .children_named(XmlNamespace::Dap, "Value")
        .map(|v| Scalar::parse(dtype, v.text().unwrap_or_default()))
        .collect::<DmrppResult<Vec<_>>>()?;

    let value = if values.len() == 1 {
        AttrValue::Scalar(values.remove(0))
    } else {
        AttrValue::List(values)
    };
    Ok(Some((name.to_string(), value)))
}

/// Cast a sequence of `<Attribute>` elements, skipping containers.
pub(crate) fn parse_attributes<'a>(
    elements: impl IntoIterator<Item = &'a Element>,
) -> DmrppResult<Attributes> {
    let mut attrs = Attributes::new();
    for element in elements {
        if let Some((name, value)) = parse_attribute(element)? {
            attrs.insert(name, value);
        }
    }
    Ok(attrs)
}
