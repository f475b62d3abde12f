//! Application values, stored representations and the types that select between them.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::types::{BitArray, Bitmap, Color, LinkCollection, SvgImage};

/// Declared (or target) semantic type of a mapped field.
///
/// Conversions branch on this, never on the runtime shape of the value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticType {
    /// Enumeration with the given type name, stored as its discriminant.
    Enum(String),
    Guid,
    Bool,
    U8,
    I16,
    I32,
    I64,
    F32,
    F64,
    Decimal,
    Date,
    Time,
    DateTime,
    Color,
    /// A reflective type descriptor, stored as its fully-qualified name.
    TypeDescriptor,
    String,
    Bytes,
    Image,
    SvgImage,
    LinkCollection,
    BitArray,
    /// Any other reference type, stored as JSON bytes.
    Object(String),
}

impl SemanticType {
    /// Numeric families coalesce null to zero.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            SemanticType::U8
                | SemanticType::I16
                | SemanticType::I32
                | SemanticType::I64
                | SemanticType::F32
                | SemanticType::F64
                | SemanticType::Decimal
        )
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SemanticType::Enum(name) => return write!(f, "enum<{}>", name),
            SemanticType::Object(name) => return write!(f, "object<{}>", name),
            SemanticType::Guid => "guid",
            SemanticType::Bool => "bool",
            SemanticType::U8 => "u8",
            SemanticType::I16 => "i16",
            SemanticType::I32 => "i32",
            SemanticType::I64 => "i64",
            SemanticType::F32 => "f32",
            SemanticType::F64 => "f64",
            SemanticType::Decimal => "decimal",
            SemanticType::Date => "date",
            SemanticType::Time => "time",
            SemanticType::DateTime => "datetime",
            SemanticType::Color => "color",
            SemanticType::TypeDescriptor => "type_descriptor",
            SemanticType::String => "string",
            SemanticType::Bytes => "bytes",
            SemanticType::Image => "image",
            SemanticType::SvgImage => "svg_image",
            SemanticType::LinkCollection => "link_collection",
            SemanticType::BitArray => "bit_array",
        };
        f.write_str(name)
    }
}

/// An application-side value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    U8(u8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Decimal(Decimal),
    /// Enumeration discriminant.
    Enum(i32),
    Guid(Uuid),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    Color(Color),
    /// Fully-qualified type name.
    TypeDescriptor(String),
    String(String),
    Bytes(Vec<u8>),
    Image(Bitmap),
    Svg(SvgImage),
    Links(LinkCollection),
    Bits(BitArray),
    Object(serde_json::Value),
}

impl Value {
    /// Wrap a serializable object for the JSON fallback rule.
    pub fn object<T: Serialize>(object: &T) -> serde_json::Result<Self> {
        serde_json::to_value(object).map(Value::Object)
    }

    /// Deserialize an object produced by the JSON fallback rule.
    pub fn into_object<T: DeserializeOwned>(self) -> Option<serde_json::Result<T>> {
        match self {
            Value::Object(json) => Some(serde_json::from_value(json)),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short name of the runtime shape, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::U8(_) => "u8",
            Value::I16(_) => "i16",
            Value::I32(_) => "i32",
            Value::I64(_) => "i64",
            Value::F32(_) => "f32",
            Value::F64(_) => "f64",
            Value::Decimal(_) => "decimal",
            Value::Enum(_) => "enum",
            Value::Guid(_) => "guid",
            Value::Date(_) => "date",
            Value::Time(_) => "time",
            Value::DateTime(_) => "datetime",
            Value::Color(_) => "color",
            Value::TypeDescriptor(_) => "type_descriptor",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Image(_) => "image",
            Value::Svg(_) => "svg_image",
            Value::Links(_) => "link_collection",
            Value::Bits(_) => "bit_array",
            Value::Object(_) => "object",
        }
    }
}

/// A value in the shape handed to (or read from) the database driver.
#[derive(Debug, Clone, PartialEq)]
pub enum DbValue {
    /// The null marker.
    Null,
    Bool(bool),
    U8(u8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Decimal(Decimal),
    Text(String),
    Bytes(Vec<u8>),
    Uuid(Uuid),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
}

impl DbValue {
    pub fn is_null(&self) -> bool {
        matches!(self, DbValue::Null)
    }

    pub fn stored_type(&self) -> StoredType {
        match self {
            DbValue::Null => StoredType::Null,
            DbValue::Bool(_) => StoredType::Bool,
            DbValue::U8(_) => StoredType::U8,
            DbValue::I16(_) => StoredType::I16,
            DbValue::I32(_) => StoredType::I32,
            DbValue::I64(_) => StoredType::I64,
            DbValue::F32(_) => StoredType::F32,
            DbValue::F64(_) => StoredType::F64,
            DbValue::Decimal(_) => StoredType::Decimal,
            DbValue::Text(_) => StoredType::Text,
            DbValue::Bytes(_) => StoredType::Bytes,
            DbValue::Uuid(_) => StoredType::Uuid,
            DbValue::Date(_) => StoredType::Date,
            DbValue::Time(_) => StoredType::Time,
            DbValue::DateTime(_) => StoredType::DateTime,
        }
    }
}

/// Effective stored type of a representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoredType {
    /// A raw null marker with no concrete column type.
    Null,
    Bool,
    U8,
    I16,
    I32,
    I64,
    F32,
    F64,
    Decimal,
    Text,
    Bytes,
    Uuid,
    Date,
    Time,
    DateTime,
}

impl fmt::Display for StoredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StoredType::Null => "null",
            StoredType::Bool => "bool",
            StoredType::U8 => "u8",
            StoredType::I16 => "i16",
            StoredType::I32 => "i32",
            StoredType::I64 => "i64",
            StoredType::F32 => "f32",
            StoredType::F64 => "f64",
            StoredType::Decimal => "decimal",
            StoredType::Text => "text",
            StoredType::Bytes => "bytes",
            StoredType::Uuid => "uuid",
            StoredType::Date => "date",
            StoredType::Time => "time",
            StoredType::DateTime => "datetime",
        };
        f.write_str(name)
    }
}

/// Which way a conversion runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    ToDatabase,
    FromDatabase,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::ToDatabase => f.write_str("to database"),
            Direction::FromDatabase => f.write_str("from database"),
        }
    }
}
