//! Value codec: application values to and from each engine's stored representation.
//!
//! Every rule is selected by the declared (or target) [`SemanticType`], never
//! by the runtime shape of the value. Value types coalesce null to their zero
//! value on the way in; reference types map null to the null marker.
//!
//! | Declared type | Stored as | Null in |
//! |---------------|-----------|---------|
//! | enum | i32 discriminant | `0` |
//! | guid | engine form (uuid, text, bytes) | null marker (also for the nil uuid) |
//! | bool | bool | `false` |
//! | numeric | same width | zero |
//! | date/time | same | null marker |
//! | color | i32 ARGB | null marker |
//! | type descriptor | text (type name) | null marker |
//! | string | text | `""` |
//! | bytes | bytes | null marker |
//! | image | PNG bytes | null marker |
//! | svg image | UTF-8 bytes | null marker |
//! | link collection | canonical text | null marker |
//! | bit array | backing bytes | null marker |
//! | object | JSON bytes, optionally gzip | null marker |

mod convert;
pub mod types;
pub mod value;

#[cfg(test)]
mod tests;

use std::io::{Read, Write};

use chrono::NaiveTime;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};
use uuid::Uuid;

use crate::error::{DialectError, DialectResult};
use convert::Number;

pub use types::{BitArray, Bitmap, Color, ImageError, Link, LinkCollection, SvgImage};
pub use value::{DbValue, Direction, SemanticType, StoredType, Value};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// How 128-bit identifiers are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuidStorage {
    /// The driver's native uuid type.
    #[default]
    Native,
    /// 36-character hyphenated text.
    Text,
    /// 16 bytes in RFC 4122 (big-endian) order.
    Bytes,
    /// 16 bytes with the first three groups little-endian, as SQL Server
    /// `uniqueidentifier` lays them out.
    MixedEndianBytes,
}

/// Text column policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextPolicy {
    #[default]
    Unbounded,
    /// `CHAR(n)`-style columns: longer strings are rejected, padding is trimmed on read.
    FixedWidth(usize),
}

/// Engine options consumed by the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CodecOptions {
    pub guid_storage: GuidStorage,
    pub text_policy: TextPolicy,
}

/// Bidirectional value converter for one engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueCodec {
    options: CodecOptions,
}

type Rule<T> = Result<T, String>;

fn mismatch(declared: &SemanticType, got: &str) -> String {
    format!("expected a {} value, got {}", declared, got)
}

fn gzip(bytes: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes)?;
    encoder.finish()
}

fn gunzip(bytes: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut out = Vec::new();
    GzDecoder::new(bytes).read_to_end(&mut out)?;
    Ok(out)
}

fn zero_of(declared: &SemanticType) -> DbValue {
    match declared {
        SemanticType::U8 => DbValue::U8(0),
        SemanticType::I16 => DbValue::I16(0),
        SemanticType::I64 => DbValue::I64(0),
        SemanticType::F32 => DbValue::F32(0.0),
        SemanticType::F64 => DbValue::F64(0.0),
        SemanticType::Decimal => DbValue::Decimal(Decimal::ZERO),
        _ => DbValue::I32(0),
    }
}

fn narrow<T: TryFrom<i128>>(n: Number, declared: &SemanticType) -> Rule<T> {
    let int = n
        .to_i128()
        .ok_or_else(|| format!("{} is not an integral {}", n, declared))?;
    T::try_from(int).map_err(|_| format!("{} is out of range for {}", int, declared))
}

/// Convert a number to the representation of a numeric declared type.
fn number_to_db(n: Number, declared: &SemanticType) -> Rule<DbValue> {
    let float = || {
        n.to_f64()
            .ok_or_else(|| format!("{} is not representable as {}", n, declared))
    };
    Ok(match declared {
        SemanticType::U8 => DbValue::U8(narrow(n, declared)?),
        SemanticType::I16 => DbValue::I16(narrow(n, declared)?),
        SemanticType::I32 | SemanticType::Enum(_) => DbValue::I32(narrow(n, declared)?),
        SemanticType::I64 => DbValue::I64(narrow(n, declared)?),
        SemanticType::F32 => DbValue::F32(float()? as f32),
        SemanticType::F64 => DbValue::F64(float()?),
        SemanticType::Decimal => DbValue::Decimal(
            n.to_decimal()
                .ok_or_else(|| format!("{} is not representable as decimal", n))?,
        ),
        other => return Err(mismatch(other, "number")),
    })
}

fn db_number_to_value(raw: DbValue) -> Value {
    match raw {
        DbValue::U8(v) => Value::U8(v),
        DbValue::I16(v) => Value::I16(v),
        DbValue::I32(v) => Value::I32(v),
        DbValue::I64(v) => Value::I64(v),
        DbValue::F32(v) => Value::F32(v),
        DbValue::F64(v) => Value::F64(v),
        DbValue::Decimal(v) => Value::Decimal(v),
        _ => Value::Null,
    }
}

impl ValueCodec {
    pub fn new(options: CodecOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> CodecOptions {
        self.options
    }

    /// Effective stored type for a declared type on this engine.
    pub fn stored_type(&self, declared: &SemanticType) -> StoredType {
        match declared {
            SemanticType::Enum(_) | SemanticType::Color | SemanticType::I32 => StoredType::I32,
            SemanticType::Guid => match self.options.guid_storage {
                GuidStorage::Native => StoredType::Uuid,
                GuidStorage::Text => StoredType::Text,
                GuidStorage::Bytes | GuidStorage::MixedEndianBytes => StoredType::Bytes,
            },
            SemanticType::Bool => StoredType::Bool,
            SemanticType::U8 => StoredType::U8,
            SemanticType::I16 => StoredType::I16,
            SemanticType::I64 => StoredType::I64,
            SemanticType::F32 => StoredType::F32,
            SemanticType::F64 => StoredType::F64,
            SemanticType::Decimal => StoredType::Decimal,
            SemanticType::Date => StoredType::Date,
            SemanticType::Time => StoredType::Time,
            SemanticType::DateTime => StoredType::DateTime,
            SemanticType::TypeDescriptor | SemanticType::String | SemanticType::LinkCollection => {
                StoredType::Text
            }
            SemanticType::Bytes
            | SemanticType::Image
            | SemanticType::SvgImage
            | SemanticType::BitArray
            | SemanticType::Object(_) => StoredType::Bytes,
        }
    }

    /// Convert an application value for binding.
    ///
    /// `compress` gzips the JSON fallback encoding; other rules ignore it.
    pub fn to_database(
        &self,
        value: &Value,
        declared: &SemanticType,
        compress: bool,
    ) -> DialectResult<(DbValue, StoredType)> {
        let stored = self.stored_type(declared);
        self.encode(value, declared, compress)
            .map(|raw| (raw, stored))
            .map_err(|reason| DialectError::value(Direction::ToDatabase, declared, stored, reason))
    }

    /// Convert a raw column value to the target type.
    ///
    /// A raw value whose stored type differs from [`stored_type`](Self::stored_type)
    /// is widened when convertible, with a warning.
    pub fn from_database(&self, raw: &DbValue, target: &SemanticType) -> DialectResult<Value> {
        let stored = raw.stored_type();
        let value = self.decode(raw, target).map_err(|reason| {
            DialectError::value(Direction::FromDatabase, target, stored, reason)
        })?;
        let expected = self.stored_type(target);
        if !raw.is_null() && stored != expected {
            warn!(%target, %stored, %expected, "widened stored value to declared type");
        }
        Ok(value)
    }

    fn encode(&self, value: &Value, declared: &SemanticType, compress: bool) -> Rule<DbValue> {
        if value.is_null() {
            return Ok(self.null_to_db(declared));
        }
        match declared {
            numeric if numeric.is_numeric() || matches!(numeric, SemanticType::Enum(_)) => {
                let n = Number::from_value(value).ok_or_else(|| mismatch(declared, value.kind()))?;
                number_to_db(n, declared)
            }
            SemanticType::Guid => match value {
                Value::Guid(id) => Ok(self.guid_to_db(*id)),
                Value::String(text) => Uuid::parse_str(text)
                    .map(|id| self.guid_to_db(id))
                    .map_err(|e| format!("invalid uuid '{}': {}", text, e)),
                other => Err(mismatch(declared, other.kind())),
            },
            SemanticType::Bool => match value {
                Value::Bool(b) => Ok(DbValue::Bool(*b)),
                other => Err(mismatch(declared, other.kind())),
            },
            SemanticType::Date => match value {
                Value::Date(d) => Ok(DbValue::Date(*d)),
                other => Err(mismatch(declared, other.kind())),
            },
            SemanticType::Time => match value {
                Value::Time(t) => Ok(DbValue::Time(*t)),
                other => Err(mismatch(declared, other.kind())),
            },
            SemanticType::DateTime => match value {
                Value::DateTime(t) => Ok(DbValue::DateTime(*t)),
                Value::Date(d) => Ok(DbValue::DateTime(d.and_time(NaiveTime::MIN))),
                other => Err(mismatch(declared, other.kind())),
            },
            SemanticType::Color => match value {
                Value::Color(c) => Ok(DbValue::I32(c.to_argb())),
                other => Err(mismatch(declared, other.kind())),
            },
            SemanticType::TypeDescriptor => match value {
                Value::TypeDescriptor(name) | Value::String(name) => Ok(DbValue::Text(name.clone())),
                other => Err(mismatch(declared, other.kind())),
            },
            SemanticType::String => match value {
                Value::String(s) => self.checked_text(s),
                other => Err(mismatch(declared, other.kind())),
            },
            SemanticType::Bytes => match value {
                Value::Bytes(b) => Ok(DbValue::Bytes(b.clone())),
                other => Err(mismatch(declared, other.kind())),
            },
            SemanticType::Image => match value {
                Value::Image(bitmap) => bitmap
                    .to_png()
                    .map(DbValue::Bytes)
                    .map_err(|e| e.to_string()),
                other => Err(mismatch(declared, other.kind())),
            },
            SemanticType::SvgImage => match value {
                Value::Svg(svg) => Ok(DbValue::Bytes(svg.to_bytes())),
                other => Err(mismatch(declared, other.kind())),
            },
            SemanticType::LinkCollection => match value {
                Value::Links(links) => links.to_text().map(DbValue::Text).map_err(|e| e.to_string()),
                other => Err(mismatch(declared, other.kind())),
            },
            SemanticType::BitArray => match value {
                Value::Bits(bits) => Ok(DbValue::Bytes(bits.as_bytes().to_vec())),
                other => Err(mismatch(declared, other.kind())),
            },
            SemanticType::Object(name) => match value {
                Value::Object(json) => {
                    let bytes = serde_json::to_vec(json).map_err(|e| e.to_string())?;
                    let bytes = if compress {
                        gzip(&bytes).map_err(|e| format!("gzip failed: {}", e))?
                    } else {
                        bytes
                    };
                    trace!(object = %name, len = bytes.len(), compress, "encoded object as JSON");
                    Ok(DbValue::Bytes(bytes))
                }
                other => Err(mismatch(declared, other.kind())),
            },
            _ => Err(mismatch(declared, value.kind())),
        }
    }

    fn null_to_db(&self, declared: &SemanticType) -> DbValue {
        match declared {
            SemanticType::Bool => DbValue::Bool(false),
            SemanticType::String => DbValue::Text(String::new()),
            SemanticType::Enum(_) => DbValue::I32(0),
            numeric if numeric.is_numeric() => zero_of(numeric),
            _ => DbValue::Null,
        }
    }

    fn guid_to_db(&self, id: Uuid) -> DbValue {
        if id.is_nil() {
            return DbValue::Null;
        }
        match self.options.guid_storage {
            GuidStorage::Native => DbValue::Uuid(id),
            GuidStorage::Text => DbValue::Text(id.hyphenated().to_string()),
            GuidStorage::Bytes => DbValue::Bytes(id.as_bytes().to_vec()),
            GuidStorage::MixedEndianBytes => DbValue::Bytes(id.to_bytes_le().to_vec()),
        }
    }

    fn guid_from_bytes(&self, bytes: &[u8]) -> Rule<Uuid> {
        let bytes: [u8; 16] = bytes
            .try_into()
            .map_err(|_| format!("expected 16 bytes for a guid, got {}", bytes.len()))?;
        Ok(match self.options.guid_storage {
            GuidStorage::MixedEndianBytes => Uuid::from_bytes_le(bytes),
            _ => Uuid::from_bytes(bytes),
        })
    }

    fn checked_text(&self, s: &str) -> Rule<DbValue> {
        if let TextPolicy::FixedWidth(width) = self.options.text_policy {
            let len = s.chars().count();
            if len > width {
                return Err(format!(
                    "string of {} characters exceeds fixed width {}",
                    len, width
                ));
            }
        }
        Ok(DbValue::Text(s.to_string()))
    }

    fn decode(&self, raw: &DbValue, target: &SemanticType) -> Rule<Value> {
        if raw.is_null() {
            return Ok(self.null_to_value(target));
        }
        let got = raw.stored_type().to_string();
        match target {
            SemanticType::Enum(_) => {
                let n = Number::from_db(raw).ok_or_else(|| mismatch(target, &got))?;
                Ok(Value::Enum(narrow(n, target)?))
            }
            numeric if numeric.is_numeric() => {
                let n = Number::from_db(raw).ok_or_else(|| mismatch(target, &got))?;
                number_to_db(n, numeric).map(db_number_to_value)
            }
            SemanticType::Guid => match raw {
                DbValue::Uuid(id) => Ok(Value::Guid(*id)),
                DbValue::Text(text) => Uuid::parse_str(text.trim())
                    .map(Value::Guid)
                    .map_err(|e| format!("invalid uuid '{}': {}", text, e)),
                DbValue::Bytes(bytes) => self.guid_from_bytes(bytes).map(Value::Guid),
                _ => Err(mismatch(target, &got)),
            },
            SemanticType::Bool => match raw {
                DbValue::Bool(b) => Ok(Value::Bool(*b)),
                DbValue::Text(text) => convert::parse_bool(text)
                    .map(Value::Bool)
                    .ok_or_else(|| format!("'{}' is not a boolean", text)),
                other => Number::from_db(other)
                    .and_then(Number::to_i128)
                    .map(|n| Value::Bool(n != 0))
                    .ok_or_else(|| mismatch(target, &got)),
            },
            SemanticType::Date => match raw {
                DbValue::Date(d) => Ok(Value::Date(*d)),
                DbValue::DateTime(t) => Ok(Value::Date(t.date())),
                DbValue::Text(text) => convert::parse_date(text)
                    .or_else(|| convert::parse_datetime(text).map(|t| t.date()))
                    .map(Value::Date)
                    .ok_or_else(|| format!("'{}' is not a date", text)),
                _ => Err(mismatch(target, &got)),
            },
            SemanticType::Time => match raw {
                DbValue::Time(t) => Ok(Value::Time(*t)),
                DbValue::DateTime(t) => Ok(Value::Time(t.time())),
                DbValue::Text(text) => convert::parse_time(text)
                    .map(Value::Time)
                    .ok_or_else(|| format!("'{}' is not a time", text)),
                _ => Err(mismatch(target, &got)),
            },
            SemanticType::DateTime => match raw {
                DbValue::DateTime(t) => Ok(Value::DateTime(*t)),
                DbValue::Date(d) => Ok(Value::DateTime(d.and_time(NaiveTime::MIN))),
                DbValue::Text(text) => convert::parse_datetime(text)
                    .map(Value::DateTime)
                    .ok_or_else(|| format!("'{}' is not a timestamp", text)),
                _ => Err(mismatch(target, &got)),
            },
            SemanticType::Color => {
                let packed = Number::from_db(raw)
                    .and_then(Number::to_i128)
                    .ok_or_else(|| mismatch(target, &got))?;
                let argb = i32::try_from(packed)
                    .or_else(|_| u32::try_from(packed).map(|v| v as i32))
                    .map_err(|_| format!("{} is not a packed ARGB color", packed))?;
                Ok(Value::Color(Color::from_argb(argb)))
            }
            SemanticType::TypeDescriptor => match raw {
                DbValue::Text(name) => Ok(Value::TypeDescriptor(name.clone())),
                _ => Err(mismatch(target, &got)),
            },
            SemanticType::String => {
                let text = self.text_of(raw).ok_or_else(|| mismatch(target, &got))?;
                Ok(Value::String(match self.options.text_policy {
                    TextPolicy::FixedWidth(_) => text.trim_end_matches(' ').to_string(),
                    TextPolicy::Unbounded => text,
                }))
            }
            SemanticType::Bytes => match raw {
                DbValue::Bytes(b) => Ok(Value::Bytes(b.clone())),
                _ => Err(mismatch(target, &got)),
            },
            SemanticType::Image => match raw {
                DbValue::Bytes(b) => Bitmap::from_png(b).map(Value::Image).map_err(|e| e.to_string()),
                _ => Err(mismatch(target, &got)),
            },
            SemanticType::SvgImage => {
                let markup = self.text_of(raw).ok_or_else(|| mismatch(target, &got))?;
                Ok(Value::Svg(SvgImage::new(markup)))
            }
            SemanticType::LinkCollection => {
                let text = self.text_of(raw).ok_or_else(|| mismatch(target, &got))?;
                text.parse::<LinkCollection>()
                    .map(Value::Links)
                    .map_err(|e| e.to_string())
            }
            SemanticType::BitArray => match raw {
                DbValue::Bytes(b) => Ok(Value::Bits(BitArray::from_bytes(b.clone()))),
                _ => Err(mismatch(target, &got)),
            },
            SemanticType::Object(name) => {
                let json = match raw {
                    DbValue::Bytes(b) if b.starts_with(&GZIP_MAGIC) => {
                        let plain = gunzip(b).map_err(|e| format!("gunzip failed: {}", e))?;
                        trace!(object = %name, len = b.len(), "decompressed stored object");
                        serde_json::from_slice(&plain)
                    }
                    DbValue::Bytes(b) => serde_json::from_slice(b),
                    DbValue::Text(text) => serde_json::from_str(text),
                    _ => return Err(mismatch(target, &got)),
                };
                json.map(Value::Object)
                    .map_err(|e| format!("invalid JSON for {}: {}", name, e))
            }
            _ => Err(mismatch(target, &got)),
        }
    }

    fn null_to_value(&self, target: &SemanticType) -> Value {
        match target {
            SemanticType::Bool => Value::Bool(false),
            SemanticType::String => Value::String(String::new()),
            SemanticType::Enum(_) => Value::Enum(0),
            SemanticType::Guid => Value::Guid(Uuid::nil()),
            numeric if numeric.is_numeric() => db_number_to_value(zero_of(numeric)),
            _ => Value::Null,
        }
    }

    /// Text content of a text column or a UTF-8 byte column.
    fn text_of(&self, raw: &DbValue) -> Option<String> {
        match raw {
            DbValue::Text(text) => Some(text.clone()),
            DbValue::Bytes(bytes) => String::from_utf8(bytes.clone()).ok(),
            _ => None,
        }
    }
}
