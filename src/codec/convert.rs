//! Widening conversions between numeric, temporal and textual shapes.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

use super::value::{DbValue, Value};

/// A number in whichever shape it arrived in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Number {
    Int(i128),
    Float(f64),
    Decimal(Decimal),
}

impl Number {
    pub(crate) fn from_value(value: &Value) -> Option<Self> {
        Some(match value {
            Value::U8(v) => Number::Int((*v).into()),
            Value::I16(v) => Number::Int((*v).into()),
            Value::I32(v) | Value::Enum(v) => Number::Int((*v).into()),
            Value::I64(v) => Number::Int((*v).into()),
            Value::F32(v) => Number::Float((*v).into()),
            Value::F64(v) => Number::Float(*v),
            Value::Decimal(v) => Number::Decimal(*v),
            _ => return None,
        })
    }

    pub(crate) fn from_db(raw: &DbValue) -> Option<Self> {
        Some(match raw {
            DbValue::U8(v) => Number::Int((*v).into()),
            DbValue::I16(v) => Number::Int((*v).into()),
            DbValue::I32(v) => Number::Int((*v).into()),
            DbValue::I64(v) => Number::Int((*v).into()),
            DbValue::F32(v) => Number::Float((*v).into()),
            DbValue::F64(v) => Number::Float(*v),
            DbValue::Decimal(v) => Number::Decimal(*v),
            DbValue::Bool(v) => Number::Int((*v).into()),
            DbValue::Text(s) => return Self::parse(s),
            _ => return None,
        })
    }

    fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if let Ok(v) = text.parse::<i128>() {
            return Some(Number::Int(v));
        }
        if let Ok(v) = Decimal::from_str(text) {
            return Some(Number::Decimal(v));
        }
        text.parse::<f64>().ok().map(Number::Float)
    }

    /// Integral value, if the number has no fractional part.
    pub(crate) fn to_i128(self) -> Option<i128> {
        match self {
            Number::Int(v) => Some(v),
            Number::Float(v) if v.is_finite() && v.fract() == 0.0 => v.to_i128(),
            Number::Decimal(v) if v.fract().is_zero() => v.to_i128(),
            _ => None,
        }
    }

    pub(crate) fn to_f64(self) -> Option<f64> {
        match self {
            Number::Int(v) => v.to_f64(),
            Number::Float(v) => Some(v),
            Number::Decimal(v) => v.to_f64(),
        }
    }

    pub(crate) fn to_decimal(self) -> Option<Decimal> {
        match self {
            Number::Int(v) => Decimal::from_i128(v),
            Number::Float(v) => Decimal::from_f64(v),
            Number::Decimal(v) => Some(v),
        }
    }
}

impl std::fmt::Display for Number {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Number::Int(v) => write!(f, "{}", v),
            Number::Float(v) => write!(f, "{}", v),
            Number::Decimal(v) => write!(f, "{}", v),
        }
    }
}

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"];

pub(crate) fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| parse_date(text).map(|d| d.and_time(NaiveTime::MIN)))
}

pub(crate) fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT).ok()
}

pub(crate) fn parse_time(text: &str) -> Option<NaiveTime> {
    let text = text.trim();
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(text, fmt).ok())
}

pub(crate) fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "1" | "t" | "true" | "y" | "yes" => Some(true),
        "0" | "f" | "false" | "n" | "no" => Some(false),
        _ => None,
    }
}
