use std::fmt;

use thiserror::Error;

use crate::Value;

/// Scalar type a field coerces its value into on validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Integer,
    Float,
    String,
    Bytes,
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarKind::Integer => write!(f, "integer"),
            ScalarKind::Float => write!(f, "float"),
            ScalarKind::String => write!(f, "string"),
            ScalarKind::Bytes => write!(f, "bytes"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoerceError {
    #[error("invalid literal for {kind}: {literal:?}")]
    Parse { kind: ScalarKind, literal: String },
    #[error("cannot convert {found} to {kind}")]
    Unsupported { kind: ScalarKind, found: &'static str },
    #[error("bytes are not valid utf-8: {0}")]
    Utf8(String),
    #[error("cannot convert non-finite float {0} to integer")]
    NonFinite(f64),
    #[error("float {0} is out of range for integer")]
    OutOfRange(f64),
}

/// Schema-level description of one field: its kind, nullability and default.
///
/// A `Field` holds no per-record state; all values live in the owning
/// [`Record`](crate::Record).
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    kind: ScalarKind,
    nullable: bool,
    default: Option<Value>,
}

impl Field {
    pub fn new(kind: ScalarKind) -> Self {
        Self {
            kind,
            nullable: false,
            default: None,
        }
    }

    pub fn integer() -> Self {
        Self::new(ScalarKind::Integer)
    }

    pub fn float() -> Self {
        Self::new(ScalarKind::Float)
    }

    pub fn string() -> Self {
        Self::new(ScalarKind::String)
    }

    pub fn bytes() -> Self {
        Self::new(ScalarKind::Bytes)
    }

    /// Allows the field to be absent when the record is validated.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Value applied when a record is constructed without this field.
    /// A `Null` default is the same as no default.
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into()).filter(|v| !v.is_null());
        self
    }

    pub fn kind(&self) -> ScalarKind {
        self.kind
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// True when a record must carry a value for this field to validate.
    pub fn is_required(&self) -> bool {
        !self.nullable && self.default.is_none()
    }

    /// Coerces `raw` into this field's scalar kind.
    pub fn validate(&self, raw: &Value) -> Result<Value, CoerceError> {
        match self.kind {
            ScalarKind::Integer => to_integer(raw).map(Value::Int),
            ScalarKind::Float => to_float(raw).map(Value::Float),
            ScalarKind::String => to_string(raw).map(Value::Str),
            ScalarKind::Bytes => to_bytes(raw).map(Value::Bytes),
        }
    }
}

fn unsupported(kind: ScalarKind, raw: &Value) -> CoerceError {
    CoerceError::Unsupported {
        kind,
        found: raw.type_name(),
    }
}

fn literal(raw: &Value) -> Option<&str> {
    match raw {
        Value::Str(s) => Some(s.trim()),
        Value::Bytes(b) => std::str::from_utf8(b).ok().map(str::trim),
        _ => None,
    }
}

fn parse_error(kind: ScalarKind, raw: &Value) -> CoerceError {
    let literal = match raw {
        Value::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
        other => other.as_str().unwrap_or_default().to_string(),
    };
    CoerceError::Parse { kind, literal }
}

fn to_integer(raw: &Value) -> Result<i64, CoerceError> {
    const KIND: ScalarKind = ScalarKind::Integer;
    match raw {
        Value::Int(n) => Ok(*n),
        Value::Bool(b) => Ok(i64::from(*b)),
        Value::Float(n) if !n.is_finite() => Err(CoerceError::NonFinite(*n)),
        Value::Float(n) => {
            let truncated = n.trunc();
            // i64::MAX as f64 rounds up to 2^63, which is itself out of range.
            if (i64::MIN as f64..i64::MAX as f64).contains(&truncated) {
                Ok(truncated as i64)
            } else {
                Err(CoerceError::OutOfRange(*n))
            }
        }
        Value::Str(_) | Value::Bytes(_) => literal(raw)
            .and_then(|s| s.parse::<i64>().ok())
            .ok_or_else(|| parse_error(KIND, raw)),
        _ => Err(unsupported(KIND, raw)),
    }
}

fn to_float(raw: &Value) -> Result<f64, CoerceError> {
    const KIND: ScalarKind = ScalarKind::Float;
    match raw {
        Value::Float(n) => Ok(*n),
        Value::Int(n) => Ok(*n as f64),
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::Str(_) | Value::Bytes(_) => literal(raw)
            .and_then(|s| s.parse::<f64>().ok())
            .ok_or_else(|| parse_error(KIND, raw)),
        _ => Err(unsupported(KIND, raw)),
    }
}

fn to_string(raw: &Value) -> Result<String, CoerceError> {
    match raw {
        Value::Str(s) => Ok(s.clone()),
        Value::Int(n) => Ok(n.to_string()),
        Value::Float(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Bytes(b) => {
            String::from_utf8(b.clone()).map_err(|e| CoerceError::Utf8(e.to_string()))
        }
        _ => Err(unsupported(ScalarKind::String, raw)),
    }
}

fn to_bytes(raw: &Value) -> Result<Vec<u8>, CoerceError> {
    const KIND: ScalarKind = ScalarKind::Bytes;
    match raw {
        Value::Bytes(b) => Ok(b.clone()),
        Value::Str(s) => Ok(s.as_bytes().to_vec()),
        Value::List(items) => items
            .iter()
            .map(|item| match item {
                Value::Int(n) => u8::try_from(*n).map_err(|_| CoerceError::Parse {
                    kind: KIND,
                    literal: n.to_string(),
                }),
                other => Err(unsupported(KIND, other)),
            })
            .collect(),
        _ => Err(unsupported(KIND, raw)),
    }
}
