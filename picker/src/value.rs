//! Allow-listed field values.
//!
//! Only four value kinds can travel through a parameter blob: 32-bit
//! floats, 32-bit integers, booleans and text. [`FieldValue`] holds one of
//! them and [`FieldValue::coerce`] turns a parsed JSON literal into the kind
//! a field expects.

use std::fmt;

use serde::{Serialize, Serializer};

/// Largest magnitude written as an integer literal when encoding a float.
///
/// Every integral `f32` below this bound is exactly representable as `i64`
/// and survives the trip back through `f64` parsing unchanged.
const INTEGRAL_FLOAT_LIMIT: f32 = 1.0e15;

/// Value kind of an externally-settable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Float,
    Int,
    Bool,
    Text,
    /// A marked field whose type is outside the allow-list.
    ///
    /// Carries the Rust type name for diagnostics.
    Unsupported(&'static str),
}

impl FieldKind {
    /// Whether values of this kind can be decoded and encoded.
    pub fn is_allowed(self) -> bool {
        !matches!(self, Self::Unsupported(_))
    }

    /// Short human-readable name of the kind.
    pub fn name(self) -> &'static str {
        match self {
            Self::Float => "float",
            Self::Int => "int",
            Self::Bool => "bool",
            Self::Text => "text",
            Self::Unsupported(type_name) => type_name,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A value of one of the allow-listed kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Float(f32),
    Int(i32),
    Bool(bool),
    Text(String),
}

/// A blob literal that cannot be coerced to the kind a field expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueMismatch {
    pub expected: FieldKind,
    pub found: String,
}

impl fmt::Display for ValueMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected {}, found {}", self.expected, self.found)
    }
}

impl FieldValue {
    /// The kind of this value. Never [`FieldKind::Unsupported`].
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Float(_) => FieldKind::Float,
            Self::Int(_) => FieldKind::Int,
            Self::Bool(_) => FieldKind::Bool,
            Self::Text(_) => FieldKind::Text,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Coerce a parsed blob literal to `kind`.
    ///
    /// Numbers become floats, or integers when they are integral and fit
    /// in `i32`. `true`/`false` become booleans and strings become text.
    /// Any other pairing is a [`ValueMismatch`].
    pub fn coerce(literal: &serde_json::Value, kind: FieldKind) -> Result<Self, ValueMismatch> {
        use serde_json::Value as Json;

        let mismatch = || ValueMismatch {
            expected: kind,
            found: describe_literal(literal),
        };

        match (kind, literal) {
            (FieldKind::Float, Json::Number(n)) => n
                .as_f64()
                .map(|v| v as f32)
                .filter(|v| v.is_finite())
                .map(Self::Float)
                .ok_or_else(mismatch),
            (FieldKind::Int, Json::Number(n)) => integral(n)
                .and_then(|v| i32::try_from(v).ok())
                .map(Self::Int)
                .ok_or_else(mismatch),
            (FieldKind::Bool, Json::Bool(b)) => Ok(Self::Bool(*b)),
            (FieldKind::Text, Json::String(s)) => Ok(Self::Text(s.clone())),
            _ => Err(mismatch()),
        }
    }
}

/// Integer value of a JSON number, accepting integral floats such as `3.0`.
fn integral(n: &serde_json::Number) -> Option<i64> {
    if let Some(v) = n.as_i64() {
        return Some(v);
    }
    let v = n.as_f64()?;
    (v.fract() == 0.0 && v.abs() <= i64::MAX as f64).then_some(v as i64)
}

/// Short description of a literal for mismatch diagnostics.
pub(crate) fn describe_literal(literal: &serde_json::Value) -> String {
    use serde_json::Value as Json;

    match literal {
        Json::Null => "null".into(),
        Json::Bool(b) => format!("boolean {b}"),
        Json::Number(n) => format!("number {n}"),
        Json::String(_) => "string".into(),
        Json::Array(_) => "array".into(),
        Json::Object(_) => "object".into(),
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Float(v) if v.fract() == 0.0 && v.abs() < INTEGRAL_FLOAT_LIMIT => {
                serializer.serialize_i64(*v as i64)
            }
            Self::Float(v) => serializer.serialize_f32(*v),
            Self::Int(v) => serializer.serialize_i32(*v),
            Self::Bool(v) => serializer.serialize_bool(*v),
            Self::Text(v) => serializer.serialize_str(v),
        }
    }
}

impl From<f32> for FieldValue {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}
