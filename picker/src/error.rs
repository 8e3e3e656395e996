//! Error types and recoverable diagnostics.
//!
//! Structural failures abort a single operation and are returned as errors.
//! Per-field problems never abort anything; they are collected as
//! [`Diagnostic`] values and logged as warnings.

use thiserror::Error;

use crate::value::FieldKind;

/// Failures of the selective field codec.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The chosen type has no parameterless constructor.
    #[error("type '{type_name}' cannot be default-constructed")]
    ConstructionError { type_name: String },
    /// The blob is not a flat JSON object.
    #[error("malformed parameter blob: {reason}")]
    MalformedBlob { reason: String },
    /// The edited field is not an allow-listed marked field of the type.
    #[error("type '{type_name}' has no editable field '{field}'")]
    UnknownField { type_name: String, field: String },
    /// The edited value does not match the field's kind.
    #[error("field '{field}' expects {expected}, got {found}")]
    FieldKindMismatch {
        field: String,
        expected: FieldKind,
        found: FieldKind,
    },
    /// NaN and infinities cannot be written to a blob.
    #[error("field '{field}' cannot be set to a non-finite float")]
    NonFiniteValue { field: String },
    /// A field edit was requested without a chosen type.
    #[error("no type selected")]
    NoType,
    /// JSON writer failure while encoding.
    #[error("failed to write parameter blob: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Failures of [`TypedSlot`](crate::TypedSlot) operations.
#[derive(Debug, Error)]
pub enum SlotError {
    /// The type is unknown, an interface, or not assignable to the slot's base.
    #[error("type '{identity}' is not assignable to '{base}'")]
    TypeNotAssignable { identity: String, base: &'static str },
    /// An instance of a different type than the chosen one was stored.
    #[error("expected an instance of '{expected}', got '{found}'")]
    WrongInstanceType { expected: String, found: &'static str },
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Failures of [`TypeRegistry`](crate::TypeRegistry) registration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("type identity '{0}' is already registered")]
    DuplicateIdentity(String),
    #[error("type '{0}' is already registered")]
    DuplicateType(&'static str),
}

/// Record encoding/decoding failures.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[cfg(feature = "serialize-ron")]
    #[error("RON error: {0}")]
    Ron(String),
    #[error("invalid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

/// A recoverable, per-field condition. The field is skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Diagnostic {
    /// A marked field has a type outside the allow-list.
    #[error(
        "field '{field}' is of type {type_name}, which is not allowed; change the field's type or remove the marker"
    )]
    UnsupportedFieldType {
        field: String,
        type_name: &'static str,
    },
    /// The blob value cannot be coerced to the field's kind.
    #[error("field '{field}' expects {expected}, found {found}; keeping the default")]
    CoercionMismatch {
        field: String,
        expected: FieldKind,
        found: String,
    },
    /// NaN and infinities have no blob representation.
    #[error("field '{field}' holds a non-finite float and was not written")]
    NonFiniteFloat { field: String },
    /// The type's accessors reject a field its schema lists.
    #[error("field '{field}' is listed in the schema but its accessor rejected it")]
    InaccessibleField { field: String },
}

impl Diagnostic {
    /// Name of the skipped field.
    pub fn field(&self) -> &str {
        match self {
            Self::UnsupportedFieldType { field, .. }
            | Self::CoercionMismatch { field, .. }
            | Self::NonFiniteFloat { field }
            | Self::InaccessibleField { field } => field,
        }
    }

    /// Log the diagnostic as a warning and hand it back.
    pub(crate) fn report(self, type_name: &str) -> Self {
        log::warn!("{type_name}: {self}");
        self
    }
}
