//! Selective field codec.
//!
//! Maps between an instance and a flat JSON object holding only the fields
//! its schema marks as externally settable. Decoding is keyed lookup and
//! tolerant: unknown keys are dropped silently, and fields that cannot be
//! coerced are skipped with a [`Diagnostic`]. Only a blob that is not a
//! JSON object at all fails the whole decode.
//!
//! ```text
//! decode(Circle, r#"{"radius": 2.5, "side": 4}"#)  ->  Circle { radius: 2.5 }
//! encode(&Circle { radius: 2.5 })                  ->  {"radius":2.5}
//! ```

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::{CodecError, Diagnostic};
use crate::registry::TypeRegistration;
use crate::schema::Parameters;
use crate::value::{FieldKind, FieldValue, describe_literal};

/// Blobs of this many characters or fewer decode to the default instance.
pub const EMPTY_BLOB_THRESHOLD: usize = 1;

/// Result of [`decode`].
#[derive(Default)]
pub struct Decoded {
    /// `None` when no type was given.
    pub instance: Option<Box<dyn Parameters>>,
    pub diagnostics: Vec<Diagnostic>,
}

impl std::fmt::Debug for Decoded {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Decoded")
            .field(
                "instance",
                &self.instance.as_ref().map(|i| i.param_schema().type_name()),
            )
            .field("diagnostics", &self.diagnostics)
            .finish()
    }
}

/// Result of [`encode`] and the operations built on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    pub blob: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// Materialize an instance of `ty` from `blob`.
///
/// Fields never mentioned in the blob keep their default values. Decoding
/// is a pure function of its inputs; calling it repeatedly is safe.
pub fn decode(ty: Option<&TypeRegistration>, blob: &str) -> Result<Decoded, CodecError> {
    let Some(ty) = ty else {
        return Ok(Decoded::default());
    };
    let mut instance = ty.construct()?;
    let mut diagnostics = Vec::new();
    if blob.chars().count() <= EMPTY_BLOB_THRESHOLD {
        return Ok(Decoded {
            instance: Some(instance),
            diagnostics,
        });
    }

    let parsed: serde_json::Value =
        serde_json::from_str(blob).map_err(|e| CodecError::MalformedBlob {
            reason: e.to_string(),
        })?;
    let serde_json::Value::Object(entries) = parsed else {
        return Err(CodecError::MalformedBlob {
            reason: format!("expected an object, found {}", describe_literal(&parsed)),
        });
    };

    let schema = instance.param_schema();
    for (key, literal) in &entries {
        let Some(field) = schema.field(key) else {
            continue;
        };
        if let FieldKind::Unsupported(type_name) = field.kind {
            diagnostics.push(
                Diagnostic::UnsupportedFieldType {
                    field: key.clone(),
                    type_name,
                }
                .report(schema.type_name()),
            );
            continue;
        }
        match FieldValue::coerce(literal, field.kind) {
            Ok(value) => {
                if !instance.set_param(key, value) {
                    diagnostics.push(
                        Diagnostic::InaccessibleField { field: key.clone() }
                            .report(schema.type_name()),
                    );
                }
            }
            Err(mismatch) => diagnostics.push(
                Diagnostic::CoercionMismatch {
                    field: key.clone(),
                    expected: mismatch.expected,
                    found: mismatch.found,
                }
                .report(schema.type_name()),
            ),
        }
    }

    Ok(Decoded {
        instance: Some(instance),
        diagnostics,
    })
}

/// Write the externally-settable fields of `instance` as a compact JSON
/// object in declaration order.
pub fn encode(instance: &dyn Parameters) -> Result<Encoded, CodecError> {
    let schema = instance.param_schema();
    let mut entries = Vec::with_capacity(schema.fields().len());
    let mut diagnostics = Vec::new();

    for field in schema.fields() {
        if let FieldKind::Unsupported(type_name) = field.kind {
            diagnostics.push(
                Diagnostic::UnsupportedFieldType {
                    field: field.name.to_owned(),
                    type_name,
                }
                .report(schema.type_name()),
            );
            continue;
        }
        let Some(value) = instance.get_param(field.name) else {
            diagnostics.push(
                Diagnostic::InaccessibleField {
                    field: field.name.to_owned(),
                }
                .report(schema.type_name()),
            );
            continue;
        };
        if matches!(value, FieldValue::Float(v) if !v.is_finite()) {
            diagnostics.push(
                Diagnostic::NonFiniteFloat {
                    field: field.name.to_owned(),
                }
                .report(schema.type_name()),
            );
            continue;
        }
        entries.push((field.name, value));
    }

    let blob = serde_json::to_string(&BlobEntries(&entries))?;
    Ok(Encoded { blob, diagnostics })
}

/// Set one field on the instance decoded from `blob` and re-encode it.
///
/// This is the field-edit operation. Nothing is returned on failure, so a
/// caller only ever overwrites its stored blob with a successful result.
pub fn merge_field(
    ty: Option<&TypeRegistration>,
    blob: &str,
    name: &str,
    value: FieldValue,
) -> Result<Encoded, CodecError> {
    let ty = ty.ok_or(CodecError::NoType)?;
    let field = ty
        .schema()
        .and_then(|schema| schema.field(name))
        .filter(|field| field.kind.is_allowed())
        .ok_or_else(|| CodecError::UnknownField {
            type_name: ty.identity().to_owned(),
            field: name.to_owned(),
        })?;
    if field.kind != value.kind() {
        return Err(CodecError::FieldKindMismatch {
            field: name.to_owned(),
            expected: field.kind,
            found: value.kind(),
        });
    }
    if matches!(value, FieldValue::Float(v) if !v.is_finite()) {
        return Err(CodecError::NonFiniteValue {
            field: name.to_owned(),
        });
    }

    let decoded = decode(Some(ty), blob)?;
    let Some(mut instance) = decoded.instance else {
        return Err(CodecError::NoType);
    };
    instance.set_param(name, value);
    let mut encoded = encode(instance.as_ref())?;
    let mut diagnostics = decoded.diagnostics;
    diagnostics.append(&mut encoded.diagnostics);
    encoded.diagnostics = diagnostics;
    Ok(encoded)
}

/// Decode `blob` against a newly chosen type and re-encode it.
///
/// Keys the new type does not have are dropped; fields shared with the
/// previous type keep their values.
pub fn rederive(blob: &str, to: &TypeRegistration) -> Result<Encoded, CodecError> {
    let decoded = decode(Some(to), blob)?;
    let Some(instance) = decoded.instance else {
        return Err(CodecError::NoType);
    };
    let mut encoded = encode(instance.as_ref())?;
    let mut diagnostics = decoded.diagnostics;
    diagnostics.append(&mut encoded.diagnostics);
    encoded.diagnostics = diagnostics;
    Ok(encoded)
}

/// Number of editable fields of `ty`; zero when nothing is chosen.
pub fn field_count(ty: Option<&TypeRegistration>) -> usize {
    ty.map_or(0, TypeRegistration::field_count)
}

/// Serializes `(name, value)` pairs as a JSON object, preserving order.
struct BlobEntries<'a>(&'a [(&'static str, FieldValue)]);

impl Serialize for BlobEntries<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
