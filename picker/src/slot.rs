//! Typed slots.
//!
//! A [`TypedSlot<B>`] stores which concrete type was chosen for a base `B`
//! together with that type's parameter blob. The slot itself never
//! interprets the blob; materializing and editing go through the
//! [`codec`](crate::codec).
//!
//! Changing the chosen type keeps the blob as it is. Stale keys from the
//! previous type are dropped the next time the blob is decoded, so
//! switching back and forth never corrupts or loses stored data.

use std::marker::PhantomData;

use crate::codec::{self, Decoded};
use crate::error::{CodecError, Diagnostic, SlotError};
use crate::record::{NULL_TYPE, SlotRecord};
use crate::registry::{TypeRegistration, TypeRegistry};
use crate::schema::Parameters;
use crate::value::FieldValue;

/// A chosen concrete type for base `B` plus its authored parameters.
pub struct TypedSlot<B: ?Sized + 'static> {
    chosen_type: Option<String>,
    parameter_blob: String,
    _base: PhantomData<fn() -> Box<B>>,
}

impl<B: ?Sized + 'static> TypedSlot<B> {
    /// A slot with no selection and an empty blob.
    pub fn new() -> Self {
        Self {
            chosen_type: None,
            parameter_blob: String::new(),
            _base: PhantomData,
        }
    }

    /// A slot pre-set to `identity` with an empty blob. Not validated.
    pub fn with_type(identity: impl Into<String>) -> Self {
        Self {
            chosen_type: Some(identity.into()),
            ..Self::new()
        }
    }

    /// Name of the declared base, for messages.
    pub fn base_name() -> &'static str {
        std::any::type_name::<B>()
    }

    /// Identity of the chosen type as stored, resolvable or not.
    pub fn current_identity(&self) -> Option<&str> {
        self.chosen_type.as_deref()
    }

    /// The chosen type, if it still resolves to a type assignable to `B`.
    pub fn current_type<'r>(&self, registry: &'r TypeRegistry) -> Option<&'r TypeRegistration> {
        let identity = self.chosen_type.as_deref()?;
        registry
            .resolve(identity)
            .filter(|ty| ty.is_assignable_to::<B>())
    }

    pub fn raw_blob(&self) -> &str {
        &self.parameter_blob
    }

    /// Replace the blob without validation.
    pub fn set_raw_blob(&mut self, blob: impl Into<String>) {
        self.parameter_blob = blob.into();
    }

    fn validate<'r>(
        &self,
        registry: &'r TypeRegistry,
        identity: &str,
    ) -> Result<&'r TypeRegistration, SlotError> {
        registry
            .resolve(identity)
            .filter(|ty| ty.is_assignable_to::<B>())
            .ok_or_else(|| SlotError::TypeNotAssignable {
                identity: identity.to_owned(),
                base: Self::base_name(),
            })
    }

    /// Choose the type with the given identity.
    ///
    /// Fails without touching the slot if the identity is unknown, names an
    /// interface, or is not assignable to `B`. The blob is kept unchanged.
    pub fn select(&mut self, registry: &TypeRegistry, identity: &str) -> Result<(), SlotError> {
        let ty = self.validate(registry, identity)?;
        if self.chosen_type.as_deref() != Some(ty.identity()) {
            log::debug!("{}: selected '{}'", Self::base_name(), ty.identity());
            self.chosen_type = Some(ty.identity().to_owned());
        }
        Ok(())
    }

    /// Choose `T`.
    pub fn select_type<T: Parameters>(&mut self, registry: &TypeRegistry) -> Result<(), SlotError> {
        self.select(registry, T::identity())
    }

    /// Choose a type and rewrite the blob for it.
    ///
    /// When the type changes, keys the new type does not have are dropped
    /// and shared fields keep their values. Selecting the current type
    /// leaves the blob untouched.
    pub fn select_rederived(
        &mut self,
        registry: &TypeRegistry,
        identity: &str,
    ) -> Result<Vec<Diagnostic>, SlotError> {
        let ty = self.validate(registry, identity)?;
        if self.chosen_type.as_deref() == Some(ty.identity()) {
            return Ok(Vec::new());
        }
        let encoded = codec::rederive(&self.parameter_blob, ty)?;
        log::debug!("{}: selected '{}'", Self::base_name(), ty.identity());
        self.chosen_type = Some(ty.identity().to_owned());
        self.parameter_blob = encoded.blob;
        Ok(encoded.diagnostics)
    }

    /// Choose by position in [`TypeRegistry::list_candidates`].
    ///
    /// An index at or past the end of the list clears the selection.
    pub fn select_index(&mut self, registry: &TypeRegistry, index: usize) -> Result<(), SlotError> {
        let candidates = registry.list_candidates::<B>();
        match candidates.get(index) {
            Some(identity) => self.select(registry, identity),
            None => {
                self.clear();
                Ok(())
            }
        }
    }

    /// Position of the current selection among the candidates.
    ///
    /// No selection, or a selection that is no longer a candidate, maps to
    /// the "null" entry one past the last candidate.
    pub fn selected_index(&self, registry: &TypeRegistry) -> usize {
        let candidates = registry.list_candidates::<B>();
        self.chosen_type
            .as_deref()
            .and_then(|chosen| candidates.iter().position(|c| *c == chosen))
            .unwrap_or(candidates.len())
    }

    /// Dropdown labels: candidate names followed by `"null"`.
    pub fn options(registry: &TypeRegistry) -> Vec<&'static str> {
        registry
            .list_candidates::<B>()
            .iter()
            .filter_map(|identity| registry.resolve(identity))
            .map(TypeRegistration::name)
            .chain(std::iter::once(NULL_TYPE))
            .collect()
    }

    /// Drop the selection. The blob is kept but ignored.
    pub fn clear(&mut self) {
        self.chosen_type = None;
    }

    /// Decode the blob for the chosen type, with diagnostics.
    pub fn decode(&self, registry: &TypeRegistry) -> Result<Decoded, SlotError> {
        Ok(codec::decode(
            self.current_type(registry),
            &self.parameter_blob,
        )?)
    }

    /// Materialize the chosen type as `Box<B>`.
    ///
    /// Returns `Ok(None)` when nothing is selected or the chosen identity
    /// no longer resolves.
    pub fn instance(&self, registry: &TypeRegistry) -> Result<Option<Box<B>>, SlotError> {
        if self.chosen_type.is_none() {
            log::warn!(
                "{}: no type selected; choose one before materializing",
                Self::base_name()
            );
            return Ok(None);
        }
        let Some(ty) = self.current_type(registry) else {
            return Ok(None);
        };
        let decoded = codec::decode(Some(ty), &self.parameter_blob)?;
        Ok(decoded.instance.and_then(|instance| ty.upcast::<B>(instance)))
    }

    /// Encode `value` into the blob. `T` must be the chosen type.
    pub fn store<T: Parameters>(
        &mut self,
        registry: &TypeRegistry,
        value: &T,
    ) -> Result<Vec<Diagnostic>, SlotError> {
        let expected = self.current_type(registry).map(TypeRegistration::identity);
        if expected != Some(T::identity()) {
            return Err(SlotError::WrongInstanceType {
                expected: expected.unwrap_or(NULL_TYPE).to_owned(),
                found: T::identity(),
            });
        }
        let encoded = codec::encode(value)?;
        self.parameter_blob = encoded.blob;
        Ok(encoded.diagnostics)
    }

    /// Set one field of the chosen type. The blob is only rewritten on
    /// success.
    pub fn edit_field(
        &mut self,
        registry: &TypeRegistry,
        name: &str,
        value: impl Into<FieldValue>,
    ) -> Result<Vec<Diagnostic>, SlotError> {
        let ty = self.current_type(registry).ok_or(CodecError::NoType)?;
        let encoded = codec::merge_field(Some(ty), &self.parameter_blob, name, value.into())?;
        self.parameter_blob = encoded.blob;
        Ok(encoded.diagnostics)
    }

    /// Number of editable fields of the chosen type.
    pub fn field_count(&self, registry: &TypeRegistry) -> usize {
        codec::field_count(self.current_type(registry))
    }

    /// Produce the record the owner persists.
    pub fn before_persist(&self, registry: &TypeRegistry) -> SlotRecord {
        SlotRecord {
            chosen_type: self
                .chosen_type
                .clone()
                .unwrap_or_else(|| NULL_TYPE.to_owned()),
            parameter_blob: self.parameter_blob.clone(),
            base_type: registry
                .get::<B>()
                .map(|base| base.identity().to_owned()),
        }
    }

    /// Rebuild a slot from a persisted record.
    ///
    /// An identity that no longer resolves to a type assignable to `B`
    /// degrades to no selection. The blob is kept either way.
    pub fn after_load(registry: &TypeRegistry, record: SlotRecord) -> Self {
        let chosen_type = record.chosen_identity().and_then(|identity| {
            match registry.resolve(identity) {
                Some(ty) if ty.is_assignable_to::<B>() => Some(ty.identity().to_owned()),
                Some(_) => {
                    log::warn!(
                        "{}: stored type '{identity}' is not assignable; clearing selection",
                        Self::base_name()
                    );
                    None
                }
                None => {
                    log::warn!(
                        "{}: stored type '{identity}' no longer exists; clearing selection",
                        Self::base_name()
                    );
                    None
                }
            }
        });
        Self {
            chosen_type,
            parameter_blob: record.parameter_blob,
            _base: PhantomData,
        }
    }
}

impl<B: ?Sized + 'static> Default for TypedSlot<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: ?Sized + 'static> Clone for TypedSlot<B> {
    fn clone(&self) -> Self {
        Self {
            chosen_type: self.chosen_type.clone(),
            parameter_blob: self.parameter_blob.clone(),
            _base: PhantomData,
        }
    }
}

impl<B: ?Sized + 'static> PartialEq for TypedSlot<B> {
    fn eq(&self, other: &Self) -> bool {
        self.chosen_type == other.chosen_type && self.parameter_blob == other.parameter_blob
    }
}

impl<B: ?Sized + 'static> std::fmt::Debug for TypedSlot<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedSlot")
            .field("base", &Self::base_name())
            .field("chosen_type", &self.chosen_type)
            .field("parameter_blob", &self.parameter_blob)
            .finish()
    }
}
