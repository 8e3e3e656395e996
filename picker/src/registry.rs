//! Explicit type registry.
//!
//! Types are registered up front instead of being discovered by runtime
//! reflection. Each [`TypeRegistration`] records the type's stable
//! identity, its schema, how to default-construct it and the bases it is
//! assignable to. A base is any `?Sized` type, typically a trait object
//! such as `dyn Shape`.
//!
//! ```ignore
//! let mut registry = TypeRegistry::new();
//! registry.register_interface::<dyn Shape>("shapes::Shape", "Shape")?;
//! registry.register::<Circle>()?.implements::<dyn Shape>(|c| Box::new(c));
//! registry.register::<Square>()?.implements::<dyn Shape>(|s| Box::new(s));
//!
//! let candidates = registry.list_candidates::<dyn Shape>();
//! ```

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{CodecError, RegistryError};
use crate::schema::{Parameters, TypeSchema};

/// Whether a registration can be chosen for a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Concrete,
    /// A base (trait object) registered for identity resolution only.
    Interface,
}

/// Type-erased conversion from a concrete instance to `Box<B>`.
struct Upcast<B: ?Sized + 'static>(Box<dyn Fn(Box<dyn Any>) -> Option<Box<B>> + Send + Sync>);

/// Everything the registry knows about one type.
pub struct TypeRegistration {
    identity: &'static str,
    name: &'static str,
    type_id: TypeId,
    kind: TypeKind,
    schema: Option<&'static TypeSchema>,
    construct: Option<fn() -> Box<dyn Parameters>>,
    /// Keyed by the `TypeId` of each base; values hold an `Upcast<B>`.
    upcasts: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl TypeRegistration {
    /// Stable identity string used in persisted records.
    pub fn identity(&self) -> &'static str {
        self.identity
    }

    /// Short display name (e.g. `"Circle"`).
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// Field schema; `None` for interfaces.
    pub fn schema(&self) -> Option<&'static TypeSchema> {
        self.schema
    }

    /// Number of editable fields, zero for interfaces.
    pub fn field_count(&self) -> usize {
        self.schema.map_or(0, TypeSchema::field_count)
    }

    pub fn is_default_constructible(&self) -> bool {
        self.construct.is_some()
    }

    /// Whether values of this type can be stored in a slot of base `B`.
    pub fn is_assignable_to<B: ?Sized + 'static>(&self) -> bool {
        self.kind == TypeKind::Concrete && self.upcasts.contains_key(&TypeId::of::<B>())
    }

    /// Build a default instance.
    pub fn construct(&self) -> Result<Box<dyn Parameters>, CodecError> {
        let construct = self.construct.ok_or_else(|| CodecError::ConstructionError {
            type_name: self.identity.to_owned(),
        })?;
        Ok(construct())
    }

    /// Convert an instance of this type into `Box<B>`.
    ///
    /// Returns `None` if the type is not assignable to `B` or `instance` is
    /// of a different type.
    pub fn upcast<B: ?Sized + 'static>(&self, instance: Box<dyn Parameters>) -> Option<Box<B>> {
        let upcast = self
            .upcasts
            .get(&TypeId::of::<B>())?
            .downcast_ref::<Upcast<B>>()?;
        (upcast.0)(instance.into_any())
    }
}

impl std::fmt::Debug for TypeRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRegistration")
            .field("identity", &self.identity)
            .field("kind", &self.kind)
            .field("bases", &self.upcasts.len())
            .finish_non_exhaustive()
    }
}

/// Registration table of every type that can appear in a slot.
///
/// Iteration order is registration order. Candidate lists are cached per
/// base and dropped whenever the table changes.
#[derive(Default)]
pub struct TypeRegistry {
    entries: Vec<TypeRegistration>,
    by_identity: HashMap<&'static str, usize>,
    by_type: HashMap<TypeId, usize>,
    candidates: RwLock<HashMap<TypeId, Arc<[&'static str]>>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a default-constructible type.
    pub fn register<T: Parameters + Default>(
        &mut self,
    ) -> Result<RegistrationBuilder<'_, T>, RegistryError> {
        self.insert::<T>(Some(construct_default::<T>))
    }

    /// Register a type with no parameterless constructor.
    ///
    /// It can be selected, but decoding it fails with
    /// [`CodecError::ConstructionError`].
    pub fn register_without_default<T: Parameters>(
        &mut self,
    ) -> Result<RegistrationBuilder<'_, T>, RegistryError> {
        self.insert::<T>(None)
    }

    /// Register a base under a stable identity.
    ///
    /// Interfaces resolve like any other identity but are never candidates
    /// and can never be selected.
    pub fn register_interface<B: ?Sized + 'static>(
        &mut self,
        identity: &'static str,
        name: &'static str,
    ) -> Result<(), RegistryError> {
        self.push(TypeRegistration {
            identity,
            name,
            type_id: TypeId::of::<B>(),
            kind: TypeKind::Interface,
            schema: None,
            construct: None,
            upcasts: HashMap::new(),
        })
        .map(|_| ())
    }

    fn insert<T: Parameters>(
        &mut self,
        construct: Option<fn() -> Box<dyn Parameters>>,
    ) -> Result<RegistrationBuilder<'_, T>, RegistryError> {
        let schema = T::schema();
        let index = self.push(TypeRegistration {
            identity: T::identity(),
            name: schema.type_name(),
            type_id: TypeId::of::<T>(),
            kind: TypeKind::Concrete,
            schema: Some(schema),
            construct,
            upcasts: HashMap::new(),
        })?;
        Ok(RegistrationBuilder {
            registry: self,
            index,
            _marker: PhantomData,
        })
    }

    fn push(&mut self, registration: TypeRegistration) -> Result<usize, RegistryError> {
        if self.by_identity.contains_key(registration.identity) {
            return Err(RegistryError::DuplicateIdentity(
                registration.identity.to_owned(),
            ));
        }
        if self.by_type.contains_key(&registration.type_id) {
            return Err(RegistryError::DuplicateType(registration.identity));
        }
        log::debug!("Registered type '{}'", registration.identity);
        let index = self.entries.len();
        self.by_identity.insert(registration.identity, index);
        self.by_type.insert(registration.type_id, index);
        self.entries.push(registration);
        self.invalidate_candidates();
        Ok(index)
    }

    /// Remove a registration, e.g. when a plugin unloads.
    pub fn unregister(&mut self, identity: &str) -> Option<TypeRegistration> {
        let index = self.by_identity.get(identity).copied()?;
        let removed = self.entries.remove(index);
        self.by_identity.clear();
        self.by_type.clear();
        for (i, entry) in self.entries.iter().enumerate() {
            self.by_identity.insert(entry.identity, i);
            self.by_type.insert(entry.type_id, i);
        }
        self.invalidate_candidates();
        log::debug!("Unregistered type '{identity}'");
        Some(removed)
    }

    /// Look up a registration by identity string.
    pub fn resolve(&self, identity: &str) -> Option<&TypeRegistration> {
        self.by_identity.get(identity).map(|&i| &self.entries[i])
    }

    /// Look up the registration of a Rust type (concrete or interface).
    pub fn get<T: ?Sized + 'static>(&self) -> Option<&TypeRegistration> {
        self.by_type
            .get(&TypeId::of::<T>())
            .map(|&i| &self.entries[i])
    }

    /// All registrations in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &TypeRegistration> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Identities of every concrete type assignable to `B`, excluding `B`
    /// itself, in registration order.
    pub fn list_assignable_types<B: ?Sized + 'static>(&self) -> Arc<[&'static str]> {
        let base = TypeId::of::<B>();
        if let Some(cached) = self.candidates.read().get(&base) {
            return Arc::clone(cached);
        }
        let list: Arc<[&'static str]> = self
            .entries
            .iter()
            .filter(|e| e.type_id != base && e.is_assignable_to::<B>())
            .map(|e| e.identity)
            .collect();
        self.candidates.write().insert(base, Arc::clone(&list));
        list
    }

    /// Candidate types for a slot of base `B`. Same as
    /// [`list_assignable_types`](Self::list_assignable_types).
    pub fn list_candidates<B: ?Sized + 'static>(&self) -> Arc<[&'static str]> {
        self.list_assignable_types::<B>()
    }

    fn invalidate_candidates(&mut self) {
        self.candidates.get_mut().clear();
    }
}

fn construct_default<T: Parameters + Default>() -> Box<dyn Parameters> {
    Box::new(T::default())
}

/// Returned by [`TypeRegistry::register`] to declare assignable bases.
pub struct RegistrationBuilder<'r, T> {
    registry: &'r mut TypeRegistry,
    index: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Parameters> RegistrationBuilder<'_, T> {
    /// Declare that `T` can be stored in slots of base `B`.
    pub fn implements<B: ?Sized + 'static>(self, cast: fn(T) -> Box<B>) -> Self {
        let upcast = Upcast::<B>(Box::new(move |any: Box<dyn Any>| {
            any.downcast::<T>().ok().map(|value| cast(*value))
        }));
        self.registry.entries[self.index]
            .upcasts
            .insert(TypeId::of::<B>(), Box::new(upcast));
        self.registry.invalidate_candidates();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_types::{Circle, Label, Named, Polygon, Ring, Shape, Square, shape_registry};

    #[test]
    fn candidates_follow_registration_order() {
        let registry = shape_registry();
        let candidates = registry.list_candidates::<dyn Shape>();
        assert_eq!(
            &*candidates,
            [
                "test_types::Circle",
                "test_types::Square",
                "test_types::Ring",
                "test_types::Polygon",
            ]
        );
    }

    #[test]
    fn candidates_exclude_interfaces_and_other_bases() {
        let registry = shape_registry();
        let named = registry.list_candidates::<dyn Named>();
        assert_eq!(&*named, ["test_types::Label"]);
        assert!(
            !registry
                .list_candidates::<dyn Shape>()
                .contains(&"test_types::Shape")
        );
    }

    #[test]
    fn candidates_exclude_the_base_itself() {
        let mut registry = TypeRegistry::new();
        registry
            .register::<Circle>()
            .unwrap()
            .implements::<Circle>(Box::new);
        registry
            .register::<Ring>()
            .unwrap()
            .implements::<Circle>(|r| Box::new(Circle { radius: r.radius }));
        assert_eq!(
            &*registry.list_candidates::<Circle>(),
            ["test_types::Ring"]
        );
    }

    #[test]
    fn candidate_list_is_stable_and_cached() {
        let registry = shape_registry();
        let first = registry.list_candidates::<dyn Shape>();
        let second = registry.list_candidates::<dyn Shape>();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn registration_changes_invalidate_cache() {
        let mut registry = shape_registry();
        let before = registry.list_candidates::<dyn Shape>();
        assert!(registry.unregister("test_types::Square").is_some());
        let after = registry.list_candidates::<dyn Shape>();
        assert_eq!(before.len(), 4);
        assert_eq!(
            &*after,
            [
                "test_types::Circle",
                "test_types::Ring",
                "test_types::Polygon"
            ]
        );
        assert!(registry.resolve("test_types::Square").is_none());
        assert_eq!(
            registry.get::<Ring>().unwrap().identity(),
            "test_types::Ring"
        );
    }

    #[test]
    fn new_registrations_invalidate_cache() {
        let mut registry = TypeRegistry::new();
        registry
            .register::<Circle>()
            .unwrap()
            .implements::<dyn Shape>(|c| Box::new(c));
        let first = registry.list_candidates::<dyn Shape>();
        assert_eq!(&*first, ["test_types::Circle"]);

        registry.register::<Square>().unwrap();
        let unassignable = registry.list_candidates::<dyn Shape>();
        assert!(!Arc::ptr_eq(&first, &unassignable));
        assert_eq!(&*unassignable, ["test_types::Circle"]);

        registry
            .register::<Ring>()
            .unwrap()
            .implements::<dyn Shape>(|r| Box::new(r));
        let second = registry.list_candidates::<dyn Shape>();
        assert!(!Arc::ptr_eq(&unassignable, &second));
        assert_eq!(&*second, ["test_types::Circle", "test_types::Ring"]);
    }

    #[test]
    fn same_base_under_second_identity_is_rejected() {
        let mut registry = shape_registry();
        assert_eq!(
            registry.register_interface::<dyn Shape>("test_types::Outline", "Outline"),
            Err(RegistryError::DuplicateType("test_types::Outline"))
        );
        assert!(registry.resolve("test_types::Outline").is_none());
    }

    #[test]
    fn duplicate_identity_is_rejected() {
        let mut registry = shape_registry();
        assert_eq!(
            registry.register::<Circle>().err(),
            Some(RegistryError::DuplicateIdentity(
                "test_types::Circle".into()
            ))
        );
        assert_eq!(
            registry.register_interface::<dyn Named>("test_types::Shape", "Named"),
            Err(RegistryError::DuplicateIdentity("test_types::Shape".into()))
        );
    }

    #[test]
    fn resolve_reports_kind_and_schema() {
        let registry = shape_registry();
        let shape = registry.resolve("test_types::Shape").unwrap();
        assert_eq!(shape.kind(), TypeKind::Interface);
        assert!(shape.schema().is_none());
        assert_eq!(shape.field_count(), 0);
        assert!(!shape.is_assignable_to::<dyn Shape>());

        let label = registry.resolve("test_types::Label").unwrap();
        assert_eq!(label.kind(), TypeKind::Concrete);
        assert_eq!(label.name(), "Label");
        assert_eq!(label.field_count(), 3);
        assert!(label.is_assignable_to::<dyn Named>());
        assert!(!label.is_assignable_to::<dyn Shape>());

        assert!(registry.resolve("test_types::Missing").is_none());
    }

    #[test]
    fn construct_and_upcast() {
        let registry = shape_registry();
        let square = registry.get::<Square>().unwrap();
        let instance = square.construct().unwrap();
        let shape: Box<dyn Shape> = square.upcast::<dyn Shape>(instance).unwrap();
        assert_eq!(shape.area(), 0.0);

        let label = registry.get::<Label>().unwrap();
        let instance = label.construct().unwrap();
        assert!(label.upcast::<dyn Shape>(instance).is_none());
    }

    #[test]
    fn upcast_rejects_foreign_instance() {
        let registry = shape_registry();
        let circle = registry.get::<Circle>().unwrap();
        let square: Box<dyn Parameters> = Box::new(Square::default());
        assert!(circle.upcast::<dyn Shape>(square).is_none());
    }

    #[test]
    fn type_without_default_cannot_be_constructed() {
        let registry = shape_registry();
        let polygon = registry.get::<Polygon>().unwrap();
        assert!(!polygon.is_default_constructible());
        assert!(matches!(
            polygon.construct(),
            Err(CodecError::ConstructionError { .. })
        ));
    }
}
