//! Declarative per-type schemas of externally-settable fields.
//!
//! A [`TypeSchema`] lists, in declaration order, the fields a type opts in
//! to blob authoring. Fields that are not in the schema never take part in
//! decoding or encoding. The `#[derive(Parameters)]` macro builds the
//! schema from `#[param]` attributes; hand-written impls use
//! [`TypeSchema::builder`].

use std::any::Any;

use crate::value::{FieldKind, FieldValue};

/// One externally-settable field of a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub kind: FieldKind,
    /// Overrides the label derived from the field name.
    pub display_name: Option<&'static str>,
}

impl FieldDescriptor {
    /// Label shown next to the field's widget.
    ///
    /// Without an override, underscores are removed and the first
    /// character is upper-cased (`max_speed` becomes `Maxspeed`).
    pub fn label(&self) -> String {
        if let Some(display_name) = self.display_name {
            return display_name.to_owned();
        }
        let stripped: String = self.name.chars().filter(|&c| c != '_').collect();
        let mut chars = stripped.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

/// The externally-settable fields of one type, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSchema {
    type_name: &'static str,
    fields: Vec<FieldDescriptor>,
}

impl TypeSchema {
    pub fn builder(type_name: &'static str) -> TypeSchemaBuilder {
        TypeSchemaBuilder {
            schema: TypeSchema {
                type_name,
                fields: Vec::new(),
            },
        }
    }

    /// Short type name (e.g. `"Circle"`).
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// All marked fields, including those of unsupported kinds.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Exact-name lookup of a marked field.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Marked fields whose kind is on the allow-list.
    pub fn allowed_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.kind.is_allowed())
    }

    /// Number of editable fields; one widget row per field.
    pub fn field_count(&self) -> usize {
        self.allowed_fields().count()
    }
}

/// Builder for [`TypeSchema`].
pub struct TypeSchemaBuilder {
    schema: TypeSchema,
}

impl TypeSchemaBuilder {
    /// Add a field labelled from its name.
    pub fn field(mut self, name: &'static str, kind: FieldKind) -> Self {
        self.schema.fields.push(FieldDescriptor {
            name,
            kind,
            display_name: None,
        });
        self
    }

    /// Add a field with an explicit display name.
    pub fn labeled(mut self, name: &'static str, kind: FieldKind, label: &'static str) -> Self {
        self.schema.fields.push(FieldDescriptor {
            name,
            kind,
            display_name: Some(label),
        });
        self
    }

    pub fn build(self) -> TypeSchema {
        debug_assert!(
            self.schema
                .fields
                .iter()
                .enumerate()
                .all(|(i, f)| self.schema.fields[..i].iter().all(|g| g.name != f.name)),
            "duplicate field in schema of {}",
            self.schema.type_name
        );
        self.schema
    }
}

/// Upcasting helpers for [`Parameters`] trait objects.
///
/// Blanket-implemented for every `'static` type. Call these on
/// `&dyn Parameters` or `Box<dyn Parameters>`; calling `as_any` on a
/// `&Box<dyn Parameters>` resolves to the box itself.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// A type whose externally-settable fields can be authored through a blob.
///
/// # Deriving
///
/// ```ignore
/// #[derive(Default, Parameters)]
/// struct Circle {
///     #[param]
///     radius: f32,
///     #[param(label = "Fill colour")]
///     fill: String,
///     cached_area: f32, // not authored
/// }
/// ```
///
/// # Manual implementation
///
/// ```ignore
/// impl Parameters for Circle {
///     fn identity() -> &'static str { "shapes::Circle" }
///     fn schema() -> &'static TypeSchema {
///         static SCHEMA: LazyLock<TypeSchema> = LazyLock::new(|| {
///             TypeSchema::builder("Circle").field("radius", FieldKind::Float).build()
///         });
///         &SCHEMA
///     }
///     fn param_schema(&self) -> &'static TypeSchema { Self::schema() }
///     fn get_param(&self, name: &str) -> Option<FieldValue> {
///         match name {
///             "radius" => Some(self.radius.into()),
///             _ => None,
///         }
///     }
///     fn set_param(&mut self, name: &str, value: FieldValue) -> bool {
///         match (name, value) {
///             ("radius", FieldValue::Float(v)) => { self.radius = v; true }
///             _ => false,
///         }
///     }
/// }
/// ```
pub trait Parameters: AsAny + Send + Sync {
    /// Stable, globally resolvable identity (e.g. `"shapes::Circle"`).
    fn identity() -> &'static str
    where
        Self: Sized;

    /// Schema of the type, available without an instance.
    fn schema() -> &'static TypeSchema
    where
        Self: Sized;

    /// Schema of the runtime type behind a trait object.
    fn param_schema(&self) -> &'static TypeSchema;

    /// Current value of an allow-listed marked field.
    fn get_param(&self, name: &str) -> Option<FieldValue>;

    /// Set an allow-listed marked field.
    ///
    /// Returns `false` when the field is unknown or `value` is of the wrong
    /// kind; the instance is left unchanged in that case.
    fn set_param(&mut self, name: &str, value: FieldValue) -> bool;
}
