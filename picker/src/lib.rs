//! # Type Picker
//!
//! Typed slots: a record field that stores both a chosen concrete type for a
//! declared base and that type's authored construction parameters.
//!
//! ## Core Types
//!
//! - [`TypedSlot`] - chosen type identity plus a flat parameter blob
//! - [`TypeRegistry`] - explicit registration table of selectable types
//! - [`Parameters`] - per-type schema and field access, usually derived
//! - [`TypeSchema`] / [`FieldDescriptor`] - externally-settable fields
//! - [`FieldValue`] / [`FieldKind`] - the allow-listed value kinds
//!
//! ## Codec
//!
//! - [`codec::decode`] - materialize an instance from a blob, tolerating
//!   stale and mistyped fields
//! - [`codec::encode`] - write the marked fields back as a blob
//! - [`codec::merge_field`] - edit one field of a blob
//!
//! ## Persistence
//!
//! - [`SlotRecord`] - on-disk form of a slot
//! - [`Format`] / [`encode`] / [`decode`] - record I/O
//!
//! # Example
//!
//! ```ignore
//! use type_picker::{Parameters, TypeRegistry, TypedSlot};
//!
//! trait Shape: Send + Sync {}
//!
//! #[derive(Default, Parameters)]
//! struct Circle {
//!     #[param]
//!     radius: f32,
//! }
//! impl Shape for Circle {}
//!
//! let mut registry = TypeRegistry::new();
//! registry.register::<Circle>()?.implements::<dyn Shape>(|c| Box::new(c));
//!
//! let mut slot = TypedSlot::<dyn Shape>::new();
//! slot.select_type::<Circle>(&registry)?;
//! slot.edit_field(&registry, "radius", 2.5f32)?;
//! let shape: Box<dyn Shape> = slot.instance(&registry)?.unwrap();
//! ```

pub mod codec;
mod error;
mod format;
mod record;
mod registry;
mod schema;
mod slot;
mod value;

#[cfg(test)]
mod test_types;

pub use codec::{Decoded, Encoded};
pub use error::{CodecError, Diagnostic, FormatError, RegistryError, SlotError};
pub use format::{Format, decode, encode};
pub use record::{NULL_TYPE, SlotRecord};
pub use registry::{RegistrationBuilder, TypeKind, TypeRegistration, TypeRegistry};
pub use schema::{AsAny, FieldDescriptor, Parameters, TypeSchema, TypeSchemaBuilder};
pub use slot::TypedSlot;
pub use type_picker_macro::Parameters;
pub use value::{FieldKind, FieldValue, ValueMismatch};
