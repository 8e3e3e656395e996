//! Hand-implemented [`Parameters`] types shared by unit tests.

use std::sync::LazyLock;

use crate::schema::{Parameters, TypeSchema};
use crate::value::{FieldKind, FieldValue};

pub trait Shape: Send + Sync {
    fn area(&self) -> f32;
}

pub trait Named: Send + Sync {
    fn name(&self) -> String;
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Circle {
    pub radius: f32,
}

impl Shape for Circle {
    fn area(&self) -> f32 {
        std::f32::consts::PI * self.radius * self.radius
    }
}

impl Parameters for Circle {
    fn identity() -> &'static str {
        "test_types::Circle"
    }

    fn schema() -> &'static TypeSchema {
        static SCHEMA: LazyLock<TypeSchema> = LazyLock::new(|| {
            TypeSchema::builder("Circle")
                .field("radius", FieldKind::Float)
                .build()
        });
        &SCHEMA
    }

    fn param_schema(&self) -> &'static TypeSchema {
        Self::schema()
    }

    fn get_param(&self, name: &str) -> Option<FieldValue> {
        match name {
            "radius" => Some(self.radius.into()),
            _ => None,
        }
    }

    fn set_param(&mut self, name: &str, value: FieldValue) -> bool {
        match (name, value) {
            ("radius", FieldValue::Float(v)) => {
                self.radius = v;
                true
            }
            _ => false,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Square {
    pub side: f32,
    /// Not authored; always starts at its default.
    pub cached_area: f32,
}

impl Shape for Square {
    fn area(&self) -> f32 {
        self.side * self.side
    }
}

impl Parameters for Square {
    fn identity() -> &'static str {
        "test_types::Square"
    }

    fn schema() -> &'static TypeSchema {
        static SCHEMA: LazyLock<TypeSchema> = LazyLock::new(|| {
            TypeSchema::builder("Square")
                .labeled("side", FieldKind::Float, "Side length")
                .build()
        });
        &SCHEMA
    }

    fn param_schema(&self) -> &'static TypeSchema {
        Self::schema()
    }

    fn get_param(&self, name: &str) -> Option<FieldValue> {
        match name {
            "side" => Some(self.side.into()),
            _ => None,
        }
    }

    fn set_param(&mut self, name: &str, value: FieldValue) -> bool {
        match (name, value) {
            ("side", FieldValue::Float(v)) => {
                self.side = v;
                true
            }
            _ => false,
        }
    }
}

/// Shares `radius` with [`Circle`] but adds fields of other kinds.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Ring {
    pub radius: f32,
    pub segments: i32,
    pub filled: bool,
}

impl Shape for Ring {
    fn area(&self) -> f32 {
        0.0
    }
}

impl Parameters for Ring {
    fn identity() -> &'static str {
        "test_types::Ring"
    }

    fn schema() -> &'static TypeSchema {
        static SCHEMA: LazyLock<TypeSchema> = LazyLock::new(|| {
            TypeSchema::builder("Ring")
                .field("radius", FieldKind::Float)
                .field("segments", FieldKind::Int)
                .field("filled", FieldKind::Bool)
                .build()
        });
        &SCHEMA
    }

    fn param_schema(&self) -> &'static TypeSchema {
        Self::schema()
    }

    fn get_param(&self, name: &str) -> Option<FieldValue> {
        match name {
            "radius" => Some(self.radius.into()),
            "segments" => Some(self.segments.into()),
            "filled" => Some(self.filled.into()),
            _ => None,
        }
    }

    fn set_param(&mut self, name: &str, value: FieldValue) -> bool {
        match (name, value) {
            ("radius", FieldValue::Float(v)) => self.radius = v,
            ("segments", FieldValue::Int(v)) => self.segments = v,
            ("filled", FieldValue::Bool(v)) => self.filled = v,
            _ => return false,
        }
        true
    }
}

/// Has one marked field of a kind outside the allow-list (`tags`).
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    pub size: i32,
    pub visible: bool,
    pub tags: Vec<String>,
}

impl Named for Label {
    fn name(&self) -> String {
        self.text.clone()
    }
}

impl Parameters for Label {
    fn identity() -> &'static str {
        "test_types::Label"
    }

    fn schema() -> &'static TypeSchema {
        static SCHEMA: LazyLock<TypeSchema> = LazyLock::new(|| {
            TypeSchema::builder("Label")
                .field("text", FieldKind::Text)
                .field("size", FieldKind::Int)
                .field("visible", FieldKind::Bool)
                .field("tags", FieldKind::Unsupported("alloc::vec::Vec<String>"))
                .build()
        });
        &SCHEMA
    }

    fn param_schema(&self) -> &'static TypeSchema {
        Self::schema()
    }

    fn get_param(&self, name: &str) -> Option<FieldValue> {
        match name {
            "text" => Some(self.text.clone().into()),
            "size" => Some(self.size.into()),
            "visible" => Some(self.visible.into()),
            _ => None,
        }
    }

    fn set_param(&mut self, name: &str, value: FieldValue) -> bool {
        match (name, value) {
            ("text", FieldValue::Text(v)) => self.text = v,
            ("size", FieldValue::Int(v)) => self.size = v,
            ("visible", FieldValue::Bool(v)) => self.visible = v,
            _ => return false,
        }
        true
    }
}

/// A shape that cannot be default-constructed.
pub struct Polygon {
    pub corners: i32,
}

impl Shape for Polygon {
    fn area(&self) -> f32 {
        0.0
    }
}

impl Parameters for Polygon {
    fn identity() -> &'static str {
        "test_types::Polygon"
    }

    fn schema() -> &'static TypeSchema {
        static SCHEMA: LazyLock<TypeSchema> = LazyLock::new(|| {
            TypeSchema::builder("Polygon")
                .field("corners", FieldKind::Int)
                .build()
        });
        &SCHEMA
    }

    fn param_schema(&self) -> &'static TypeSchema {
        Self::schema()
    }

    fn get_param(&self, name: &str) -> Option<FieldValue> {
        (name == "corners").then_some(self.corners.into())
    }

    fn set_param(&mut self, name: &str, value: FieldValue) -> bool {
        match (name, value) {
            ("corners", FieldValue::Int(v)) => {
                self.corners = v;
                true
            }
            _ => false,
        }
    }
}

/// A registry with `dyn Shape` candidates `Circle`, `Square`, `Ring` and
/// `Polygon`, plus `Label` which is only a `dyn Named`.
pub fn shape_registry() -> crate::TypeRegistry {
    let mut registry = crate::TypeRegistry::new();
    registry
        .register_interface::<dyn Shape>("test_types::Shape", "Shape")
        .unwrap();
    registry
        .register::<Circle>()
        .unwrap()
        .implements::<dyn Shape>(|c| Box::new(c));
    registry
        .register::<Square>()
        .unwrap()
        .implements::<dyn Shape>(|s| Box::new(s));
    registry
        .register::<Ring>()
        .unwrap()
        .implements::<dyn Shape>(|r| Box::new(r));
    registry
        .register_without_default::<Polygon>()
        .unwrap()
        .implements::<dyn Shape>(|p| Box::new(p));
    registry
        .register::<Label>()
        .unwrap()
        .implements::<dyn Named>(|l| Box::new(l));
    registry
}
