//! Demo shapes selectable through a `TypedSlot<dyn Shape>`.

use std::f32::consts::PI;

use type_picker::{Parameters, RegistryError, TypeRegistry};

/// A 2D shape with a computable area.
pub trait Shape: Send + Sync {
    fn area(&self) -> f32;

    /// One-line human-readable summary.
    fn describe(&self) -> String;
}

#[derive(Debug, Default, Clone, PartialEq, Parameters)]
#[params(identity = "shapes::Circle")]
pub struct Circle {
    #[param]
    pub radius: f32,
}

impl Shape for Circle {
    fn area(&self) -> f32 {
        PI * self.radius * self.radius
    }

    fn describe(&self) -> String {
        format!("circle r={}", self.radius)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Parameters)]
#[params(identity = "shapes::Square")]
pub struct Square {
    #[param(label = "Side length")]
    pub side: f32,
}

impl Shape for Square {
    fn area(&self) -> f32 {
        self.side * self.side
    }

    fn describe(&self) -> String {
        format!("square side={}", self.side)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Parameters)]
#[params(identity = "shapes::Ring")]
pub struct Ring {
    #[param]
    pub radius: f32,
    #[param]
    pub segments: i32,
    #[param]
    pub filled: bool,
}

impl Shape for Ring {
    fn area(&self) -> f32 {
        if !self.filled || self.segments < 3 {
            return 0.0;
        }
        // Area of the inscribed regular polygon.
        let n = self.segments as f32;
        0.5 * n * self.radius * self.radius * (2.0 * PI / n).sin()
    }

    fn describe(&self) -> String {
        let style = if self.filled { "filled" } else { "outline" };
        format!("ring r={} n={} {style}", self.radius, self.segments)
    }
}

/// A labelled shape. Has no parameterless constructor, so a slot can pick
/// it but never materialize it.
#[derive(Debug, Clone, PartialEq, Parameters)]
#[params(identity = "shapes::Badge")]
pub struct Badge {
    #[param]
    pub text: String,
    #[param]
    pub scale: f32,
}

impl Badge {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            scale: 1.0,
        }
    }
}

impl Shape for Badge {
    fn area(&self) -> f32 {
        self.text.chars().count() as f32 * self.scale
    }

    fn describe(&self) -> String {
        format!("badge {:?}", self.text)
    }
}

/// Register the `Shape` base and every demo shape.
pub fn register_shapes(registry: &mut TypeRegistry) -> Result<(), RegistryError> {
    registry.register_interface::<dyn Shape>("shapes::Shape", "Shape")?;
    registry
        .register::<Circle>()?
        .implements::<dyn Shape>(|c| Box::new(c));
    registry
        .register::<Square>()?
        .implements::<dyn Shape>(|s| Box::new(s));
    registry
        .register::<Ring>()?
        .implements::<dyn Shape>(|r| Box::new(r));
    registry
        .register_without_default::<Badge>()?
        .implements::<dyn Shape>(|b| Box::new(b));
    Ok(())
}
