//! # Type Picker Demos
//!
//! Demo shapes for `TypedSlot<dyn Shape>` and the TOML config used by the
//! `slot_demo` binary.
//!
//! ## Available Demos
//!
//! - `slot_demo` - Load persisted slot records, apply edits and materialize them

mod config;
mod shapes;

pub use config::{DemoConfig, SlotConfig, edit_value, load_config, parse_config};
pub use shapes::{Badge, Circle, Ring, Shape, Square, register_shapes};

/// Demos library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
