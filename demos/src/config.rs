use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use type_picker::{FieldValue, SlotRecord, TypeRegistry, TypedSlot};

use crate::shapes::Shape;

/// Top-level demo configuration loaded from a TOML file.
///
/// ```toml
/// [[slot]]
/// name = "wheel"
/// chosen_type = "shapes::Ring"
/// parameter_blob = '{"radius": 2, "segments": 16}'
/// edit = { filled = true }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct DemoConfig {
    #[serde(default, rename = "slot")]
    pub slots: Vec<SlotConfig>,
}

/// A persisted slot record plus optional field edits to apply after load.
#[derive(Debug, Clone, Deserialize)]
pub struct SlotConfig {
    pub name: String,
    #[serde(flatten)]
    pub record: SlotRecord,
    /// Field edits, applied in key order.
    #[serde(default)]
    pub edit: BTreeMap<String, toml::Value>,
}

/// Load a demo config from a TOML file.
///
/// Returns `Err` with a human-readable message if the file cannot be read
/// or parsed.
pub fn load_config(path: &Path) -> Result<DemoConfig, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    parse_config(&content).map_err(|e| format!("failed to parse {}: {e}", path.display()))
}

pub fn parse_config(content: &str) -> Result<DemoConfig, toml::de::Error> {
    toml::from_str(content)
}

/// Convert a TOML edit value to the kind of the slot's field.
///
/// Goes through the same coercion as blob decoding, so `radius = 2` sets a
/// float field.
pub fn edit_value(
    registry: &TypeRegistry,
    slot: &TypedSlot<dyn Shape>,
    field: &str,
    value: &toml::Value,
) -> Result<FieldValue, String> {
    let kind = slot
        .current_type(registry)
        .and_then(|ty| ty.schema())
        .and_then(|schema| schema.field(field))
        .map(|descriptor| descriptor.kind)
        .ok_or_else(|| format!("no editable field '{field}'"))?;
    let literal = serde_json::to_value(value).map_err(|e| e.to_string())?;
    FieldValue::coerce(&literal, kind).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::register_shapes;

    const SAMPLE: &str = r#"
[[slot]]
name = "wheel"
chosen_type = "shapes::Ring"
parameter_blob = '{"radius": 2, "segments": 16}'
edit = { filled = true, radius = 3 }

[[slot]]
name = "empty"
"#;

    #[test]
    fn parses_slots() {
        let config = parse_config(SAMPLE).unwrap();
        assert_eq!(config.slots.len(), 2);

        let wheel = &config.slots[0];
        assert_eq!(wheel.record.chosen_identity(), Some("shapes::Ring"));
        assert_eq!(wheel.edit.len(), 2);

        let empty = &config.slots[1];
        assert_eq!(empty.record.chosen_identity(), None);
        assert!(empty.record.parameter_blob.is_empty());
    }

    #[test]
    fn edit_values_follow_field_kind() {
        let mut registry = TypeRegistry::new();
        register_shapes(&mut registry).unwrap();
        let config = parse_config(SAMPLE).unwrap();
        let slot = TypedSlot::<dyn Shape>::after_load(&registry, config.slots[0].record.clone());

        let radius = edit_value(&registry, &slot, "radius", &config.slots[0].edit["radius"]);
        assert_eq!(radius, Ok(FieldValue::Float(3.0)));

        let filled = edit_value(&registry, &slot, "filled", &toml::Value::Integer(1));
        assert!(filled.is_err());

        let missing = edit_value(&registry, &slot, "side", &toml::Value::Float(1.0));
        assert_eq!(missing, Err("no editable field 'side'".to_owned()));
    }

    #[test]
    fn bundled_slots_file_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("slots.toml");
        let config = load_config(&path).unwrap();
        let names: Vec<_> = config.slots.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["wheel", "tile", "stale", "badge", "removed", "empty"]);
    }

    #[test]
    fn missing_file_is_reported() {
        let err = load_config(Path::new("/nonexistent/slots.toml")).unwrap_err();
        assert!(err.starts_with("failed to read"));
    }
}
