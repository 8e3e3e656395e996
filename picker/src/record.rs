//! On-disk representation of a typed slot.

use serde::{Deserialize, Serialize};

/// Identity token stored when nothing is selected.
pub const NULL_TYPE: &str = "null";

/// Persisted form of a [`TypedSlot`](crate::TypedSlot).
///
/// ```json
/// { "chosen_type": "shapes::Circle", "parameter_blob": "{\"radius\":2.5}" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRecord {
    /// Identity of the chosen type, or `"null"`.
    #[serde(default = "null_type")]
    pub chosen_type: String,
    #[serde(default)]
    pub parameter_blob: String,
    /// Editor metadata: identity of the slot's declared base. Never read
    /// back when decoding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_type: Option<String>,
}

fn null_type() -> String {
    NULL_TYPE.into()
}

impl SlotRecord {
    /// Chosen identity, treating empty and `"null"` as no selection.
    pub fn chosen_identity(&self) -> Option<&str> {
        match self.chosen_type.as_str() {
            "" | NULL_TYPE => None,
            identity => Some(identity),
        }
    }
}

impl Default for SlotRecord {
    fn default() -> Self {
        Self {
            chosen_type: null_type(),
            parameter_blob: String::new(),
            base_type: None,
        }
    }
}
