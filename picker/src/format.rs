//! Format-specific encoding and decoding of owning records.
//!
//! Provides [`encode`] and [`decode`] functions that convert between
//! serde-serializable records (such as [`SlotRecord`](crate::SlotRecord))
//! and byte buffers. JSON is always available; RON is feature-gated.

use crate::error::FormatError;

/// Supported record formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Compact JSON.
    Json,
    /// RON (Rusty Object Notation) - human-readable text format.
    #[cfg(feature = "serialize-ron")]
    Ron,
}

/// Encode a serde-serializable value to bytes in the given format.
pub fn encode<T: serde::Serialize>(value: &T, format: Format) -> Result<Vec<u8>, FormatError> {
    match format {
        Format::Json => Ok(serde_json::to_vec(value)?),
        #[cfg(feature = "serialize-ron")]
        Format::Ron => ron::ser::to_string_pretty(value, ron::ser::PrettyConfig::default())
            .map(|s| s.into_bytes())
            .map_err(|e| FormatError::Ron(e.to_string())),
    }
}

/// Decode bytes in the given format to a serde-deserializable type.
pub fn decode<T: serde::de::DeserializeOwned>(
    bytes: &[u8],
    format: Format,
) -> Result<T, FormatError> {
    match format {
        Format::Json => Ok(serde_json::from_slice(bytes)?),
        #[cfg(feature = "serialize-ron")]
        Format::Ron => {
            let s = std::str::from_utf8(bytes)?;
            ron::from_str(s).map_err(|e| FormatError::Ron(e.to_string()))
        }
    }
}
