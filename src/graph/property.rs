//! Attribute values for graph vertices

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Attribute value attached to a vertex
///
/// Serializes untagged so that vertex attributes flatten into plain JSON
/// scalars in the interchange form. Concepts only carry strings; numbers and
/// nulls appear when reading back graphs written by other tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    String(String),
    Float(f64),
    Null,
}

impl PropertyValue {
    /// Get string value if this is a string
    pub fn as_string(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::String(s)
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::String(s.to_string())
    }
}

/// Insertion-ordered attribute map for vertices
pub type PropertyMap = IndexMap<String, PropertyValue>;
