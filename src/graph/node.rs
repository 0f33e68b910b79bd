//! Vertex implementation for the concept graph

use super::property::{PropertyMap, PropertyValue};
use super::types::ConceptKey;
use serde::{Deserialize, Serialize};

/// A vertex in the concept graph
///
/// Vertices are addressed by their composite key and carry a free-form
/// attribute map (`label`, `summary`, `type`, `paper` for concepts).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vertex {
    /// Composite identifier
    pub id: ConceptKey,

    /// Attributes associated with this vertex
    pub properties: PropertyMap,
}

impl Vertex {
    /// Create a vertex without attributes
    pub fn new(id: ConceptKey) -> Self {
        Vertex {
            id,
            properties: PropertyMap::new(),
        }
    }

    /// Create a vertex with attributes
    pub fn new_with_properties(id: ConceptKey, properties: PropertyMap) -> Self {
        Vertex { id, properties }
    }

    pub fn get_property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    /// Merge attributes into this vertex; incoming values win
    pub fn merge_properties(&mut self, properties: PropertyMap) {
        for (key, value) in properties {
            self.properties.insert(key, value);
        }
    }

    /// Display label, if the vertex has one
    pub fn label(&self) -> Option<&str> {
        self.get_property("label").and_then(|v| v.as_string())
    }

    /// Title of the paper this concept came from
    pub fn paper(&self) -> Option<&str> {
        self.get_property("paper").and_then(|v| v.as_string())
    }

    pub fn property_count(&self) -> usize {
        self.properties.len()
    }
}

impl PartialEq for Vertex {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Vertex {}
