//! Global concept graph
//!
//! This module implements the merged knowledge graph:
//! - Vertices keyed by composite `<paper>_<node>` ids with free-form attributes
//! - Undirected edges, one per vertex pair, typed hierarchical / semantic-related / cross-paper
//! - Node/link interchange form for export

pub mod edge;
pub mod interchange;
pub mod node;
pub mod property;
pub mod store;
pub mod types;

// Re-export main types
pub use edge::Edge;
pub use interchange::{Interchange, InterchangeLink, InterchangeNode};
pub use node::Vertex;
pub use property::{PropertyMap, PropertyValue};
pub use store::{GraphError, GraphResult, GraphStatistics, GraphStore};
pub use types::{ConceptKey, EdgeKind};
