//! In-memory concept graph storage
//!
//! An undirected attributed graph with at most one materialized edge per
//! unordered vertex pair. Re-adding a pair coalesces into the existing edge
//! (last write wins on attributes). Nothing is ever removed.

use super::edge::{Edge, EdgeKey};
use super::interchange::{Interchange, InterchangeLink, InterchangeNode};
use super::node::Vertex;
use super::property::PropertyMap;
use super::types::{ConceptKey, EdgeKind};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;

/// Errors that can occur during graph lookups
#[derive(Error, Debug, PartialEq)]
pub enum GraphError {
    #[error("Vertex {0} not found")]
    VertexNotFound(ConceptKey),
}

pub type GraphResult<T> = Result<T, GraphError>;

/// In-memory graph storage
///
/// - vertices: ConceptKey -> Vertex (insertion ordered)
/// - edges: unordered pair -> Edge (insertion ordered)
/// - adjacency: ConceptKey -> positions in `edges`
#[derive(Debug, Default)]
pub struct GraphStore {
    vertices: IndexMap<ConceptKey, Vertex>,
    edges: IndexMap<EdgeKey, Edge>,
    adjacency: HashMap<ConceptKey, Vec<usize>>,
}

/// Summary counts over the graph
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphStatistics {
    pub vertex_count: usize,
    pub edge_count: usize,
    pub hierarchical_edges: usize,
    pub semantic_edges: usize,
    pub cross_paper_edges: usize,
    pub paper_count: usize,
}

impl GraphStore {
    /// Create a new empty graph store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a vertex or merge attributes into an existing one.
    /// Returns true when the vertex is new.
    pub fn add_vertex(&mut self, id: ConceptKey, properties: PropertyMap) -> bool {
        match self.vertices.get_mut(&id) {
            Some(vertex) => {
                vertex.merge_properties(properties);
                false
            }
            None => {
                self.vertices
                    .insert(id.clone(), Vertex::new_with_properties(id, properties));
                true
            }
        }
    }

    fn ensure_vertex(&mut self, id: &ConceptKey) {
        if !self.vertices.contains_key(id) {
            self.vertices.insert(id.clone(), Vertex::new(id.clone()));
        }
    }

    /// Add an edge between `u` and `v`, creating missing endpoints.
    ///
    /// If the pair is already connected the existing edge keeps its
    /// orientation and takes the new kind (and weight, when given).
    /// Returns true when a new edge was materialized.
    pub fn add_edge(&mut self, u: &ConceptKey, v: &ConceptKey, kind: EdgeKind, weight: Option<f64>) -> bool {
        self.ensure_vertex(u);
        self.ensure_vertex(v);

        let key = EdgeKey::new(u, v);
        if let Some(existing) = self.edges.get_mut(&key) {
            existing.merge(kind, weight);
            return false;
        }

        let edge = Edge {
            source: u.clone(),
            target: v.clone(),
            kind,
            weight,
        };
        let (position, _) = self.edges.insert_full(key, edge);
        self.adjacency.entry(u.clone()).or_default().push(position);
        if u != v {
            self.adjacency.entry(v.clone()).or_default().push(position);
        }
        true
    }

    pub fn get_vertex(&self, id: &ConceptKey) -> Option<&Vertex> {
        self.vertices.get(id)
    }

    pub fn contains_vertex(&self, id: &ConceptKey) -> bool {
        self.vertices.contains_key(id)
    }

    /// Edge between two vertices, in either direction
    pub fn get_edge(&self, u: &ConceptKey, v: &ConceptKey) -> Option<&Edge> {
        self.edges.get(&EdgeKey::new(u, v))
    }

    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.values()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    pub fn edges_of_kind(&self, kind: EdgeKind) -> impl Iterator<Item = &Edge> {
        self.edges.values().filter(move |e| e.kind == kind)
    }

    /// Edges incident to a vertex
    pub fn edges_of(&self, id: &ConceptKey) -> GraphResult<Vec<&Edge>> {
        if !self.vertices.contains_key(id) {
            return Err(GraphError::VertexNotFound(id.clone()));
        }
        Ok(self
            .adjacency
            .get(id)
            .map(|positions| {
                positions
                    .iter()
                    .filter_map(|&p| self.edges.get_index(p).map(|(_, e)| e))
                    .collect()
            })
            .unwrap_or_default())
    }

    /// Vertices adjacent to `id`
    pub fn neighbors(&self, id: &ConceptKey) -> GraphResult<Vec<&ConceptKey>> {
        Ok(self
            .edges_of(id)?
            .into_iter()
            .filter_map(|e| e.other(id))
            .collect())
    }

    pub fn node_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn statistics(&self) -> GraphStatistics {
        let mut stats = GraphStatistics {
            vertex_count: self.vertices.len(),
            edge_count: self.edges.len(),
            ..Default::default()
        };
        for edge in self.edges.values() {
            match edge.kind {
                EdgeKind::Hierarchical => stats.hierarchical_edges += 1,
                EdgeKind::SemanticRelated => stats.semantic_edges += 1,
                EdgeKind::CrossPaper => stats.cross_paper_edges += 1,
            }
        }
        stats.paper_count = self
            .vertices
            .values()
            .filter_map(|v| v.paper())
            .collect::<BTreeSet<_>>()
            .len();
        stats
    }

    /// Node/link form of the whole graph, in insertion order
    pub fn to_interchange(&self) -> Interchange {
        let nodes = self
            .vertices
            .values()
            .map(|v| InterchangeNode {
                id: v.id.as_str().to_string(),
                attributes: v.properties.clone(),
            })
            .collect();

        let links = self
            .edges
            .values()
            .map(|e| InterchangeLink {
                source: e.source.as_str().to_string(),
                target: e.target.as_str().to_string(),
                kind: e.kind,
                weight: e.weight,
            })
            .collect();

        Interchange {
            directed: false,
            multigraph: false,
            nodes,
            links,
        }
    }
}
