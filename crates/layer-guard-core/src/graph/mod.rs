//! Directed dependency graph between class-like elements.
//!
//! ```text
//! (depender, dependee, DependencyType) facts
//!   ↓ DependencyGraphBuilder::add_dependency()
//! DependencyGraphBuilder (merges parallel edges)
//!   ↓ build()
//! DependencyGraph (read-only)
//!   ↓ arrows()
//! DependencyArrow → (caller, callee) pairs
//! ```

mod arrow;
mod builder;

pub use arrow::DependencyArrow;
pub use builder::DependencyGraphBuilder;

use indexmap::IndexSet;

use crate::dependency_type::DependencyType;
use crate::fqsen::ClassFqsen;

/// One directed edge: depender vertex → dependee vertex with its facts.
#[derive(Debug, Clone)]
pub(crate) struct Edge {
    pub(crate) depender: usize,
    pub(crate) dependee: usize,
    pub(crate) types: IndexSet<DependencyType>,
}

/// A built, read-only dependency graph.
///
/// Vertices and edges iterate in insertion order, which keeps every
/// report derived from the graph deterministic.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    vertices: IndexSet<ClassFqsen>,
    edges: Vec<Edge>,
    outgoing: Vec<Vec<usize>>,
    incoming: Vec<Vec<usize>>,
}

impl DependencyGraph {
    pub(crate) fn from_parts(vertices: IndexSet<ClassFqsen>, edges: Vec<Edge>) -> Self {
        let mut outgoing = vec![Vec::new(); vertices.len()];
        let mut incoming = vec![Vec::new(); vertices.len()];
        for (idx, edge) in edges.iter().enumerate() {
            outgoing[edge.depender].push(idx);
            incoming[edge.dependee].push(idx);
        }
        Self {
            vertices,
            edges,
            outgoing,
            incoming,
        }
    }

    /// Creates a new builder.
    #[must_use]
    pub fn builder() -> DependencyGraphBuilder {
        DependencyGraphBuilder::new()
    }

    /// Returns the number of class-like vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the number of edges (parallel facts merged).
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns `true` if the graph has no vertices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Iterates over all class-like vertices in insertion order.
    pub fn classes(&self) -> impl Iterator<Item = &ClassFqsen> {
        self.vertices.iter()
    }

    /// Returns `true` if the class is a vertex of this graph.
    #[must_use]
    pub fn contains_class(&self, class: &ClassFqsen) -> bool {
        self.vertices.contains(class)
    }

    /// Iterates over every edge in insertion order.
    pub fn arrows(&self) -> impl Iterator<Item = DependencyArrow<'_>> {
        self.edges.iter().map(move |edge| DependencyArrow::new(self, edge))
    }

    /// Iterates over edges leaving `class`.
    pub fn arrows_from<'a>(
        &'a self,
        class: &ClassFqsen,
    ) -> impl Iterator<Item = DependencyArrow<'a>> + 'a {
        self.edge_ids(class, &self.outgoing)
            .iter()
            .map(move |&idx| DependencyArrow::new(self, &self.edges[idx]))
    }

    /// Iterates over edges entering `class`.
    pub fn arrows_to<'a>(
        &'a self,
        class: &ClassFqsen,
    ) -> impl Iterator<Item = DependencyArrow<'a>> + 'a {
        self.edge_ids(class, &self.incoming)
            .iter()
            .map(move |&idx| DependencyArrow::new(self, &self.edges[idx]))
    }

    /// Finds the edge between two classes, if any.
    #[must_use]
    pub fn arrow(
        &self,
        depender: &ClassFqsen,
        dependee: &ClassFqsen,
    ) -> Option<DependencyArrow<'_>> {
        self.arrows_from(depender)
            .find(|arrow| arrow.dependee_class() == dependee)
    }

    fn edge_ids<'a>(&self, class: &ClassFqsen, index: &'a [Vec<usize>]) -> &'a [usize] {
        self.vertices
            .get_index_of(class)
            .map_or(&[][..], |v| index[v].as_slice())
    }

    pub(crate) fn vertex(&self, idx: usize) -> &ClassFqsen {
        &self.vertices[idx]
    }
}

/// Errors that indicate a broken internal invariant.
///
/// These are programming errors, never user mistakes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// The builder was used after [`DependencyGraphBuilder::build`].
    #[error("should not happen: dependency graph builder used after build()")]
    BuilderConsumed,
}
