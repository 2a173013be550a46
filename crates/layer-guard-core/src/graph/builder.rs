//! Incremental construction of a [`DependencyGraph`].

use std::collections::HashMap;

use indexmap::IndexSet;
use tracing::trace;

use super::{DependencyGraph, Edge, GraphError};
use crate::dependency_type::DependencyType;
use crate::fqsen::ClassFqsen;

/// Accumulates dependency facts into a directed graph.
///
/// Parallel facts between the same pair of classes are merged into one
/// edge carrying a deduplicated, insertion-ordered set of
/// [`DependencyType`]s. A builder produces exactly one graph.
#[derive(Debug, Default)]
pub struct DependencyGraphBuilder {
    vertices: IndexSet<ClassFqsen>,
    edges: Vec<Edge>,
    edge_index: HashMap<(usize, usize), usize>,
    built: bool,
}

impl DependencyGraphBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a class as a vertex even if it has no dependencies.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::BuilderConsumed`] after [`Self::build`].
    pub fn add_class(&mut self, class: &ClassFqsen) -> Result<(), GraphError> {
        self.ensure_open()?;
        self.vertex_id(class);
        Ok(())
    }

    /// Records that `depender` depends on `dependee`.
    ///
    /// A dependency of a class on itself is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::BuilderConsumed`] after [`Self::build`].
    pub fn add_dependency(
        &mut self,
        depender: &ClassFqsen,
        dependee: &ClassFqsen,
        dependency_type: DependencyType,
    ) -> Result<(), GraphError> {
        self.ensure_open()?;
        if depender == dependee {
            trace!("skipping self dependency of {depender}");
            return Ok(());
        }

        let from = self.vertex_id(depender);
        let to = self.vertex_id(dependee);
        let edges = &mut self.edges;
        let idx = *self.edge_index.entry((from, to)).or_insert_with(|| {
            edges.push(Edge {
                depender: from,
                dependee: to,
                types: IndexSet::new(),
            });
            edges.len() - 1
        });
        self.edges[idx].types.insert(dependency_type);
        Ok(())
    }

    /// Returns the number of distinct edges recorded so far.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Finishes construction and returns the graph.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::BuilderConsumed`] if called twice.
    pub fn build(&mut self) -> Result<DependencyGraph, GraphError> {
        self.ensure_open()?;
        self.built = true;
        self.edge_index.clear();
        let vertices = std::mem::take(&mut self.vertices);
        let edges = std::mem::take(&mut self.edges);
        Ok(DependencyGraph::from_parts(vertices, edges))
    }

    fn ensure_open(&self) -> Result<(), GraphError> {
        if self.built {
            Err(GraphError::BuilderConsumed)
        } else {
            Ok(())
        }
    }

    fn vertex_id(&mut self, class: &ClassFqsen) -> usize {
        if let Some(idx) = self.vertices.get_index_of(class) {
            idx
        } else {
            self.vertices.insert_full(class.clone()).0
        }
    }
}
