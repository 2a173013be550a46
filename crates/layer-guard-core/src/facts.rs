//! Ingestion of dependency facts produced by an external analyzer.
//!
//! ```json
//! {
//!   "classes": ["App\\Service", "Domain\\Repo"],
//!   "dependencies": [
//!     {
//!       "depender": "App\\Service",
//!       "dependee": "Domain\\Repo",
//!       "type": { "kind": "method_call", "caller": "run", "callee": "save" }
//!     }
//!   ]
//! }
//! ```
//!
//! When `classes` is non-empty, it is the set of elements the analyzer
//! could load. Facts pointing elsewhere are unresolvable and dropped.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dependency_type::DependencyType;
use crate::fqsen::{ClassFqsen, Fqsen, FqsenError};
use crate::graph::DependencyGraph;
use crate::resolver::{
    CollectError, DependeeRef, DependencyCollector, DependencyResolver, ResolutionScope,
    ResolveError, ResolvedDependency,
};

/// What kind of element a fact's dependee is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    /// Class, interface or trait.
    #[default]
    Class,
    /// Free function.
    Function,
}

/// One raw dependency fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FactRecord {
    /// Depending class.
    pub depender: String,
    /// Depended-upon element.
    pub dependee: String,
    /// How the depender uses the dependee.
    #[serde(rename = "type", default)]
    pub dependency_type: DependencyType,
    /// Element kind of the dependee.
    #[serde(default)]
    pub kind: ElementKind,
}

/// A facts file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FactsDocument {
    /// Every class-like element the analyzer loaded.
    #[serde(default)]
    pub classes: Vec<String>,
    /// Dependency facts, in discovery order.
    #[serde(default)]
    pub dependencies: Vec<FactRecord>,
}

impl FactsDocument {
    /// Parses a facts document from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`FactsError::Json`] if the JSON is invalid.
    pub fn parse(content: &str) -> Result<Self, FactsError> {
        serde_json::from_str(content).map_err(|e| FactsError::Json {
            path: None,
            source: e,
        })
    }

    /// Reads and parses a facts file.
    ///
    /// # Errors
    ///
    /// Returns [`FactsError`] if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, FactsError> {
        let content = std::fs::read_to_string(path).map_err(|e| FactsError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(|e| FactsError::Json {
            path: Some(path.to_path_buf()),
            source: e,
        })
    }

    /// Builds a dependency graph from the facts.
    ///
    /// # Errors
    ///
    /// Returns [`FactsError::InvalidName`] for a malformed element name,
    /// or [`FactsError::Collect`] on an internal failure.
    pub fn build_graph(&self) -> Result<DependencyGraph, FactsError> {
        let classes = self
            .classes
            .iter()
            .enumerate()
            .map(|(i, name)| qualify(name, || format!("classes[{i}]")))
            .collect::<Result<Vec<_>, _>>()?;

        let mut collector = DependencyCollector::new(FactsResolver::new(classes.iter().cloned()));
        for class in &classes {
            collector.register_class(class)?;
        }

        for (i, record) in self.dependencies.iter().enumerate() {
            let depender = qualify(&record.depender, || format!("dependencies[{i}].depender"))?;
            let node = FactNode {
                dependee: qualify(&record.dependee, || format!("dependencies[{i}].dependee"))?,
                kind: record.kind,
                dependency_type: record.dependency_type.clone(),
            };
            let scope = match record.dependency_type.caller() {
                Some(method) => ResolutionScope::in_method(depender, method),
                None => ResolutionScope::in_class(depender),
            };
            collector.visit(&node, &scope)?;
        }

        let graph = collector.into_graph()?;
        debug!(
            "built graph with {} classes and {} edges from {} facts",
            graph.vertex_count(),
            graph.edge_count(),
            self.dependencies.len()
        );
        Ok(graph)
    }
}

fn qualify(name: &str, context: impl FnOnce() -> String) -> Result<ClassFqsen, FactsError> {
    ClassFqsen::qualify(name).map_err(|e| FactsError::InvalidName {
        context: context(),
        source: e,
    })
}

/// A single validated fact, as seen by [`FactsResolver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactNode {
    /// Depended-upon element.
    pub dependee: ClassFqsen,
    /// Element kind of the dependee.
    pub kind: ElementKind,
    /// How the depender uses the dependee.
    pub dependency_type: DependencyType,
}

/// Resolves pre-computed facts against the set of known classes.
#[derive(Debug, Clone, Default)]
pub struct FactsResolver {
    known: HashSet<ClassFqsen>,
}

impl FactsResolver {
    /// Creates a resolver. An empty class set accepts every dependee.
    pub fn new(known: impl IntoIterator<Item = ClassFqsen>) -> Self {
        Self {
            known: known.into_iter().collect(),
        }
    }

    fn is_known(&self, class: &ClassFqsen) -> bool {
        self.known.is_empty() || self.known.contains(class)
    }
}

impl DependencyResolver for FactsResolver {
    type Node = FactNode;

    fn resolve_dependencies(
        &self,
        node: &FactNode,
        _scope: &ResolutionScope,
    ) -> Result<Vec<ResolvedDependency>, ResolveError> {
        let dependee = match node.kind {
            ElementKind::Function => DependeeRef::Function(Fqsen::Function(node.dependee.to_string())),
            ElementKind::Class if self.is_known(&node.dependee) => {
                DependeeRef::Class(node.dependee.clone())
            }
            ElementKind::Class => {
                debug!("dropping unresolvable dependee {}", node.dependee);
                return Ok(Vec::new());
            }
        };
        Ok(vec![ResolvedDependency {
            dependee,
            dependency_type: node.dependency_type.clone(),
        }])
    }
}

/// Errors while loading facts.
#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum FactsError {
    /// The facts file could not be read.
    #[error("failed to read facts file {}", path.display())]
    #[diagnostic(code(layer_guard::facts::io))]
    Io {
        /// The file path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The facts are not valid JSON for the expected shape.
    #[error("invalid facts{}", path.as_ref().map(|p| format!(" in {}", p.display())).unwrap_or_default())]
    #[diagnostic(
        code(layer_guard::facts::json),
        help("expected {{\"classes\": [...], \"dependencies\": [{{\"depender\", \"dependee\", \"type\"}}]}}")
    )]
    Json {
        /// The file path, if read from disk.
        path: Option<PathBuf>,
        /// The underlying JSON error.
        source: serde_json::Error,
    },

    /// An element name is malformed.
    #[error("{context}: {source}")]
    #[diagnostic(code(layer_guard::facts::invalid_name))]
    InvalidName {
        /// Where the name occurred (e.g. `dependencies[3].dependee`).
        context: String,
        /// The underlying name error.
        source: FqsenError,
    },

    /// Graph construction hit an internal invariant violation.
    #[error(transparent)]
    #[diagnostic(code(layer_guard::internal))]
    Collect(#[from] CollectError),
}

impl FactsError {
    /// Returns `true` for internal failures as opposed to bad input.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Collect(_))
    }
}
