//! Boundary to the external reference resolver.
//!
//! Parsing and type inference live outside this crate. A
//! [`DependencyResolver`] turns one syntax node into resolved dependency
//! facts; [`DependencyCollector`] feeds those facts into a
//! [`DependencyGraphBuilder`].

use tracing::debug;

use crate::dependency_type::DependencyType;
use crate::fqsen::{ClassFqsen, Fqsen};
use crate::graph::{DependencyGraph, DependencyGraphBuilder, GraphError};

/// Where a node sits in the source: enclosing class and method, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionScope {
    class: Option<ClassFqsen>,
    method: Option<String>,
}

impl ResolutionScope {
    /// A scope outside any class.
    #[must_use]
    pub fn global() -> Self {
        Self::default()
    }

    /// A scope at class-declaration level.
    #[must_use]
    pub fn in_class(class: ClassFqsen) -> Self {
        Self {
            class: Some(class),
            method: None,
        }
    }

    /// A scope inside a method body.
    #[must_use]
    pub fn in_method(class: ClassFqsen, method: impl Into<String>) -> Self {
        Self {
            class: Some(class),
            method: Some(method.into()),
        }
    }

    /// Enclosing class.
    #[must_use]
    pub fn class(&self) -> Option<&ClassFqsen> {
        self.class.as_ref()
    }

    /// Enclosing method.
    #[must_use]
    pub fn method(&self) -> Option<&str> {
        self.method.as_deref()
    }
}

/// The element a resolved fact points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependeeRef {
    /// A class-like element.
    Class(ClassFqsen),
    /// A function. Not class-like, so it never becomes a graph vertex.
    Function(Fqsen),
}

/// One fact produced by a resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDependency {
    /// What is depended upon.
    pub dependee: DependeeRef,
    /// How.
    pub dependency_type: DependencyType,
}

impl ResolvedDependency {
    /// A fact pointing at a class.
    #[must_use]
    pub fn class(dependee: ClassFqsen, dependency_type: DependencyType) -> Self {
        Self {
            dependee: DependeeRef::Class(dependee),
            dependency_type,
        }
    }
}

/// Resolves the dependencies of one syntax node.
///
/// References the resolver cannot locate must be omitted from the result,
/// not reported as errors. An `Err` means the resolver itself is broken.
pub trait DependencyResolver {
    /// The syntax node type this resolver understands.
    type Node;

    /// Returns every dependency `node` introduces within `scope`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] on an internal resolver failure.
    fn resolve_dependencies(
        &self,
        node: &Self::Node,
        scope: &ResolutionScope,
    ) -> Result<Vec<ResolvedDependency>, ResolveError>;

    /// Returns the class declared by `node`, if it is a class-like declaration.
    ///
    /// Used as the depender when the node lies outside any class scope
    /// (e.g. `extends`/`implements` clauses).
    fn declared_class(&self, _node: &Self::Node) -> Option<ClassFqsen> {
        None
    }
}

/// A resolver failed in a way that is not a missing symbol.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("should not happen: resolver failed: {message}")]
pub struct ResolveError {
    message: String,
}

impl ResolveError {
    /// Creates a resolver failure.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Fatal errors while collecting dependencies.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollectError {
    /// The resolver failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// The graph builder was misused.
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Drives a resolver over nodes and accumulates a dependency graph.
#[derive(Debug)]
pub struct DependencyCollector<R> {
    resolver: R,
    builder: DependencyGraphBuilder,
}

impl<R: DependencyResolver> DependencyCollector<R> {
    /// Creates a collector around `resolver`.
    pub fn new(resolver: R) -> Self {
        Self {
            resolver,
            builder: DependencyGraphBuilder::new(),
        }
    }

    /// Registers a declared class so it appears even without edges.
    ///
    /// # Errors
    ///
    /// Returns [`CollectError::Graph`] if the graph was already built.
    pub fn register_class(&mut self, class: &ClassFqsen) -> Result<(), CollectError> {
        self.builder.add_class(class)?;
        Ok(())
    }

    /// Resolves `node` and records its class-level dependencies.
    ///
    /// Returns the number of facts handed to the builder.
    ///
    /// # Errors
    ///
    /// Returns [`CollectError`] if the resolver or builder fails.
    pub fn visit(&mut self, node: &R::Node, scope: &ResolutionScope) -> Result<usize, CollectError> {
        let Some(depender) = scope
            .class()
            .cloned()
            .or_else(|| self.resolver.declared_class(node))
        else {
            debug!("dropping node outside any class scope");
            return Ok(0);
        };

        let mut recorded = 0;
        for fact in self.resolver.resolve_dependencies(node, scope)? {
            match fact.dependee {
                DependeeRef::Class(dependee) => {
                    if dependee == depender {
                        continue;
                    }
                    self.builder
                        .add_dependency(&depender, &dependee, fact.dependency_type)?;
                    recorded += 1;
                }
                DependeeRef::Function(function) => {
                    debug!("ignoring function dependee {function} of {depender}");
                }
            }
        }
        Ok(recorded)
    }

    /// Finishes collection and returns the graph.
    ///
    /// # Errors
    ///
    /// Returns [`CollectError::Graph`] on builder misuse.
    pub fn into_graph(mut self) -> Result<DependencyGraph, CollectError> {
        Ok(self.builder.build()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(name: &str) -> ClassFqsen {
        ClassFqsen::qualify(name).unwrap()
    }

    enum Node {
        Call(&'static str, &'static str),
        Extends(&'static str, &'static str),
        Helper,
        Broken,
    }

    struct StubResolver;

    impl DependencyResolver for StubResolver {
        type Node = Node;

        fn resolve_dependencies(
            &self,
            node: &Node,
            scope: &ResolutionScope,
        ) -> Result<Vec<ResolvedDependency>, ResolveError> {
            match node {
                Node::Call(target, method) => Ok(vec![ResolvedDependency::class(
                    class(target),
                    DependencyType::method_call(scope.method(), method),
                )]),
                Node::Extends(_, parent) => Ok(vec![ResolvedDependency::class(
                    class(parent),
                    DependencyType::Generic,
                )]),
                Node::Helper => Ok(vec![ResolvedDependency {
                    dependee: DependeeRef::Function(Fqsen::function(r"\helper").unwrap()),
                    dependency_type: DependencyType::Generic,
                }]),
                Node::Broken => Err(ResolveError::new("unsupported node")),
            }
        }

        fn declared_class(&self, node: &Node) -> Option<ClassFqsen> {
            match node {
                Node::Extends(child, _) => Some(class(child)),
                _ => None,
            }
        }
    }

    #[test]
    fn scope_class_is_the_depender() {
        let mut collector = DependencyCollector::new(StubResolver);
        let scope = ResolutionScope::in_method(class("App\\Service"), "run");
        assert_eq!(collector.visit(&Node::Call("Domain\\Repo", "save"), &scope).unwrap(), 1);

        let graph = collector.into_graph().unwrap();
        let arrow = graph.arrows().next().unwrap();
        assert_eq!(arrow.depender_class(), &class("App\\Service"));
        assert_eq!(
            arrow.dependency_types().next(),
            Some(&DependencyType::method_call(Some("run"), "save"))
        );
    }

    #[test]
    fn declaration_node_supplies_depender_outside_class_scope() {
        let mut collector = DependencyCollector::new(StubResolver);
        collector
            .visit(&Node::Extends("App\\Child", "App\\Base"), &ResolutionScope::global())
            .unwrap();
        let graph = collector.into_graph().unwrap();
        assert!(graph.arrow(&class("App\\Child"), &class("App\\Base")).is_some());
    }

    #[test]
    fn nodes_without_depender_are_dropped() {
        let mut collector = DependencyCollector::new(StubResolver);
        let added = collector
            .visit(&Node::Call("Domain\\Repo", "save"), &ResolutionScope::global())
            .unwrap();
        assert_eq!(added, 0);
        assert!(collector.into_graph().unwrap().is_empty());
    }

    #[test]
    fn function_and_same_class_dependees_are_ignored() {
        let mut collector = DependencyCollector::new(StubResolver);
        let scope = ResolutionScope::in_class(class("App\\Service"));
        assert_eq!(collector.visit(&Node::Helper, &scope).unwrap(), 0);
        assert_eq!(
            collector.visit(&Node::Call("App\\Service", "own"), &scope).unwrap(),
            0
        );
        assert_eq!(collector.into_graph().unwrap().edge_count(), 0);
    }

    #[test]
    fn resolver_failure_is_fatal() {
        let mut collector = DependencyCollector::new(StubResolver);
        let scope = ResolutionScope::in_class(class("App\\Service"));
        let err = collector.visit(&Node::Broken, &scope).unwrap_err();
        assert!(matches!(err, CollectError::Resolve(_)));
        assert!(err.to_string().starts_with("should not happen"));
    }

    #[test]
    fn registered_classes_become_vertices() {
        let mut collector = DependencyCollector::new(StubResolver);
        collector.register_class(&class("App\\Lonely")).unwrap();
        let graph = collector.into_graph().unwrap();
        assert!(graph.contains_class(&class("App\\Lonely")));
    }
}
