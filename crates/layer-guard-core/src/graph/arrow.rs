//! Edge view that expands merged facts into element-level pairs.

use serde::ser::{Serialize, SerializeStruct, Serializer};

use super::{DependencyGraph, Edge};
use crate::dependency_type::DependencyType;
use crate::fqsen::{ClassFqsen, Fqsen};

/// A borrowed view of one graph edge.
#[derive(Debug, Clone, Copy)]
pub struct DependencyArrow<'g> {
    graph: &'g DependencyGraph,
    edge: &'g Edge,
}

impl<'g> DependencyArrow<'g> {
    pub(super) fn new(graph: &'g DependencyGraph, edge: &'g Edge) -> Self {
        Self { graph, edge }
    }

    /// The depending class.
    #[must_use]
    pub fn depender_class(&self) -> &'g ClassFqsen {
        self.graph.vertex(self.edge.depender)
    }

    /// The class depended upon.
    #[must_use]
    pub fn dependee_class(&self) -> &'g ClassFqsen {
        self.graph.vertex(self.edge.dependee)
    }

    /// The merged dependency facts, in insertion order.
    pub fn dependency_types(&self) -> impl Iterator<Item = &'g DependencyType> {
        self.edge.types.iter()
    }

    /// Expands every fact into a `(caller, callee)` element pair.
    ///
    /// The caller is the depender's method when the fact occurred inside
    /// one, otherwise the depender class itself.
    #[must_use]
    pub fn dependencies(&self) -> Vec<(Fqsen, Fqsen)> {
        let depender = self.depender_class();
        let dependee = self.dependee_class();
        let caller_of = |caller: Option<&str>| {
            caller.map_or_else(|| Fqsen::Class(depender.clone()), |m| depender.method(m))
        };

        self.dependency_types()
            .map(|dependency_type| match dependency_type {
                DependencyType::MethodCall { caller, callee } => {
                    (caller_of(caller.as_deref()), dependee.method(callee))
                }
                DependencyType::PropertyFetch {
                    caller,
                    property_name,
                } => (caller_of(caller.as_deref()), dependee.property(property_name)),
                DependencyType::ConstantFetch {
                    caller,
                    constant_name,
                } => (caller_of(caller.as_deref()), dependee.constant(constant_name)),
                DependencyType::NewObject { caller } => {
                    (caller_of(caller.as_deref()), Fqsen::Class(dependee.clone()))
                }
                DependencyType::Generic => (
                    Fqsen::Class(depender.clone()),
                    Fqsen::Class(dependee.clone()),
                ),
            })
            .collect()
    }
}

impl Serialize for DependencyArrow<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let types: Vec<&DependencyType> = self.dependency_types().collect();
        let pairs: Vec<[String; 2]> = self
            .dependencies()
            .into_iter()
            .map(|(caller, callee)| [caller.to_string(), callee.to_string()])
            .collect();

        let mut state = serializer.serialize_struct("DependencyArrow", 4)?;
        state.serialize_field("depender", self.depender_class())?;
        state.serialize_field("dependee", self.dependee_class())?;
        state.serialize_field("types", &types)?;
        state.serialize_field("dependencies", &pairs)?;
        state.end()
    }
}
