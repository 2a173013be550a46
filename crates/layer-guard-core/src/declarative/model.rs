//! Pure domain model for dependency rules.
//!
//! No serde deserialization and no I/O here.
//! All invariants are enforced at construction time via validated newtypes.

use std::collections::{HashMap, HashSet};
use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use crate::fqsen::ClassFqsen;
use crate::graph::DependencyGraph;
use crate::matcher::{is_component_name, PatternMatcher, PatternView};
use crate::types::Violation;

// ────────────────────────────────────────────
// Newtypes with validation
// ────────────────────────────────────────────

/// A validated component name (`[A-Za-z_][A-Za-z0-9_]*`).
///
/// The shape is what lets a bare name inside a pattern list be told apart
/// from a namespace pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComponentName(String);

impl ComponentName {
    /// Creates a new component name.
    ///
    /// # Errors
    ///
    /// Returns error if the name is empty or not an identifier.
    pub fn new(name: &str) -> Result<Self, ModelError> {
        if is_component_name(name) {
            Ok(Self(name.to_string()))
        } else {
            Err(ModelError::InvalidComponentName {
                name: name.to_string(),
            })
        }
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ────────────────────────────────────────────
// Domain entities
// ────────────────────────────────────────────

/// A named architectural unit.
#[derive(Debug, Clone)]
pub struct Component {
    name: ComponentName,
    define: PatternMatcher,
    depender: Option<PatternMatcher>,
    dependee: Option<PatternMatcher>,
}

impl Component {
    /// Creates a component from compiled matchers.
    #[must_use]
    pub fn new(
        name: ComponentName,
        define: PatternMatcher,
        depender: Option<PatternMatcher>,
        dependee: Option<PatternMatcher>,
    ) -> Self {
        Self {
            name,
            define,
            depender,
            dependee,
        }
    }

    /// Returns the component name.
    #[must_use]
    pub fn name(&self) -> &ComponentName {
        &self.name
    }

    /// Returns `true` if `class` is a member of this component.
    #[must_use]
    pub fn is_belonged_to(&self, class: &str) -> bool {
        self.define.is_match(class)
    }

    /// Returns `true` if `class` may depend on this component.
    ///
    /// Members always may. Without a depender list everyone may.
    #[must_use]
    pub fn verify_depender(&self, class: &str) -> bool {
        self.depender
            .as_ref()
            .map_or(true, |m| self.is_belonged_to(class) || m.is_match(class))
    }

    /// Returns `true` if this component may depend on `class`.
    ///
    /// Members are always allowed. Without a dependee list everything is.
    #[must_use]
    pub fn verify_dependee(&self, class: &str) -> bool {
        self.dependee
            .as_ref()
            .map_or(true, |m| self.is_belonged_to(class) || m.is_match(class))
    }

    /// Returns `true` if a depender allow-list is configured.
    #[must_use]
    pub fn restricts_dependers(&self) -> bool {
        self.depender.is_some()
    }

    /// Returns `true` if a dependee allow-list is configured.
    #[must_use]
    pub fn restricts_dependees(&self) -> bool {
        self.dependee.is_some()
    }

    /// Normalized form for display.
    #[must_use]
    pub fn to_view(&self) -> ComponentView {
        ComponentView {
            define: self.define.to_view(),
            depender: self.depender.as_ref().map(PatternMatcher::to_view),
            dependee: self.dependee.as_ref().map(PatternMatcher::to_view),
        }
    }
}

/// Serializable view of a component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentView {
    /// Membership patterns.
    pub define: PatternView,
    /// Allowed depender patterns, if restricted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depender: Option<PatternView>,
    /// Allowed dependee patterns, if restricted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependee: Option<PatternView>,
}

// ────────────────────────────────────────────
// Aggregate root
// ────────────────────────────────────────────

/// A named set of components checked together against a graph.
#[derive(Debug, Clone)]
pub struct DependencyRule {
    name: String,
    components: Vec<Component>,
}

impl DependencyRule {
    /// Creates a rule.
    ///
    /// # Errors
    ///
    /// Returns error if there are no components or a name repeats.
    pub fn new(name: impl Into<String>, components: Vec<Component>) -> Result<Self, ModelError> {
        if components.is_empty() {
            return Err(ModelError::NoComponents);
        }
        let mut seen = HashSet::new();
        for component in &components {
            if !seen.insert(component.name()) {
                return Err(ModelError::DuplicateComponent {
                    name: component.name().clone(),
                });
            }
        }
        Ok(Self {
            name: name.into(),
            components,
        })
    }

    /// Returns the rule name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the components in definition order.
    #[must_use]
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Looks a component up by name.
    #[must_use]
    pub fn component(&self, name: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.name().as_str() == name)
    }

    /// Checks every edge of `graph` and returns the violations.
    ///
    /// For an edge `D1 → D2`, each pair of distinct components `(C1, C2)`
    /// with `D1 ∈ C1` and `D2 ∈ C2` is checked: `C2` must accept `D1` as a
    /// depender and `C1` must accept `D2` as a dependee. Output follows
    /// edge order, then component order.
    #[must_use]
    pub fn check(&self, graph: &DependencyGraph) -> Vec<Violation> {
        let membership: HashMap<&ClassFqsen, Vec<usize>> = graph
            .classes()
            .map(|class| (class, self.components_of(class)))
            .collect();
        let members = |class: &ClassFqsen| membership.get(class).map_or(&[][..], Vec::as_slice);

        let mut violations = Vec::new();
        for arrow in graph.arrows() {
            let depender = arrow.depender_class();
            let dependee = arrow.dependee_class();
            for &i in members(depender) {
                for &j in members(dependee) {
                    if i == j {
                        continue;
                    }
                    let (c1, c2) = (&self.components[i], &self.components[j]);
                    if !c2.verify_depender(depender.as_str())
                        || !c1.verify_dependee(dependee.as_str())
                    {
                        violations.push(Violation::new(
                            c1.name().as_str(),
                            depender.clone(),
                            c2.name().as_str(),
                            dependee.clone(),
                        ));
                    }
                }
            }
        }

        debug!(
            "rule `{}`: {} violations over {} edges",
            self.name,
            violations.len(),
            graph.edge_count()
        );
        violations
    }

    /// Normalized `{component: {define, depender?, dependee?}}` form.
    #[must_use]
    pub fn to_view(&self) -> IndexMap<String, ComponentView> {
        self.components
            .iter()
            .map(|c| (c.name().to_string(), c.to_view()))
            .collect()
    }

    /// [`Self::to_view`] keyed by the rule name.
    #[must_use]
    pub fn to_map(&self) -> IndexMap<String, IndexMap<String, ComponentView>> {
        IndexMap::from([(self.name.clone(), self.to_view())])
    }

    fn components_of(&self, class: &ClassFqsen) -> Vec<usize> {
        self.components
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_belonged_to(class.as_str()))
            .map(|(i, _)| i)
            .collect()
    }
}

// ────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────

/// Errors in domain model construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// Component name is not an identifier.
    #[error("invalid component name `{name}`: must match [A-Za-z_][A-Za-z0-9_]*")]
    InvalidComponentName {
        /// The invalid name.
        name: String,
    },

    /// Two components share a name.
    #[error("duplicate component `{name}`")]
    DuplicateComponent {
        /// The repeated name.
        name: ComponentName,
    },

    /// A rule without components.
    #[error("a rule must define at least one component")]
    NoComponents,
}

// ────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependency_type::DependencyType;
    use crate::matcher::NativeSymbols;

    fn matcher(patterns: &[&str]) -> PatternMatcher {
        PatternMatcher::new(patterns, &NativeSymbols::empty()).unwrap()
    }

    fn component(name: &str, define: &[&str]) -> Component {
        Component::new(ComponentName::new(name).unwrap(), matcher(define), None, None)
    }

    fn class(name: &str) -> ClassFqsen {
        ClassFqsen::qualify(name).unwrap()
    }

    fn graph(edges: &[(&str, &str)]) -> DependencyGraph {
        let mut builder = DependencyGraph::builder();
        for (a, b) in edges {
            builder
                .add_dependency(&class(a), &class(b), DependencyType::Generic)
                .unwrap();
        }
        builder.build().unwrap()
    }

    // -- ComponentName --

    #[test]
    fn component_name_valid() {
        assert_eq!(ComponentName::new("DomainLayer").unwrap().as_str(), "DomainLayer");
        assert!(ComponentName::new("_x1").is_ok());
    }

    #[test]
    fn component_name_invalid() {
        for name in ["", "1st", "Domain Layer", r"\Domain", "a-b"] {
            assert!(
                matches!(ComponentName::new(name), Err(ModelError::InvalidComponentName { .. })),
                "{name}"
            );
        }
    }

    // -- Component --

    #[test]
    fn unrestricted_component_accepts_everyone() {
        let c = component("A", &[r"\A\"]);
        assert!(c.verify_depender(r"\Z\X"));
        assert!(c.verify_dependee(r"\Z\X"));
        assert!(!c.restricts_dependers());
    }

    #[test]
    fn depender_list_allows_members_and_listed() {
        let c = Component::new(
            ComponentName::new("App").unwrap(),
            matcher(&[r"\App\"]),
            Some(matcher(&[r"\Web\"])),
            None,
        );
        assert!(c.verify_depender(r"\App\Inner"));
        assert!(c.verify_depender(r"\Web\Controller"));
        assert!(!c.verify_depender(r"\Cli\Command"));
        assert!(c.verify_dependee(r"\Cli\Command"));
    }

    #[test]
    fn dependee_list_allows_members_and_listed() {
        let c = Component::new(
            ComponentName::new("Domain").unwrap(),
            matcher(&[r"\Domain\"]),
            None,
            Some(matcher(&[r"\Shared\"])),
        );
        assert!(c.verify_dependee(r"\Domain\Other"));
        assert!(c.verify_dependee(r"\Shared\Clock"));
        assert!(!c.verify_dependee(r"\Infra\Db"));
    }

    #[test]
    fn view_omits_absent_lists() {
        let c = component("A", &[r"\A\", r"!\A\B\"]);
        let json = serde_json::to_value(c.to_view()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"define": {"include": [r"\A\"], "exclude": [r"\A\B\"]}})
        );
    }

    // -- DependencyRule --

    #[test]
    fn rule_requires_unique_components() {
        let err = DependencyRule::new("r", vec![component("A", &[r"\A\"]), component("A", &[r"\B\"])])
            .unwrap_err();
        assert!(matches!(err, ModelError::DuplicateComponent { .. }));
        assert_eq!(DependencyRule::new("r", vec![]).unwrap_err(), ModelError::NoComponents);
    }

    #[test]
    fn dependency_between_unrestricted_components_is_fine() {
        let rule = DependencyRule::new("r", vec![component("A", &[r"\A\"]), component("B", &[r"\B\"])])
            .unwrap();
        assert!(rule.check(&graph(&[("A\\X", "B\\Y"), ("B\\Y", "A\\X")])).is_empty());
    }

    #[test]
    fn depender_restriction_is_enforced() {
        let b = Component::new(
            ComponentName::new("B").unwrap(),
            matcher(&[r"\B\"]),
            Some(matcher(&[r"\C\"])),
            None,
        );
        let rule = DependencyRule::new("r", vec![component("A", &[r"\A\"]), b, component("C", &[r"\C\"])])
            .unwrap();
        let violations = rule.check(&graph(&[("A\\X", "B\\Y"), ("C\\Z", "B\\Y"), ("Other", "B\\Y")]));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].depender_component, "A");
        assert_eq!(violations[0].depender, class("A\\X"));
        assert_eq!(violations[0].dependee_component, "B");
        assert_eq!(violations[0].dependee, class("B\\Y"));
    }

    #[test]
    fn dependee_restriction_is_enforced() {
        let a = Component::new(
            ComponentName::new("A").unwrap(),
            matcher(&[r"\A\"]),
            None,
            Some(matcher(&[r"\C\"])),
        );
        let rule = DependencyRule::new("r", vec![a, component("B", &[r"\B\"]), component("C", &[r"\C\"])])
            .unwrap();
        let violations = rule.check(&graph(&[("A\\X", "B\\Y"), ("A\\X", "C\\Z"), ("A\\X", "A\\W")]));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].dependee, class("B\\Y"));
    }

    #[test]
    fn check_is_idempotent_and_ordered() {
        let b = Component::new(
            ComponentName::new("B").unwrap(),
            matcher(&[r"\B\"]),
            Some(matcher(&[r"\B\"])),
            None,
        );
        let rule = DependencyRule::new("r", vec![component("A", &[r"\A\"]), b]).unwrap();
        let g = graph(&[("A\\Two", "B\\Y"), ("A\\One", "B\\Y")]);
        let first = rule.check(&g);
        assert_eq!(first, rule.check(&g));
        let dependers: Vec<&str> = first.iter().map(|v| v.depender.as_str()).collect();
        assert_eq!(dependers, vec![r"\A\Two", r"\A\One"]);
    }

    #[test]
    fn to_map_is_keyed_by_rule() {
        let rule = DependencyRule::new("layers", vec![component("A", &[r"\A\"])]).unwrap();
        let map = rule.to_map();
        assert!(map["layers"].contains_key("A"));
        assert!(rule.component("A").is_some());
        assert!(rule.component("B").is_none());
    }
}
