//! Runs dependency rules against a graph.

use tracing::info;

use crate::declarative::DependencyRule;
use crate::graph::DependencyGraph;
use crate::types::{InspectionResult, RuleReport, Violation};

/// Evaluates a fixed list of rules against dependency graphs.
///
/// Holds no per-run state; the same detector can inspect any number of graphs.
#[derive(Debug, Clone, Default)]
pub struct RuleViolationDetector {
    rules: Vec<DependencyRule>,
}

impl RuleViolationDetector {
    /// Creates a detector for `rules`, evaluated in the given order.
    #[must_use]
    pub fn new(rules: Vec<DependencyRule>) -> Self {
        Self { rules }
    }

    /// Returns the configured rules.
    #[must_use]
    pub fn rules(&self) -> &[DependencyRule] {
        &self.rules
    }

    /// Returns every violation, rule order then edge order.
    #[must_use]
    pub fn inspect(&self, graph: &DependencyGraph) -> Vec<Violation> {
        self.inspect_by_rule(graph).into_violations()
    }

    /// Returns one report per rule.
    #[must_use]
    pub fn inspect_by_rule(&self, graph: &DependencyGraph) -> InspectionResult {
        let reports: Vec<RuleReport> = self
            .rules
            .iter()
            .map(|rule| RuleReport {
                rule: rule.name().to_string(),
                violations: rule.check(graph),
            })
            .collect();

        let result = InspectionResult {
            reports,
            classes_checked: graph.vertex_count(),
            dependencies_checked: graph.edge_count(),
        };
        info!(
            "inspected {} dependencies between {} classes with {} rules: {} violations",
            result.dependencies_checked,
            result.classes_checked,
            self.rules.len(),
            result.violation_count()
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declarative::{ComponentDto, DependencyRuleFactory, RuleDto};
    use crate::dependency_type::DependencyType;
    use crate::fqsen::ClassFqsen;

    fn class(name: &str) -> ClassFqsen {
        ClassFqsen::qualify(name).unwrap()
    }

    fn rule(name: &str, allowed_depender: &str) -> DependencyRule {
        let dto: RuleDto = [
            ("Web", ComponentDto::defined_as([r"\Web\"])),
            (
                "Core",
                ComponentDto::defined_as([r"\Core\"]).with_depender([allowed_depender]),
            ),
        ]
        .into_iter()
        .collect();
        DependencyRuleFactory::default().create_rule(name, &dto).unwrap()
    }

    fn graph() -> DependencyGraph {
        let mut builder = DependencyGraph::builder();
        builder
            .add_dependency(&class(r"Web\Page"), &class(r"Core\Service"), DependencyType::Generic)
            .unwrap();
        builder.build().unwrap()
    }

    #[test]
    fn no_rules_no_violations() {
        let result = RuleViolationDetector::default().inspect_by_rule(&graph());
        assert!(result.reports.is_empty());
        assert_eq!(result.dependencies_checked, 1);
        assert_eq!(result.classes_checked, 2);
    }

    #[test]
    fn reports_follow_rule_order() {
        let detector = RuleViolationDetector::new(vec![
            rule("strict", r"\Cli\"),
            rule("lenient", "Web"),
            rule("strict_again", r"\Cli\"),
        ]);
        let result = detector.inspect_by_rule(&graph());
        let summary: Vec<(&str, usize)> = result
            .reports
            .iter()
            .map(|r| (r.rule.as_str(), r.violations.len()))
            .collect();
        assert_eq!(summary, vec![("strict", 1), ("lenient", 0), ("strict_again", 1)]);
        assert_eq!(detector.inspect(&graph()).len(), 2);
    }

    #[test]
    fn inspect_is_repeatable() {
        let detector = RuleViolationDetector::new(vec![rule("strict", r"\Cli\")]);
        let g = graph();
        assert_eq!(detector.inspect(&g), detector.inspect(&g));
    }
}
