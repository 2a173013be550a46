//! Core types for rule violations and inspection results.

use std::fmt;

use serde::Serialize;

use crate::fqsen::ClassFqsen;

/// One dependency that breaches a component's allow-list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    /// Component of the depending class.
    pub depender_component: String,
    /// The depending class.
    pub depender: ClassFqsen,
    /// Component of the class depended upon.
    pub dependee_component: String,
    /// The class depended upon.
    pub dependee: ClassFqsen,
}

impl Violation {
    /// Creates a new violation.
    #[must_use]
    pub fn new(
        depender_component: impl Into<String>,
        depender: ClassFqsen,
        dependee_component: impl Into<String>,
        dependee: ClassFqsen,
    ) -> Self {
        Self {
            depender_component: depender_component.into(),
            depender,
            dependee_component: dependee_component.into(),
            dependee,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}) must not depend on {}({}).",
            self.depender, self.depender_component, self.dependee, self.dependee_component
        )
    }
}

/// Violations found by one rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleReport {
    /// Rule name.
    pub rule: String,
    /// Violations in edge order.
    pub violations: Vec<Violation>,
}

impl RuleReport {
    /// Returns `true` if the rule found nothing.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Result of inspecting a graph with every configured rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionResult {
    /// One report per rule, in rule order.
    pub reports: Vec<RuleReport>,
    /// Number of classes in the inspected graph.
    pub classes_checked: usize,
    /// Number of edges in the inspected graph.
    pub dependencies_checked: usize,
}

impl InspectionResult {
    /// Returns true if any rule found a violation.
    #[must_use]
    pub fn has_violations(&self) -> bool {
        self.reports.iter().any(|r| !r.is_clean())
    }

    /// Total number of violations across rules.
    #[must_use]
    pub fn violation_count(&self) -> usize {
        self.reports.iter().map(|r| r.violations.len()).sum()
    }

    /// All violations, rule order then edge order.
    pub fn violations(&self) -> impl Iterator<Item = &Violation> {
        self.reports.iter().flat_map(|r| r.violations.iter())
    }

    /// Consumes the result into a flat violation list.
    #[must_use]
    pub fn into_violations(self) -> Vec<Violation> {
        self.reports.into_iter().flat_map(|r| r.violations).collect()
    }
}
