//! Shared output formatting for inspection results.

use anyhow::Result;
use layer_guard_core::InspectionResult;
use std::fmt::Write as _;

use crate::OutputFormat;

const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Print inspection results in the specified format.
pub fn print(result: &InspectionResult, format: OutputFormat) -> Result<()> {
    print!("{}", render(result, format)?);
    Ok(())
}

/// Render inspection results in the specified format.
pub fn render(result: &InspectionResult, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Text => render_text(result),
        OutputFormat::Json => render_json(result)?,
        OutputFormat::Compact => render_compact(result),
    })
}

fn render_text(result: &InspectionResult) -> String {
    let mut out = String::new();

    for report in result.reports.iter().filter(|r| !r.is_clean()) {
        let _ = writeln!(out, "{BOLD}[{}]{RESET}", report.rule);
        for violation in &report.violations {
            let _ = writeln!(out, "  {RED}violation{RESET}: {violation}");
        }
        out.push('\n');
    }

    let count = result.violation_count();
    let color = if count > 0 { RED } else { GREEN };
    let _ = writeln!(
        out,
        "{color}Found {count} violation(s) in {} rule(s) ({} classes, {} dependencies checked){RESET}",
        result.reports.len(),
        result.classes_checked,
        result.dependencies_checked,
    );
    out
}

fn render_json(result: &InspectionResult) -> Result<String> {
    let mut json = serde_json::to_string_pretty(result)?;
    json.push('\n');
    Ok(json)
}

fn render_compact(result: &InspectionResult) -> String {
    let mut out = String::new();
    for report in &result.reports {
        for violation in &report.violations {
            let _ = writeln!(out, "{}: {violation}", report.rule);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use layer_guard_core::{ClassFqsen, RuleReport, Violation};

    fn sample() -> InspectionResult {
        let violation = Violation::new(
            "ControllerLayer",
            ClassFqsen::qualify("Controller\\Foo").unwrap(),
            "ApplicationLayer",
            ClassFqsen::qualify("Application\\Bar").unwrap(),
        );
        InspectionResult {
            reports: vec![
                RuleReport {
                    rule: "layers".to_string(),
                    violations: vec![violation],
                },
                RuleReport {
                    rule: "vendors".to_string(),
                    violations: Vec::new(),
                },
            ],
            classes_checked: 2,
            dependencies_checked: 1,
        }
    }

    #[test]
    fn compact_prefixes_rule_name() {
        let out = render(&sample(), OutputFormat::Compact).unwrap();
        assert_eq!(
            out,
            "layers: \\Controller\\Foo(ControllerLayer) must not depend on \\Application\\Bar(ApplicationLayer).\n"
        );
    }

    #[test]
    fn text_skips_clean_rules() {
        let out = render(&sample(), OutputFormat::Text).unwrap();
        assert!(out.contains("[layers]"));
        assert!(!out.contains("[vendors]"));
        assert!(out.contains("Found 1 violation(s) in 2 rule(s)"));
    }

    #[test]
    fn json_uses_camel_case_fields() {
        let out = render(&sample(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["classesChecked"], 2);
        assert_eq!(
            value["reports"][0]["violations"][0]["dependerComponent"],
            "ControllerLayer"
        );
    }
}
