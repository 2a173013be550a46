//! Show rules command implementation.

use anyhow::{Context, Result};
use layer_guard_core::DependencyRule;
use std::path::Path;
use std::process::ExitCode;

/// Renders every rule as `{rule: {component: view}}` JSON.
pub fn render(rules: &[DependencyRule]) -> Result<String> {
    let map: serde_json::Map<String, serde_json::Value> = rules
        .iter()
        .map(|rule| Ok((rule.name().to_string(), serde_json::to_value(rule.to_view())?)))
        .collect::<Result<_>>()?;
    let mut json = serde_json::to_string_pretty(&map)?;
    json.push('\n');
    Ok(json)
}

/// Runs the show-rules command.
pub fn run(path: &Path, config: Option<&Path>) -> Result<ExitCode> {
    let loaded = super::load_config(path, config)?;
    let rules = loaded
        .config
        .load_rules()
        .context("Failed to load rule definitions")?;

    if rules.is_empty() {
        tracing::warn!("No rules configured");
    }
    print!("{}", render(&rules)?);
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use layer_guard_core::Config;

    #[test]
    fn references_are_expanded_in_rule_order() {
        let config = Config::parse(
            r"
[rules.second.B]
define = ['\B\']

[rules.first.A]
define = ['\A\']
depender = ['C']

[rules.first.C]
define = ['\C\', '!\C\Internal\']
",
        )
        .unwrap();
        let json = render(&config.load_rules().unwrap()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        let names: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(names, ["second", "first"]);
        assert_eq!(
            value["first"]["A"]["depender"],
            serde_json::json!({"include": [r"\C\"], "exclude": [r"\C\Internal\"]})
        );
        assert!(value["second"]["B"].get("depender").is_none());
    }
}
