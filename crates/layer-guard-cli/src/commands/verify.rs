//! Verify command implementation.

use anyhow::{Context, Result};
use std::path::Path;
use std::process::ExitCode;

use crate::OutputFormat;

/// Exit code when at least one rule is violated.
const EXIT_VIOLATIONS: u8 = 1;

/// Runs the verify command.
pub fn run(
    path: &Path,
    config: Option<&Path>,
    facts: Option<&Path>,
    format: OutputFormat,
) -> Result<ExitCode> {
    let loaded = super::load_config(path, config)?;
    let detector = loaded
        .config
        .detector()
        .context("Failed to load rule definitions")?;
    let graph = super::load_graph(&loaded, facts)?;

    tracing::info!(
        "Verifying {:?} with {} rule(s)",
        path,
        detector.rules().len()
    );

    let result = detector.inspect_by_rule(&graph);
    super::output::print(&result, format)?;

    if result.has_violations() {
        Ok(ExitCode::from(EXIT_VIOLATIONS))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(config: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("layer-guard.toml"), config).unwrap();
        std::fs::write(
            dir.path().join("facts.json"),
            r#"{"dependencies": [
                {"depender": "Domain\\User", "dependee": "Infra\\Db"},
                {"depender": "Infra\\Db", "dependee": "Domain\\User"}
            ]}"#,
        )
        .unwrap();
        dir
    }

    const CONFIG: &str = r"
[analyzer]
facts = 'facts.json'

[rules.layers.Domain]
define = ['\Domain\']
depender = ['Infra']

[rules.layers.Infra]
define = ['\Infra\']
";

    #[test]
    fn clean_project_succeeds() {
        let dir = project(CONFIG);
        let code = run(dir.path(), None, None, OutputFormat::Compact).unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
    }

    #[test]
    fn violations_exit_with_1() {
        let dir = project(&CONFIG.replace("depender = ['Infra']", "dependee = []"));
        let code = run(dir.path(), None, None, OutputFormat::Compact).unwrap();
        assert_eq!(code, ExitCode::from(EXIT_VIOLATIONS));
    }

    #[test]
    fn bad_rule_is_an_error() {
        let dir = project(&CONFIG.replace("['Infra']", "['Missing']"));
        assert!(run(dir.path(), None, None, OutputFormat::Text).is_err());
    }
}
