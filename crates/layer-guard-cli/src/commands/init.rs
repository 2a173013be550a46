//! Init command implementation.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

const CONFIG_FILE_NAME: &str = "layer-guard.toml";

const DEFAULT_CONFIG: &str = r"# layer-guard configuration

[analyzer]
# Dependency facts produced by your source analyzer, relative to this file
facts = 'build/dependency-facts.json'

[natives]
# Built-in classes matched by the `@php_native` pattern
symbols = [
    'ArrayObject',
    'DateTimeImmutable',
    'DateTimeInterface',
    'Exception',
    'InvalidArgumentException',
    'RuntimeException',
    'Throwable',
]

# Each rule is a set of components. A component is a table
# `[rules.<rule>.<Component>]` with:
#   define   - patterns selecting member classes (required)
#   depender - who may depend on this component (optional)
#   dependee - what this component may depend on (optional)
#
# Patterns: `\Ns\` (namespace prefix), `\Ns\Class` (exact), `\` (all),
# `@php_native`, another component's name, and `!` to exclude.

[rules.layers.Presentation]
define = ['\App\Http\']

[rules.layers.Application]
define = ['\App\Application\']
depender = ['Presentation']

[rules.layers.Domain]
define = ['\App\Domain\']
depender = ['Application', 'Infrastructure']
dependee = ['@php_native']

[rules.layers.Infrastructure]
define = ['\App\Infrastructure\']
";

/// Writes the starter config into `dir`, returning its path.
pub fn write_config(dir: &Path, force: bool) -> Result<PathBuf> {
    let config_path = dir.join(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    Ok(config_path)
}

/// Runs the init command.
pub fn run(path: &Path, force: bool) -> Result<ExitCode> {
    let config_path = write_config(path, force)?;

    println!("Created {}", config_path.display());
    println!("\nNext steps:");
    println!("  1. Point [analyzer] facts at your dependency facts file");
    println!("  2. Edit the [rules.*] tables to describe your layers");
    println!("  3. Run: layer-guard verify");

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use layer_guard_core::Config;

    #[test]
    fn template_is_a_valid_config() {
        let config = Config::parse(DEFAULT_CONFIG).unwrap();
        let rules = config.load_rules().unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].components().len(), 4);
        assert!(config.native_symbols().contains("Throwable"));
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), false).unwrap();
        assert_eq!(path, dir.path().join(CONFIG_FILE_NAME));

        std::fs::write(&path, "# custom\n").unwrap();
        assert!(write_config(dir.path(), false).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# custom\n");

        write_config(dir.path(), true).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), DEFAULT_CONFIG);
    }
}
