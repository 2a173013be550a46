//! Configuration types for layer-guard.

use std::path::{Path, PathBuf};

use miette::Diagnostic;
use serde::Deserialize;

use crate::declarative::{DependencyRule, DependencyRuleFactory, RuleDefinitionError, RuleDefinitionsDto};
use crate::detector::RuleViolationDetector;
use crate::matcher::NativeSymbols;

/// Top-level configuration for layer-guard.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Built-in class names matched by `@php_native`.
    #[serde(default)]
    pub natives: NativesConfig,

    /// Where dependency facts come from.
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    /// Rule name → component definitions.
    #[serde(default)]
    pub rules: RuleDefinitionsDto,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: Some(path.to_path_buf()),
            message: e.to_string(),
        })
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: None,
            message: e.to_string(),
        })
    }

    /// Builds the `@php_native` registry.
    #[must_use]
    pub fn native_symbols(&self) -> NativeSymbols {
        NativeSymbols::new(&self.natives.symbols)
    }

    /// Builds every configured rule.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidRuleDefinition`] for the first bad rule.
    pub fn load_rules(&self) -> Result<Vec<DependencyRule>, ConfigError> {
        Ok(DependencyRuleFactory::new(self.native_symbols()).create(&self.rules)?)
    }

    /// Builds a detector over every configured rule.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidRuleDefinition`] for the first bad rule.
    pub fn detector(&self) -> Result<RuleViolationDetector, ConfigError> {
        self.load_rules().map(RuleViolationDetector::new)
    }

    /// Resolves the facts file relative to the directory holding the config.
    #[must_use]
    pub fn facts_path(&self, config_dir: &Path) -> Option<PathBuf> {
        self.analyzer.facts.as_ref().map(|p| {
            if p.is_absolute() {
                p.clone()
            } else {
                config_dir.join(p)
            }
        })
    }
}

/// The `[natives]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NativesConfig {
    /// Built-in class names, with or without the leading `\`.
    #[serde(default)]
    pub symbols: Vec<String>,
}

/// The `[analyzer]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalyzerConfig {
    /// Facts file produced by the external analyzer.
    #[serde(default)]
    pub facts: Option<PathBuf>,
}

/// Configuration errors.
#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("failed to read config file {}: {source}", path.display())]
    #[diagnostic(code(layer_guard::config::io))]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("failed to parse config{}: {message}", path.as_ref().map(|p| format!(" {}", p.display())).unwrap_or_default())]
    #[diagnostic(
        code(layer_guard::config::parse),
        help("each component is a table `[rules.<rule>.<Component>]` with a `define` array")
    )]
    Parse {
        /// Path of the file, if read from disk.
        path: Option<PathBuf>,
        /// Parse error message.
        message: String,
    },

    /// A rule definition is invalid.
    #[error("invalid rule definition: {0}")]
    #[diagnostic(
        code(layer_guard::config::rule_definition),
        help("patterns start with `\\` (namespace), `!` (exclude), `@php_native`, or name a component of the same rule")
    )]
    InvalidRuleDefinition(#[from] RuleDefinitionError),
}
