//! Configuration file resolution with global fallback.
//!
//! Resolves the configuration file path using a deterministic priority order:
//!
//! 1. `--config` flag (explicit path)
//! 2. `{project}/layer-guard.toml` or `.layer-guard.toml`
//! 3. `~/.layer-guard/config.toml` (global fallback)
//! 4. No config found → defaults (no rules)

use std::path::{Path, PathBuf};

use layer_guard_core::{Config, ConfigError};

/// Where the configuration was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly specified via `--config` flag.
    Explicit(PathBuf),
    /// Found in the project directory.
    Project(PathBuf),
    /// Loaded from the global config directory (`~/.layer-guard/`).
    Global(PathBuf),
    /// No config found; defaults will be used.
    Default,
}

impl ConfigSource {
    /// Returns the resolved path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }

    /// Returns `true` if the config was loaded from the global directory.
    #[must_use]
    pub fn is_global(&self) -> bool {
        matches!(self, Self::Global(_))
    }

    /// Directory that relative paths inside the config resolve against.
    ///
    /// A global config is shared between projects, so its relative paths
    /// resolve against the project being checked.
    #[must_use]
    pub fn base_dir(&self, project_dir: &Path) -> PathBuf {
        match self {
            Self::Explicit(p) | Self::Project(p) => p
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .map_or_else(|| project_dir.to_path_buf(), Path::to_path_buf),
            Self::Global(_) | Self::Default => project_dir.to_path_buf(),
        }
    }

    /// Loads the configuration, or the empty default when none was found.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn load(&self) -> Result<Config, ConfigError> {
        match self.path() {
            Some(p) => {
                if self.is_global() {
                    tracing::info!("Using global config: {}", p.display());
                }
                Config::from_file(p)
            }
            None => {
                tracing::warn!("No configuration found; no rules will be checked");
                Ok(Config::default())
            }
        }
    }
}

/// Project-level config file names, checked in order.
const PROJECT_CONFIG_NAMES: &[&str] = &["layer-guard.toml", ".layer-guard.toml"];

/// Config file name within the global config directory.
const GLOBAL_CONFIG_NAME: &str = "config.toml";

/// Resolves the configuration file path.
///
/// See module-level docs for resolution order.
#[must_use]
pub fn resolve(project_dir: &Path, explicit: Option<&Path>) -> ConfigSource {
    resolve_inner(project_dir, explicit, global_config_dir())
}

/// Testable core: accepts `global_dir` as parameter to avoid env var races.
fn resolve_inner(
    project_dir: &Path,
    explicit: Option<&Path>,
    global_dir: Option<PathBuf>,
) -> ConfigSource {
    // 1. Explicit path from --config flag
    if let Some(p) = explicit {
        return ConfigSource::Explicit(p.to_path_buf());
    }

    // 2. Project-level config
    for name in PROJECT_CONFIG_NAMES {
        let candidate = project_dir.join(name);
        if candidate.exists() {
            tracing::debug!("Found project config: {}", candidate.display());
            return ConfigSource::Project(candidate);
        }
    }

    // 3. Global fallback
    if let Some(dir) = global_dir {
        let candidate = dir.join(GLOBAL_CONFIG_NAME);
        if candidate.exists() {
            tracing::debug!("Found global config: {}", candidate.display());
            return ConfigSource::Global(candidate);
        }
    }

    ConfigSource::Default
}

/// Returns the global config directory path.
///
/// Resolution: `$LAYER_GUARD_CONFIG_DIR` > `~/.layer-guard/`
///
/// The env var override enables testing and custom CI setups.
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("LAYER_GUARD_CONFIG_DIR") {
        return Some(PathBuf::from(dir));
    }
    home::home_dir().map(|h| h.join(".layer-guard"))
}
