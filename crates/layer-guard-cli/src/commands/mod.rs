//! Subcommands and the plumbing they share.

pub mod dump;
pub mod init;
pub mod output;
pub mod show_rules;
pub mod verify;

use anyhow::{bail, Context, Result};
use layer_guard_core::{
    CollectError, Config, ConfigError, DependencyGraph, FactsDocument, FactsError, GraphError,
};
use miette::{Diagnostic, GraphicalReportHandler};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::config_resolver;

/// Exit code for configuration and input errors.
const EXIT_CONFIG: u8 = 2;

/// Exit code for internal invariant violations (`EX_SOFTWARE`).
const EXIT_INTERNAL: u8 = 70;

/// A loaded configuration and where it came from.
pub struct Loaded {
    /// The parsed configuration.
    pub config: Config,
    /// Directory relative config paths resolve against.
    pub base_dir: PathBuf,
}

/// Resolves and parses the configuration for `project_dir`.
pub fn load_config(project_dir: &Path, explicit: Option<&Path>) -> Result<Loaded> {
    let source = config_resolver::resolve(project_dir, explicit);
    let config = source.load().with_context(|| match source.path() {
        Some(p) => format!("Failed to load config: {}", p.display()),
        None => "Failed to load default config".to_string(),
    })?;
    Ok(Loaded {
        base_dir: source.base_dir(project_dir),
        config,
    })
}

/// Reads the facts file (flag first, then `[analyzer] facts`) and builds the graph.
pub fn load_graph(loaded: &Loaded, facts_flag: Option<&Path>) -> Result<DependencyGraph> {
    let Some(facts) = facts_flag
        .map(Path::to_path_buf)
        .or_else(|| loaded.config.facts_path(&loaded.base_dir))
    else {
        bail!("No facts file: pass --facts or set `facts` under [analyzer]");
    };

    tracing::debug!("Reading facts from {}", facts.display());
    let document = FactsDocument::from_file(&facts)?;
    let graph = document
        .build_graph()
        .with_context(|| format!("Failed to build dependency graph from {}", facts.display()))?;
    tracing::info!(
        "Built dependency graph: {} classes, {} dependencies",
        graph.vertex_count(),
        graph.edge_count()
    );
    Ok(graph)
}

/// Returns `true` if `err` stems from a broken invariant rather than bad input.
fn is_internal(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause.downcast_ref::<FactsError>().is_some_and(FactsError::is_internal)
            || cause.is::<CollectError>()
            || cause.is::<GraphError>()
    })
}

/// Maps an error to the process exit code.
pub fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    if is_internal(err) {
        ExitCode::from(EXIT_INTERNAL)
    } else {
        ExitCode::from(EXIT_CONFIG)
    }
}

/// Prints `err` to stderr, with a rich diagnostic when one is available.
pub fn report_error(err: &anyhow::Error) {
    if is_internal(err) {
        eprintln!("Internal error (this is a bug in layer-guard): {err:#}");
        return;
    }

    let mut rendered = String::new();
    match err.chain().find_map(as_diagnostic) {
        Some(d) if GraphicalReportHandler::new().render_report(&mut rendered, d).is_ok() => {
            eprintln!("Error: {err}");
            eprint!("{rendered}");
        }
        _ => eprintln!("Error: {err:?}"),
    }
}

fn as_diagnostic<'a>(cause: &'a (dyn std::error::Error + 'static)) -> Option<&'a dyn Diagnostic> {
    if let Some(e) = cause.downcast_ref::<ConfigError>() {
        return Some(e);
    }
    cause
        .downcast_ref::<FactsError>()
        .map(|e| e as &dyn Diagnostic)
}
