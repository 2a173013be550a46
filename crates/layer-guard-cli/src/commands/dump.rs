//! Dump command implementation.

use anyhow::{Context, Result};
use layer_guard_core::{ClassFqsen, DependencyArrow, DependencyGraph};
use serde::Serialize;
use std::path::Path;
use std::process::ExitCode;

#[derive(Serialize)]
struct GraphDump<'g> {
    classes: Vec<&'g ClassFqsen>,
    arrows: Vec<DependencyArrow<'g>>,
}

/// Renders the graph as pretty JSON.
pub fn render(graph: &DependencyGraph) -> Result<String> {
    let dump = GraphDump {
        classes: graph.classes().collect(),
        arrows: graph.arrows().collect(),
    };
    let mut json = serde_json::to_string_pretty(&dump)?;
    json.push('\n');
    Ok(json)
}

/// Runs the dump command.
pub fn run(
    path: &Path,
    config: Option<&Path>,
    facts: Option<&Path>,
    output: Option<&Path>,
) -> Result<ExitCode> {
    let loaded = super::load_config(path, config)?;
    let graph = super::load_graph(&loaded, facts)?;
    let json = render(&graph)?;

    match output {
        Some(out) => {
            std::fs::write(out, json)
                .with_context(|| format!("Failed to write {}", out.display()))?;
            tracing::info!("Wrote dependency graph to {}", out.display());
        }
        None => print!("{json}"),
    }
    Ok(ExitCode::SUCCESS)
}
