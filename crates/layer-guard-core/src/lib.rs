//! # layer-guard-core
//!
//! Dependency graph construction and layered-architecture rule checking.
//!
//! This crate provides:
//!
//! - [`Fqsen`] / [`ClassFqsen`] structural element names
//! - [`DependencyGraphBuilder`] and the read-only [`DependencyGraph`]
//! - [`PatternMatcher`] for namespace include/exclude patterns
//! - [`DependencyRule`] components with depender/dependee allow-lists
//! - [`RuleViolationDetector`] for evaluating rules against a graph
//! - [`DependencyResolver`], the boundary to an external source analyzer
//!
//! ## Example
//!
//! ```ignore
//! use layer_guard_core::{Config, FactsDocument};
//!
//! let config = Config::from_file(Path::new("layer-guard.toml"))?;
//! let graph = FactsDocument::from_file(Path::new("facts.json"))?.build_graph()?;
//!
//! for violation in config.detector()?.inspect(&graph) {
//!     println!("{violation}");
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod dependency_type;
mod detector;
mod facts;
mod fqsen;
mod graph;
mod matcher;
mod resolver;
mod types;

/// Declarative rule definitions: DTOs, domain model and factory.
pub mod declarative;

pub use config::{AnalyzerConfig, Config, ConfigError, NativesConfig};
pub use declarative::{
    Component, ComponentView, DependencyRule, DependencyRuleFactory, RuleDefinitionError,
};
pub use dependency_type::DependencyType;
pub use detector::RuleViolationDetector;
pub use facts::{ElementKind, FactNode, FactRecord, FactsDocument, FactsError, FactsResolver};
pub use fqsen::{ClassFqsen, Fqsen, FqsenError, NAMESPACE_SEPARATOR};
pub use graph::{DependencyArrow, DependencyGraph, DependencyGraphBuilder, GraphError};
pub use matcher::{NativeSymbols, PatternError, PatternMatcher, PatternView, PHP_NATIVE};
pub use resolver::{
    CollectError, DependeeRef, DependencyCollector, DependencyResolver, ResolutionScope,
    ResolveError, ResolvedDependency,
};
pub use types::{InspectionResult, RuleReport, Violation};
