//! Dependency rules driven by declarative definitions.
//!
//! # Architecture
//!
//! ```text
//! TOML / JSON text
//!   ↓ serde (DTO layer)
//! config_dto types (document order, duplicates kept)
//!   ↓ expand component references + validate
//! DependencyRuleFactory::create()
//!   ↓
//! Vec<DependencyRule> (pure domain model)
//! ```

pub mod config_dto;
pub mod loader;
pub mod model;

pub use config_dto::{ComponentDto, OrderedEntries, RuleDefinitionsDto, RuleDto};
pub use loader::{DependencyRuleFactory, RuleDefinitionError};
pub use model::{Component, ComponentName, ComponentView, DependencyRule, ModelError};
