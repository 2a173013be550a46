//! DTO → Domain conversion with validation.
//!
//! Component names used inside pattern lists are expanded here, before any
//! matcher is compiled: `ControllerLayer` becomes the resolved `define`
//! patterns of that component, `!ControllerLayer` their negation.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;

use crate::matcher::{
    is_component_name, split_negation, validate_pattern, NativeSymbols, PatternError,
    PatternMatcher,
};

use super::config_dto::{ComponentDto, RuleDefinitionsDto, RuleDto};
use super::model::{Component, ComponentName, DependencyRule, ModelError};

/// Errors during rule definition → [`DependencyRule`] conversion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleDefinitionError {
    /// A model invariant failed (name shape, duplicates, empty rule).
    #[error("rule `{rule}`: {source}")]
    Model {
        /// The rule being built.
        rule: String,
        /// The underlying model error.
        source: ModelError,
    },

    /// The same rule name appears twice.
    #[error("duplicate rule `{rule}`")]
    DuplicateRule {
        /// The repeated name.
        rule: String,
    },

    /// A component has no `define` list.
    #[error("{rule}.{component}: `define` is required")]
    MissingDefine {
        /// The rule being built.
        rule: String,
        /// The component lacking a definition.
        component: String,
    },

    /// A component has an empty `define` list.
    #[error("{rule}.{component}: `define` must contain at least one pattern")]
    EmptyDefine {
        /// The rule being built.
        rule: String,
        /// The component with an empty definition.
        component: String,
    },

    /// A pattern names a component that does not exist in the rule.
    #[error("{context}: unknown component `{name}`")]
    UnknownComponent {
        /// Where the reference was found (e.g. `layers.App.depender[0]`).
        context: String,
        /// The unknown name.
        name: String,
    },

    /// Component definitions reference each other in a loop.
    #[error("rule `{rule}`: cyclic component reference {cycle}")]
    CyclicReference {
        /// The rule being built.
        rule: String,
        /// The loop, e.g. `A -> B -> A`.
        cycle: String,
    },

    /// `!Name` where `Name` itself carries exclude patterns.
    #[error("{context}: cannot negate component `{name}` because its definition has exclude patterns")]
    NegatedReference {
        /// Where the reference was found.
        context: String,
        /// The referenced component.
        name: String,
    },

    /// A pattern is syntactically invalid.
    #[error("{context}: {source}")]
    Pattern {
        /// Where the pattern was found (e.g. `layers.App.define[1]`).
        context: String,
        /// The underlying pattern error.
        source: PatternError,
    },
}

/// Builds [`DependencyRule`]s from raw definitions.
#[derive(Debug, Clone, Default)]
pub struct DependencyRuleFactory {
    natives: NativeSymbols,
}

impl DependencyRuleFactory {
    /// Creates a factory whose matchers resolve `@php_native` against `natives`.
    #[must_use]
    pub fn new(natives: NativeSymbols) -> Self {
        Self { natives }
    }

    /// Builds every rule, in definition order.
    ///
    /// # Errors
    ///
    /// Returns the first [`RuleDefinitionError`] encountered.
    pub fn create(
        &self,
        definitions: &RuleDefinitionsDto,
    ) -> Result<Vec<DependencyRule>, RuleDefinitionError> {
        let mut seen = HashSet::new();
        definitions
            .iter()
            .map(|(name, dto)| {
                if seen.insert(name) {
                    self.create_rule(name, dto)
                } else {
                    Err(RuleDefinitionError::DuplicateRule {
                        rule: name.to_string(),
                    })
                }
            })
            .collect()
    }

    /// Builds one rule.
    ///
    /// # Errors
    ///
    /// Returns [`RuleDefinitionError`] if any component is invalid.
    pub fn create_rule(&self, rule: &str, dto: &RuleDto) -> Result<DependencyRule, RuleDefinitionError> {
        let model_err = |source| RuleDefinitionError::Model {
            rule: rule.to_string(),
            source,
        };

        let mut definitions: IndexMap<&str, &ComponentDto> = IndexMap::new();
        for (name, component) in dto.iter() {
            let validated = ComponentName::new(name).map_err(model_err)?;
            if definitions.insert(name, component).is_some() {
                return Err(model_err(ModelError::DuplicateComponent { name: validated }));
            }
        }

        let mut expander = Expander {
            rule,
            definitions: &definitions,
            resolved: HashMap::new(),
            stack: Vec::new(),
        };

        let mut components = Vec::with_capacity(definitions.len());
        for (&name, &component) in &definitions {
            let define = expander.define(name)?;
            let define = self.compile(&format!("{rule}.{name}.define"), &define)?;

            let depender = component
                .depender
                .as_deref()
                .map(|patterns| {
                    let field = format!("{rule}.{name}.depender");
                    let expanded = expander.expand(&field, patterns)?;
                    self.compile(&field, &expanded)
                })
                .transpose()?;

            let dependee = component
                .dependee
                .as_deref()
                .map(|patterns| {
                    let field = format!("{rule}.{name}.dependee");
                    let expanded = expander.expand(&field, patterns)?;
                    self.compile(&field, &expanded)
                })
                .transpose()?;

            let name = ComponentName::new(name).map_err(model_err)?;
            components.push(Component::new(name, define, depender, dependee));
        }

        DependencyRule::new(rule, components).map_err(model_err)
    }

    fn compile(&self, field: &str, patterns: &[String]) -> Result<PatternMatcher, RuleDefinitionError> {
        PatternMatcher::new(patterns, &self.natives).map_err(|source| RuleDefinitionError::Pattern {
            context: field.to_string(),
            source,
        })
    }
}

/// Resolves component references within one rule.
struct Expander<'a> {
    rule: &'a str,
    definitions: &'a IndexMap<&'a str, &'a ComponentDto>,
    resolved: HashMap<&'a str, Vec<String>>,
    stack: Vec<&'a str>,
}

impl<'a> Expander<'a> {
    /// Returns the fully expanded `define` patterns of `name`.
    fn define(&mut self, name: &'a str) -> Result<Vec<String>, RuleDefinitionError> {
        if let Some(patterns) = self.resolved.get(name) {
            return Ok(patterns.clone());
        }
        if let Some(pos) = self.stack.iter().position(|n| *n == name) {
            let mut cycle = self.stack[pos..].to_vec();
            cycle.push(name);
            return Err(RuleDefinitionError::CyclicReference {
                rule: self.rule.to_string(),
                cycle: cycle.join(" -> "),
            });
        }

        let definitions = self.definitions;
        let patterns = match definitions.get(name).and_then(|c| c.define.as_deref()) {
            None => {
                return Err(RuleDefinitionError::MissingDefine {
                    rule: self.rule.to_string(),
                    component: name.to_string(),
                })
            }
            Some([]) => {
                return Err(RuleDefinitionError::EmptyDefine {
                    rule: self.rule.to_string(),
                    component: name.to_string(),
                })
            }
            Some(patterns) => patterns,
        };

        self.stack.push(name);
        let expanded = self.expand(&format!("{}.{name}.define", self.rule), patterns);
        self.stack.pop();

        let expanded = expanded?;
        self.resolved.insert(name, expanded.clone());
        Ok(expanded)
    }

    /// Replaces component references in `patterns` with their definitions.
    fn expand(&mut self, field: &str, patterns: &'a [String]) -> Result<Vec<String>, RuleDefinitionError> {
        let definitions = self.definitions;
        let mut out = Vec::with_capacity(patterns.len());
        for (i, raw) in patterns.iter().enumerate() {
            let context = || format!("{field}[{i}]");
            let pattern_err = |source| RuleDefinitionError::Pattern {
                context: context(),
                source,
            };

            let (negated, body) = split_negation(raw).map_err(pattern_err)?;
            if !is_component_name(body) {
                validate_pattern(raw).map_err(pattern_err)?;
                out.push(raw.clone());
                continue;
            }

            let Some((&target, _)) = definitions.get_key_value(body) else {
                return Err(RuleDefinitionError::UnknownComponent {
                    context: context(),
                    name: body.to_string(),
                });
            };
            let referenced = self.define(target)?;
            if !negated {
                out.extend(referenced);
                continue;
            }
            if referenced.iter().any(|p| p.starts_with('!')) {
                return Err(RuleDefinitionError::NegatedReference {
                    context: context(),
                    name: body.to_string(),
                });
            }
            out.extend(referenced.iter().map(|p| format!("!{p}")));
        }
        Ok(out)
    }
}
