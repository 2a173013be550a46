//! Namespace pattern matching over class names.
//!
//! Pattern syntax:
//!
//! | Pattern | Matches |
//! |---|---|
//! | `\` | every name |
//! | `\Foo\Bar` | exactly `Foo\Bar` |
//! | `\Foo\` | `Foo` and everything below it, on segment boundaries |
//! | `@php_native` | names registered in [`NativeSymbols`] |
//! | `!<pattern>` | exclusion of any of the above |
//!
//! Bare identifiers (`ControllerLayer`) name components. They are expanded
//! by the rule loader and rejected if they ever reach the matcher.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;

use crate::fqsen::NAMESPACE_SEPARATOR;

/// Magic token matching the language's built-in classes.
pub const PHP_NATIVE: &str = "@php_native";

const EXCLUDE_SIGIL: char = '!';
const MAGIC_SIGIL: char = '@';

/// The set of built-in class names the `@php_native` token matches.
///
/// Built once from configuration and shared by every matcher. Names are
/// stored without the namespace root.
#[derive(Debug, Clone, Default)]
pub struct NativeSymbols(Arc<HashSet<String>>);

impl NativeSymbols {
    /// Creates a registry from class names, with or without the leading root.
    pub fn new<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set = symbols
            .into_iter()
            .map(|s| {
                s.as_ref()
                    .trim()
                    .trim_start_matches(NAMESPACE_SEPARATOR)
                    .to_string()
            })
            .filter(|s| !s.is_empty())
            .collect();
        Self(Arc::new(set))
    }

    /// An empty registry.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns `true` if `name` (without the leading root) is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    /// Returns the number of registered names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no names are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PatternKind {
    All,
    Exact(String),
    Namespace(String),
    Native,
}

impl PatternKind {
    fn matches(&self, name: &str, natives: &NativeSymbols) -> bool {
        match self {
            Self::All => true,
            Self::Exact(expected) => name == expected,
            Self::Namespace(prefix) => name
                .strip_prefix(prefix.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with(NAMESPACE_SEPARATOR)),
            Self::Native => natives.contains(name),
        }
    }
}

#[derive(Debug, Clone)]
struct CompiledPattern {
    source: String,
    kind: PatternKind,
}

/// A compiled set of include and exclude patterns.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    include: Vec<CompiledPattern>,
    exclude: Vec<CompiledPattern>,
    natives: NativeSymbols,
}

impl PatternMatcher {
    /// Compiles `patterns` in order.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError`] for the first pattern that is empty, doubly
    /// negated, starts with an unknown sigil, names an unknown magic token,
    /// or is a bare name.
    pub fn new<S: AsRef<str>>(patterns: &[S], natives: &NativeSymbols) -> Result<Self, PatternError> {
        let mut include = Vec::new();
        let mut exclude = Vec::new();
        for raw in patterns {
            let raw = raw.as_ref();
            let (negated, body) = split_negation(raw)?;
            let compiled = CompiledPattern {
                source: body.to_string(),
                kind: compile(raw, body)?,
            };
            if negated {
                exclude.push(compiled);
            } else {
                include.push(compiled);
            }
        }
        Ok(Self {
            include,
            exclude,
            natives: natives.clone(),
        })
    }

    /// Returns `true` if `name` is included and not excluded.
    ///
    /// `name` may be given with or without the leading namespace root.
    /// A matcher with only exclude patterns includes every name.
    #[must_use]
    pub fn is_match(&self, name: &str) -> bool {
        let name = name.strip_prefix(NAMESPACE_SEPARATOR).unwrap_or(name);
        let included = (self.include.is_empty() && !self.exclude.is_empty())
            || self
                .include
                .iter()
                .any(|p| p.kind.matches(name, &self.natives));
        included
            && !self
                .exclude
                .iter()
                .any(|p| p.kind.matches(name, &self.natives))
    }

    /// Include patterns as written.
    pub fn include_patterns(&self) -> impl Iterator<Item = &str> {
        self.include.iter().map(|p| p.source.as_str())
    }

    /// Exclude patterns as written, without the `!` sigil.
    pub fn exclude_patterns(&self) -> impl Iterator<Item = &str> {
        self.exclude.iter().map(|p| p.source.as_str())
    }

    /// Returns `true` if at least one exclude pattern is present.
    #[must_use]
    pub fn has_excludes(&self) -> bool {
        !self.exclude.is_empty()
    }

    /// Normalized `{include, exclude}` form for display.
    #[must_use]
    pub fn to_view(&self) -> PatternView {
        PatternView {
            include: self.include_patterns().map(str::to_string).collect(),
            exclude: self.exclude_patterns().map(str::to_string).collect(),
        }
    }
}

/// Serializable view of a compiled matcher.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PatternView {
    /// Include patterns.
    pub include: Vec<String>,
    /// Exclude patterns, without the `!` sigil.
    pub exclude: Vec<String>,
}

/// Splits a leading `!` off a pattern.
///
/// # Errors
///
/// Returns [`PatternError::Empty`] or [`PatternError::DoubleNegation`].
pub(crate) fn split_negation(raw: &str) -> Result<(bool, &str), PatternError> {
    if raw.is_empty() {
        return Err(PatternError::Empty);
    }
    match raw.strip_prefix(EXCLUDE_SIGIL) {
        Some(body) if body.starts_with(EXCLUDE_SIGIL) => Err(PatternError::DoubleNegation {
            pattern: raw.to_string(),
        }),
        Some("") => Err(PatternError::Empty),
        Some(body) => Ok((true, body)),
        None => Ok((false, raw)),
    }
}

/// Checks a single pattern without building a matcher.
///
/// # Errors
///
/// Returns the same [`PatternError`] that [`PatternMatcher::new`] would.
pub(crate) fn validate_pattern(raw: &str) -> Result<(), PatternError> {
    let (_, body) = split_negation(raw)?;
    compile(raw, body).map(|_| ())
}

/// Returns `true` if `s` has the shape of a component name.
pub(crate) fn is_component_name(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn compile(raw: &str, body: &str) -> Result<PatternKind, PatternError> {
    if body == "\\" {
        return Ok(PatternKind::All);
    }
    if let Some(path) = body.strip_prefix(NAMESPACE_SEPARATOR) {
        let (path, is_namespace) = match path.strip_suffix(NAMESPACE_SEPARATOR) {
            Some(p) => (p, true),
            None => (path, false),
        };
        if path
            .split(NAMESPACE_SEPARATOR)
            .any(|segment| segment.is_empty() || segment.chars().any(char::is_whitespace))
        {
            return Err(PatternError::Malformed {
                pattern: raw.to_string(),
            });
        }
        return Ok(if is_namespace {
            PatternKind::Namespace(path.to_string())
        } else {
            PatternKind::Exact(path.to_string())
        });
    }
    if body.starts_with(MAGIC_SIGIL) {
        return if body == PHP_NATIVE {
            Ok(PatternKind::Native)
        } else {
            Err(PatternError::UnknownMagicToken {
                token: body.to_string(),
            })
        };
    }
    if is_component_name(body) {
        return Err(PatternError::UnresolvedReference {
            name: body.to_string(),
        });
    }
    if body.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
        return Err(PatternError::Malformed {
            pattern: raw.to_string(),
        });
    }
    Err(PatternError::UnknownSigil {
        pattern: raw.to_string(),
    })
}

/// Invalid pattern syntax.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    /// Empty pattern (or a lone `!`).
    #[error("pattern must not be empty")]
    Empty,

    /// `!!` prefix.
    #[error("`{pattern}`: double negation is not supported")]
    DoubleNegation {
        /// The offending pattern.
        pattern: String,
    },

    /// The pattern starts with a character that has no meaning.
    #[error("`{pattern}`: patterns must start with `\\`, `!`, `@` or a component name")]
    UnknownSigil {
        /// The offending pattern.
        pattern: String,
    },

    /// `@something` other than the known token.
    #[error("`{token}`: unknown magic token, expected `@php_native`")]
    UnknownMagicToken {
        /// The offending token.
        token: String,
    },

    /// A component name that was not expanded before compilation.
    #[error("`{name}` is not a namespace pattern; component names are only valid in rule definitions")]
    UnresolvedReference {
        /// The component name.
        name: String,
    },

    /// A namespace pattern without the root or with empty segments.
    #[error("`{pattern}`: malformed namespace pattern (it must start with `\\` and have no empty segments)")]
    Malformed {
        /// The offending pattern.
        pattern: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn natives() -> NativeSymbols {
        NativeSymbols::new(["SplFileObject"])
    }

    fn matches(patterns: &[&str], name: &str) -> bool {
        PatternMatcher::new(patterns, &natives())
            .unwrap()
            .is_match(name)
    }

    #[test]
    fn exact_patterns() {
        assert!(matches(&[r"\Tests"], "Tests"));
        assert!(matches(&[r"\Tests\Fixtures\SomeClass"], r"Tests\Fixtures\SomeClass"));
        assert!(!matches(&[r"\Tests\Fixtures"], r"Tests\Fixtures\SomeClass"));
        assert!(!matches(&[r"\Tests\Inte"], r"Tests\Component"));
    }

    #[test]
    fn namespace_patterns_respect_segment_boundaries() {
        assert!(matches(&[r"\Tests\Fixtures\"], r"Tests\Fixtures\SomeClass"));
        assert!(matches(&[r"\Foo\"], r"Foo\Bar"));
        assert!(matches(&[r"\Foo\"], "Foo"));
        assert!(!matches(&[r"\Foo\"], "FooBar"));
        assert!(!matches(&[r"\Foo\"], r"FooBar\Baz"));
    }

    #[test]
    fn root_matches_everything() {
        assert!(matches(&["\\"], "Tests"));
        assert!(matches(&["\\"], r"Tests\Fixtures\SomeClass"));
    }

    #[test]
    fn leading_root_on_candidate_is_ignored() {
        assert!(matches(&[r"\Foo\"], r"\Foo\Bar"));
        assert!(matches(&[r"\Foo"], r"\Foo"));
    }

    #[test]
    fn multiple_includes() {
        let patterns = [r"\Tests\Fixtures", r"\Tests\Fixtures\", r"\Tests\Component\"];
        assert!(matches(&patterns, r"Tests\Fixtures"));
        assert!(matches(&patterns, r"Tests\Fixtures\SomeClass"));
        assert!(matches(&patterns, r"Tests\Component\SomeClass"));
        assert!(!matches(&patterns, r"Tests\Unit\SomeClass"));
    }

    #[test]
    fn exclude_subtracts_from_include() {
        let patterns = [r"\Tests\", r"!\Tests\Fixtures\"];
        assert!(!matches(&patterns, r"Tests\Fixtures\SomeClass"));
        assert!(matches(&patterns, r"Tests\Component\SomeClass"));

        let patterns = [r"\Foo\", r"!\Foo\Baz\"];
        assert!(!matches(&patterns, r"Foo\Baz\Qux"));
        assert!(matches(&patterns, r"Foo\Other"));
    }

    #[test]
    fn exclude_only_includes_everything_else() {
        assert!(!matches(&[r"!\Tests\Fixtures\SomeClass"], r"Tests\Fixtures\SomeClass"));
        assert!(matches(&[r"!\Tests\Fixtures\SomeClass"], r"Tests\Component\SomeClass"));
        assert!(matches(&[r"!\Tests\Fixtures\SomeClass"], "Tests"));
        assert!(matches(&[r"!\Foo\"], "Bar"));
        assert!(!matches(&["!\\"], "Tests"));
    }

    #[test]
    fn magic_token_uses_registered_natives() {
        assert!(matches(&[PHP_NATIVE], "SplFileObject"));
        assert!(matches(&[PHP_NATIVE], r"\SplFileObject"));
        assert!(!matches(&[PHP_NATIVE], "ArrayObject"));
        assert!(!matches(&["!@php_native"], "SplFileObject"));
        assert!(matches(&["!@php_native"], r"App\User"));
    }

    #[test]
    fn no_patterns_match_nothing() {
        let empty: [&str; 0] = [];
        assert!(!matches(&empty, "Anything"));
    }

    #[test]
    fn invalid_patterns_are_rejected() {
        let build = |p: &str| PatternMatcher::new(&[p], &natives()).map(|_| ());
        assert_eq!(build(""), Err(PatternError::Empty));
        assert_eq!(build("!"), Err(PatternError::Empty));
        assert!(matches!(
            build("Tests"),
            Err(PatternError::UnresolvedReference { .. })
        ));
        assert!(matches!(
            build(r"Tests\Fixtures"),
            Err(PatternError::Malformed { .. })
        ));
        assert!(matches!(
            build(r"!!\Tests"),
            Err(PatternError::DoubleNegation { .. })
        ));
        assert!(matches!(
            build(r"?\Tests"),
            Err(PatternError::UnknownSigil { .. })
        ));
        assert!(matches!(
            build("@non_exist_magic_word"),
            Err(PatternError::UnknownMagicToken { .. })
        ));
        assert!(matches!(
            build(r"\Foo\\Bar"),
            Err(PatternError::Malformed { .. })
        ));
    }

    #[test]
    fn view_keeps_patterns_as_written() {
        let matcher = PatternMatcher::new(
            &[r"\Application\", r"!\Application\Providers\"],
            &natives(),
        )
        .unwrap();
        assert_eq!(
            matcher.to_view(),
            PatternView {
                include: vec![r"\Application\".to_string()],
                exclude: vec![r"\Application\Providers\".to_string()],
            }
        );
        assert!(matcher.has_excludes());
    }

    #[test]
    fn component_name_shape() {
        assert!(is_component_name("ControllerLayer"));
        assert!(is_component_name("_private2"));
        assert!(!is_component_name("2Layer"));
        assert!(!is_component_name(r"Tests\Fixtures"));
        assert!(!is_component_name(""));
    }
}
