//! Fully Qualified Structural Element Names.
//!
//! A [`ClassFqsen`] names a class-like element (`\App\Domain\User`).
//! Member names (methods, properties, class constants) can only be derived
//! from an existing [`ClassFqsen`], so a member never exists without its
//! owning class.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

/// The namespace separator, which doubles as the namespace root.
pub const NAMESPACE_SEPARATOR: char = '\\';

/// Canonical name of a class, interface or trait.
///
/// Always starts with the namespace root and contains no empty segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClassFqsen(String);

impl ClassFqsen {
    /// Creates a class name from a fully qualified string (`\Foo\Bar`).
    ///
    /// # Errors
    ///
    /// Returns error if the name is empty, does not start with the
    /// namespace root, or contains an empty segment.
    pub fn new(name: &str) -> Result<Self, FqsenError> {
        validate_qualified(name).map(Self)
    }

    /// Creates a class name, adding the namespace root when it is missing.
    ///
    /// Reflection layers usually report names as `Foo\Bar`; this accepts
    /// both spellings.
    ///
    /// # Errors
    ///
    /// Returns error if the name is empty or contains an empty segment.
    pub fn qualify(name: &str) -> Result<Self, FqsenError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(FqsenError::Empty);
        }
        if trimmed.starts_with(NAMESPACE_SEPARATOR) {
            Self::new(trimmed)
        } else {
            Self::new(&format!("{NAMESPACE_SEPARATOR}{trimmed}"))
        }
    }

    /// Returns the qualified name, including the leading root.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the name without the leading namespace root.
    #[must_use]
    pub fn unqualified(&self) -> &str {
        &self.0[NAMESPACE_SEPARATOR.len_utf8()..]
    }

    /// Returns the last segment (`User` for `\App\Domain\User`).
    #[must_use]
    pub fn short_name(&self) -> &str {
        self.0
            .rsplit(NAMESPACE_SEPARATOR)
            .next()
            .unwrap_or(&self.0)
    }

    /// Returns the enclosing namespace, or `None` for a class in the root namespace.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        let unqualified = self.unqualified();
        unqualified
            .rfind(NAMESPACE_SEPARATOR)
            .map(|idx| &unqualified[..idx])
    }

    /// Names a method declared on this class.
    #[must_use]
    pub fn method(&self, name: &str) -> Fqsen {
        Fqsen::Method {
            class: self.clone(),
            name: name.to_string(),
        }
    }

    /// Names a property declared on this class.
    #[must_use]
    pub fn property(&self, name: &str) -> Fqsen {
        Fqsen::Property {
            class: self.clone(),
            name: name.trim_start_matches('$').to_string(),
        }
    }

    /// Names a class constant declared on this class.
    #[must_use]
    pub fn constant(&self, name: &str) -> Fqsen {
        Fqsen::ClassConstant {
            class: self.clone(),
            name: name.to_string(),
        }
    }
}

impl fmt::Display for ClassFqsen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ClassFqsen {
    type Error = FqsenError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::qualify(&value)
    }
}

impl From<ClassFqsen> for String {
    fn from(value: ClassFqsen) -> Self {
        value.0
    }
}

/// A typed structural element name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Fqsen {
    /// A class-like element.
    Class(ClassFqsen),
    /// A method of a class (`\Foo::bar()`).
    Method {
        /// Owning class.
        class: ClassFqsen,
        /// Method name.
        name: String,
    },
    /// A property of a class (`\Foo::$bar`).
    Property {
        /// Owning class.
        class: ClassFqsen,
        /// Property name without the `$` sigil.
        name: String,
    },
    /// A class constant (`\Foo::BAR`).
    ClassConstant {
        /// Owning class.
        class: ClassFqsen,
        /// Constant name.
        name: String,
    },
    /// A namespaced function (`\foo\bar()`), stored qualified.
    Function(String),
}

impl Fqsen {
    /// Creates a class name. See [`ClassFqsen::new`].
    ///
    /// # Errors
    ///
    /// Returns error if the name is malformed.
    pub fn class(name: &str) -> Result<Self, FqsenError> {
        ClassFqsen::new(name).map(Self::Class)
    }

    /// Creates a function name from a fully qualified string.
    ///
    /// # Errors
    ///
    /// Returns error if the name is malformed.
    pub fn function(name: &str) -> Result<Self, FqsenError> {
        let name = name.trim_end_matches("()");
        validate_qualified(name).map(Self::Function)
    }

    /// Returns the owning (or own) class, if this element is class-scoped.
    #[must_use]
    pub fn class_fqsen(&self) -> Option<&ClassFqsen> {
        match self {
            Self::Class(class)
            | Self::Method { class, .. }
            | Self::Property { class, .. }
            | Self::ClassConstant { class, .. } => Some(class),
            Self::Function(_) => None,
        }
    }

    /// Returns `true` for class-like elements.
    #[must_use]
    pub fn is_class(&self) -> bool {
        matches!(self, Self::Class(_))
    }
}

impl From<ClassFqsen> for Fqsen {
    fn from(value: ClassFqsen) -> Self {
        Self::Class(value)
    }
}

impl fmt::Display for Fqsen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class(class) => write!(f, "{class}"),
            Self::Method { class, name } => write!(f, "{class}::{name}()"),
            Self::Property { class, name } => write!(f, "{class}::${name}"),
            Self::ClassConstant { class, name } => write!(f, "{class}::{name}"),
            Self::Function(name) => write!(f, "{name}()"),
        }
    }
}

impl Serialize for Fqsen {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

fn validate_qualified(name: &str) -> Result<String, FqsenError> {
    if name.is_empty() {
        return Err(FqsenError::Empty);
    }
    let Some(rest) = name.strip_prefix(NAMESPACE_SEPARATOR) else {
        return Err(FqsenError::MissingRoot {
            name: name.to_string(),
        });
    };
    if rest
        .split(NAMESPACE_SEPARATOR)
        .any(|segment| segment.is_empty() || segment.chars().any(char::is_whitespace))
    {
        return Err(FqsenError::InvalidSegment {
            name: name.to_string(),
        });
    }
    Ok(name.to_string())
}

/// Errors from constructing a structural element name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FqsenError {
    /// The name is empty.
    #[error("structural element name must not be empty")]
    Empty,

    /// The name does not start with the namespace root.
    #[error("`{name}` must start with the namespace root `\\`")]
    MissingRoot {
        /// The offending name.
        name: String,
    },

    /// The name has an empty or whitespace-containing segment.
    #[error("`{name}` contains an empty or invalid namespace segment")]
    InvalidSegment {
        /// The offending name.
        name: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_keeps_root() {
        let class = ClassFqsen::new(r"\App\Domain\User").unwrap();
        assert_eq!(class.as_str(), r"\App\Domain\User");
        assert_eq!(class.unqualified(), r"App\Domain\User");
        assert_eq!(class.short_name(), "User");
        assert_eq!(class.namespace(), Some(r"App\Domain"));
    }

    #[test]
    fn class_in_root_namespace_has_no_namespace() {
        let class = ClassFqsen::new(r"\DateTime").unwrap();
        assert_eq!(class.namespace(), None);
        assert_eq!(class.short_name(), "DateTime");
    }

    #[test]
    fn new_rejects_malformed_names() {
        assert_eq!(ClassFqsen::new(""), Err(FqsenError::Empty));
        assert!(matches!(
            ClassFqsen::new(r"App\User"),
            Err(FqsenError::MissingRoot { .. })
        ));
        assert!(matches!(
            ClassFqsen::new(r"\App\\User"),
            Err(FqsenError::InvalidSegment { .. })
        ));
        assert!(matches!(
            ClassFqsen::new(r"\App\"),
            Err(FqsenError::InvalidSegment { .. })
        ));
        assert!(matches!(
            ClassFqsen::new("\\"),
            Err(FqsenError::InvalidSegment { .. })
        ));
    }

    #[test]
    fn qualify_adds_missing_root() {
        let a = ClassFqsen::qualify(r"Controller\Dir\Class2").unwrap();
        let b = ClassFqsen::qualify(r"\Controller\Dir\Class2").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), r"\Controller\Dir\Class2");
        assert_eq!(ClassFqsen::qualify("  "), Err(FqsenError::Empty));
    }

    #[test]
    fn members_derive_from_class() {
        let class = ClassFqsen::new(r"\App\Repo").unwrap();
        assert_eq!(class.method("save").to_string(), r"\App\Repo::save()");
        assert_eq!(class.property("$items").to_string(), r"\App\Repo::$items");
        assert_eq!(class.property("items").to_string(), r"\App\Repo::$items");
        assert_eq!(class.constant("LIMIT").to_string(), r"\App\Repo::LIMIT");
        assert_eq!(class.method("save").class_fqsen(), Some(&class));
    }

    #[test]
    fn function_display() {
        let f = Fqsen::function(r"\App\helper").unwrap();
        assert_eq!(f.to_string(), r"\App\helper()");
        assert!(f.class_fqsen().is_none());
        assert!(!f.is_class());
    }

    #[test]
    fn class_fqsen_serde_accepts_unqualified() {
        let class: ClassFqsen = serde_json::from_str(r#""App\\User""#).unwrap();
        assert_eq!(class.as_str(), r"\App\User");
        assert_eq!(
            serde_json::to_string(&class).unwrap(),
            r#""\\App\\User""#
        );
    }
}
