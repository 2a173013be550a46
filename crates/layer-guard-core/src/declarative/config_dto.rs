//! Rule definition deserialization types (DTO layer).
//!
//! These types exist solely for serde deserialization.
//! They are converted to domain model types via the loader.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

/// A map that keeps document order and duplicate keys.
///
/// Duplicates stay visible so the loader can reject them instead of
/// silently keeping the last one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedEntries<T>(Vec<(String, T)>);

impl<T> OrderedEntries<T> {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends an entry, even if the key already exists.
    pub fn push(&mut self, key: impl Into<String>, value: T) {
        self.0.push((key.into(), value));
    }

    /// Iterates over entries in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the number of entries, duplicates included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<T> Default for OrderedEntries<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Into<String>, T> FromIterator<(K, T)> for OrderedEntries<T> {
    fn from_iter<I: IntoIterator<Item = (K, T)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for OrderedEntries<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor<T>(PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for EntriesVisitor<T> {
            type Value = OrderedEntries<T>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a table")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, T>()? {
                    entries.push((key, value));
                }
                Ok(OrderedEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}

/// Rule name → component definitions.
pub type RuleDefinitionsDto = OrderedEntries<RuleDto>;

/// Component name → component definition, for one rule.
pub type RuleDto = OrderedEntries<ComponentDto>;

/// Raw definition of one component.
///
/// `define` is optional here so that a missing definition is reported by
/// the loader with rule and component context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComponentDto {
    /// Membership patterns.
    #[serde(default)]
    pub define: Option<Vec<String>>,
    /// Allowed depender patterns.
    #[serde(default)]
    pub depender: Option<Vec<String>>,
    /// Allowed dependee patterns.
    #[serde(default)]
    pub dependee: Option<Vec<String>>,
}

impl ComponentDto {
    /// A component defined by `patterns` with no restrictions.
    #[must_use]
    pub fn defined_as<S: Into<String>>(patterns: impl IntoIterator<Item = S>) -> Self {
        Self {
            define: Some(patterns.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    /// Sets the allowed dependers.
    #[must_use]
    pub fn with_depender<S: Into<String>>(mut self, patterns: impl IntoIterator<Item = S>) -> Self {
        self.depender = Some(patterns.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the allowed dependees.
    #[must_use]
    pub fn with_dependee<S: Into<String>>(mut self, patterns: impl IntoIterator<Item = S>) -> Self {
        self.dependee = Some(patterns.into_iter().map(Into::into).collect());
        self
    }
}
