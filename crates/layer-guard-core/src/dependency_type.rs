//! How one element depends on another.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of a single dependency fact.
///
/// `caller` is `None` when the dependency occurs at class-declaration
/// level rather than inside a method body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DependencyType {
    /// A call to a method of the dependee.
    MethodCall {
        /// Calling method of the depender.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caller: Option<String>,
        /// Called method of the dependee.
        callee: String,
    },
    /// A read of a property of the dependee.
    PropertyFetch {
        /// Calling method of the depender.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caller: Option<String>,
        /// Fetched property.
        #[serde(rename = "property")]
        property_name: String,
    },
    /// A read of a class constant of the dependee.
    ConstantFetch {
        /// Calling method of the depender.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caller: Option<String>,
        /// Fetched constant.
        #[serde(rename = "constant")]
        constant_name: String,
    },
    /// An instantiation of the dependee.
    NewObject {
        /// Calling method of the depender.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caller: Option<String>,
    },
    /// Structural dependency: inheritance, implementation, trait use, type hints.
    #[default]
    Generic,
}

impl DependencyType {
    /// Creates a method-call dependency.
    #[must_use]
    pub fn method_call(caller: Option<&str>, callee: &str) -> Self {
        Self::MethodCall {
            caller: caller.map(str::to_string),
            callee: callee.to_string(),
        }
    }

    /// Creates a property-fetch dependency.
    #[must_use]
    pub fn property_fetch(caller: Option<&str>, property_name: &str) -> Self {
        Self::PropertyFetch {
            caller: caller.map(str::to_string),
            property_name: property_name.to_string(),
        }
    }

    /// Creates a constant-fetch dependency.
    #[must_use]
    pub fn constant_fetch(caller: Option<&str>, constant_name: &str) -> Self {
        Self::ConstantFetch {
            caller: caller.map(str::to_string),
            constant_name: constant_name.to_string(),
        }
    }

    /// Creates an instantiation dependency.
    #[must_use]
    pub fn new_object(caller: Option<&str>) -> Self {
        Self::NewObject {
            caller: caller.map(str::to_string),
        }
    }

    /// Returns the calling method, if the dependency occurs inside one.
    #[must_use]
    pub fn caller(&self) -> Option<&str> {
        match self {
            Self::MethodCall { caller, .. }
            | Self::PropertyFetch { caller, .. }
            | Self::ConstantFetch { caller, .. }
            | Self::NewObject { caller } => caller.as_deref(),
            Self::Generic => None,
        }
    }

    /// Returns the snake_case kind name used in serialized facts.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MethodCall { .. } => "method_call",
            Self::PropertyFetch { .. } => "property_fetch",
            Self::ConstantFetch { .. } => "constant_fetch",
            Self::NewObject { .. } => "new_object",
            Self::Generic => "generic",
        }
    }
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MethodCall { callee, .. } => write!(f, "method_call({callee})"),
            Self::PropertyFetch { property_name, .. } => {
                write!(f, "property_fetch(${property_name})")
            }
            Self::ConstantFetch { constant_name, .. } => {
                write!(f, "constant_fetch({constant_name})")
            }
            Self::NewObject { .. } => f.write_str("new_object"),
            Self::Generic => f.write_str("generic"),
        }
    }
}
