//! Scope keys for the kind registry
//!
//! A scope is the namespace bucket that owns a set of kind names and their
//! ordinal indices. Its key combines an optional caller label with the
//! source location the kind was requested from.

use serde::{Deserialize, Serialize};

/// Scope used when no call site can be inferred
pub const GLOBAL_SCOPE: &str = "global";

/// Identifier of one registry bucket
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScopeKey(String);

impl ScopeKey {
    /// Compose the effective key from an optional label and a default scope
    ///
    /// `label:default` when a label is given, `default` alone otherwise.
    /// A label equal to the default scope is not repeated.
    pub fn compose(label: Option<&str>, default_scope: &str) -> Self {
        match label {
            Some(label) if label == default_scope => Self(label.to_string()),
            Some(label) => Self(format!("{}:{}", label, default_scope)),
            None => Self(default_scope.to_string()),
        }
    }

    /// The fallback scope
    pub fn global() -> Self {
        Self(GLOBAL_SCOPE.to_string())
    }

    /// Get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Create from an existing string (for deserialization)
    pub fn from_string(s: String) -> Self {
        Self(s)
    }

    /// True for the fallback scope, with or without a label
    pub fn is_global(&self) -> bool {
        self.0 == GLOBAL_SCOPE || self.0.ends_with(":global")
    }
}

impl std::fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ScopeKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
