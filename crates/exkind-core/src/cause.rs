//! Causal-chain linkage
//!
//! The cause of an exception is the first error-like value it was built
//! from: another exception, any native `std::error::Error`, or a JSON
//! record carrying a `message` string.

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Value};

use crate::exception::Exception;

/// An error-like value retained for causal-chain inspection
#[derive(Debug, Clone)]
pub enum Cause {
    /// An exception produced by some kind
    Exception(Box<Exception>),
    /// Any other error value
    Native(Arc<dyn Error + Send + Sync>),
    /// A structured record with a `message` field
    Object(ObjectCause),
}

impl Cause {
    /// Wrap a native error
    pub fn native<E>(err: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Cause::Native(Arc::new(err))
    }

    /// Message text of the cause
    pub fn message(&self) -> String {
        match self {
            Cause::Exception(e) => e.message().to_string(),
            Cause::Native(e) => e.to_string(),
            Cause::Object(o) => o.message.clone(),
        }
    }

    /// Kind or type name, when one is known
    pub fn name(&self) -> Option<String> {
        match self {
            Cause::Exception(e) => Some(e.name().to_string()),
            Cause::Native(_) => None,
            Cause::Object(o) => o
                .value
                .get("name")
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }

    /// The cause as a `std::error::Error` for `source()` chains
    pub fn as_error(&self) -> &(dyn Error + 'static) {
        match self {
            Cause::Exception(e) => &**e,
            Cause::Native(e) => &**e,
            Cause::Object(o) => o,
        }
    }

    /// JSON projection used by snapshots
    pub fn to_json(&self) -> Value {
        match self {
            Cause::Exception(e) => serde_json::to_value(e.to_snapshot())
                .unwrap_or_else(|_| json!({ "name": e.name(), "message": e.message() })),
            Cause::Native(e) => json!({ "message": e.to_string() }),
            Cause::Object(o) => o.value.clone(),
        }
    }

    /// Rebuild a cause from its JSON projection
    ///
    /// Causes read back from JSON are always `Cause::Object`.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::String(message) => Cause::Object(ObjectCause {
                value: json!({ "message": message }),
                message,
            }),
            other => Cause::Object(ObjectCause::new(other)),
        }
    }
}

impl From<Exception> for Cause {
    fn from(e: Exception) -> Self {
        Cause::Exception(Box::new(e))
    }
}

impl PartialEq for Cause {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Cause::Exception(a), Cause::Exception(b)) => a == b,
            (Cause::Native(a), Cause::Native(b)) => Arc::ptr_eq(a, b),
            (Cause::Object(a), Cause::Object(b)) => a.value == b.value,
            _ => false,
        }
    }
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl Serialize for Cause {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Cause {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Cause::from_json)
    }
}

/// A JSON record treated as an error
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectCause {
    value: Value,
    message: String,
}

impl ObjectCause {
    /// Wrap `value`; its `message` string field, if any, is the message
    pub fn new(value: Value) -> Self {
        let message = match value.get("message") {
            Some(Value::String(s)) => s.clone(),
            _ => value.to_string(),
        };
        Self { value, message }
    }

    /// True when `value` is an object with a string `message` field
    pub fn is_error_like(value: &Value) -> bool {
        matches!(value.get("message"), Some(Value::String(_)))
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ObjectCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for ObjectCause {}
