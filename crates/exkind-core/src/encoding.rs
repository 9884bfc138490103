//! Construction arguments and the raw-message encoder
//!
//! Exceptions are built from a list of arbitrary values. The encoder joins
//! them into the raw message with the configured delimiter, either encoding
//! composite values as compact JSON (`Structured`) or tagging them (`Plain`).
//! A structured encoding that fails, which only a self-referencing [`Node`]
//! can cause, falls back to the plain join for the whole list.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;
use std::rc::Rc;

use serde_json::{Map, Value};

use crate::cause::{Cause, ObjectCause};
use crate::config::{Config, Encoding};
use crate::errors::{ExkindError, Result};
use crate::exception::Exception;
use crate::log_degraded;

/// One construction argument
#[derive(Debug, Clone)]
pub enum Arg {
    Text(String),
    Value(Value),
    /// Shared, possibly self-referencing object
    Node(Node),
    Error(Cause),
}

impl Arg {
    /// Wrap a native error
    pub fn native<E>(err: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Arg::Error(Cause::native(err))
    }

    /// The cause this argument contributes, if it is error-like
    pub fn as_cause(&self) -> Option<Cause> {
        match self {
            Arg::Error(cause) => Some(cause.clone()),
            Arg::Value(value) if ObjectCause::is_error_like(value) => {
                Some(Cause::Object(ObjectCause::new(value.clone())))
            }
            _ => None,
        }
    }

    fn structured(&self, visiting: &mut Vec<*const ()>) -> Result<String> {
        Ok(match self {
            Arg::Text(s) => s.clone(),
            Arg::Value(Value::String(s)) => s.clone(),
            Arg::Value(v) => v.to_string(),
            Arg::Node(node) => node.to_json(visiting, "$")?.to_string(),
            Arg::Error(cause) => cause.message(),
        })
    }

    fn plain(&self) -> String {
        match self {
            Arg::Text(s) => s.clone(),
            Arg::Value(Value::String(s)) => s.clone(),
            Arg::Value(Value::Array(_)) => "[array]".to_string(),
            Arg::Value(Value::Object(_)) | Arg::Node(_) => "[object]".to_string(),
            Arg::Value(v) => v.to_string(),
            Arg::Error(cause) => cause.message(),
        }
    }
}

impl From<&str> for Arg {
    fn from(s: &str) -> Self {
        Arg::Text(s.to_string())
    }
}

impl From<String> for Arg {
    fn from(s: String) -> Self {
        Arg::Text(s)
    }
}

impl From<Value> for Arg {
    fn from(v: Value) -> Self {
        Arg::Value(v)
    }
}

macro_rules! arg_from_number {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Arg {
                fn from(n: $ty) -> Self {
                    Arg::Value(Value::from(n))
                }
            }
        )*
    };
}

arg_from_number!(i32, i64, u32, u64, usize);

impl From<f64> for Arg {
    fn from(n: f64) -> Self {
        Arg::Value(Value::from(n))
    }
}

impl From<bool> for Arg {
    fn from(b: bool) -> Self {
        Arg::Value(Value::Bool(b))
    }
}

impl From<Node> for Arg {
    fn from(node: Node) -> Self {
        Arg::Node(node)
    }
}

impl From<Exception> for Arg {
    fn from(e: Exception) -> Self {
        Arg::Error(Cause::from(e))
    }
}

impl From<Cause> for Arg {
    fn from(cause: Cause) -> Self {
        Arg::Error(cause)
    }
}

impl<T: Into<Arg>> From<Option<T>> for Arg {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Arg::Value(Value::Null))
    }
}

/// A shared object whose fields may point back at itself
///
/// ```
/// use exkind_core::Node;
///
/// let node = Node::new();
/// node.set("self", node.clone());
/// ```
#[derive(Clone, Default)]
pub struct Node(Rc<RefCell<BTreeMap<String, Arg>>>);

impl Node {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<Arg>) {
        self.0.borrow_mut().insert(key.into(), value.into());
    }

    pub fn keys(&self) -> Vec<String> {
        self.0.borrow().keys().cloned().collect()
    }

    fn id(&self) -> *const () {
        Rc::as_ptr(&self.0) as *const ()
    }

    fn to_json(&self, visiting: &mut Vec<*const ()>, path: &str) -> Result<Value> {
        if visiting.contains(&self.id()) {
            return Err(ExkindError::CircularStructure {
                path: path.to_string(),
            });
        }
        visiting.push(self.id());

        let mut map = Map::new();
        for (key, arg) in self.0.borrow().iter() {
            let child_path = format!("{}.{}", path, key);
            let value = match arg {
                Arg::Text(s) => Value::String(s.clone()),
                Arg::Value(v) => v.clone(),
                Arg::Node(child) => child.to_json(visiting, &child_path)?,
                Arg::Error(cause) => cause.to_json(),
            };
            map.insert(key.clone(), value);
        }

        visiting.pop();
        Ok(Value::Object(map))
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Keys only: fields may refer back to this node.
        f.debug_struct("Node").field("keys", &self.keys()).finish()
    }
}

/// Encode every argument with the structured rules
///
/// # Errors
///
/// Returns `CircularStructure` when a node refers back to itself.
pub fn encode_structured(args: &[Arg], delimiter: &str) -> Result<String> {
    let mut parts = Vec::with_capacity(args.len());
    for arg in args {
        let mut visiting = Vec::new();
        parts.push(arg.structured(&mut visiting)?);
    }
    Ok(parts.join(delimiter))
}

/// Encode every argument as plain text; never fails
pub fn encode_plain(args: &[Arg], delimiter: &str) -> String {
    args.iter()
        .map(Arg::plain)
        .collect::<Vec<_>>()
        .join(delimiter)
}

/// Join `args` into a raw message according to `config`
pub fn encode_args(args: &[Arg], config: &Config) -> String {
    match config.encoding {
        Encoding::Plain => encode_plain(args, &config.delimiter),
        Encoding::Structured => match encode_structured(args, &config.delimiter) {
            Ok(text) => text,
            Err(err) => {
                log_degraded!("encode_args", reason = %err, err_code = err.code());
                encode_plain(args, &config.delimiter)
            }
        },
    }
}
