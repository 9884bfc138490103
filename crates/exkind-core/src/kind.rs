//! Kind descriptors
//!
//! An [`ExceptionKind`] is a cheap handle to one declared kind. Handles are
//! compared by identity: two handles are equal only when they come from the
//! same registry entry.

use std::error::Error;
use std::fmt;
use std::panic::Location;
use std::sync::{Arc, OnceLock};

use exkind_core_types::ScopeKey;

use crate::cause::Cause;
use crate::config;
use crate::encoding::{encode_args, Arg};
use crate::exception::{Exception, Snapshot};

#[derive(Debug)]
struct KindDef {
    name: String,
    label: Option<String>,
    scope_key: ScopeKey,
    scope_index: usize,
    code: Option<i64>,
    base: bool,
}

/// Handle to one declared kind
#[derive(Clone)]
pub struct ExceptionKind(Arc<KindDef>);

impl ExceptionKind {
    pub(crate) fn new(
        name: &str,
        label: Option<&str>,
        scope_key: ScopeKey,
        scope_index: usize,
    ) -> Self {
        Self(Arc::new(KindDef {
            name: name.to_string(),
            label: label.map(str::to_string),
            scope_key,
            scope_index,
            code: name.parse().ok(),
            base: false,
        }))
    }

    /// The root kind; every exception satisfies its `is`
    pub fn base() -> Self {
        static BASE: OnceLock<ExceptionKind> = OnceLock::new();
        BASE.get_or_init(|| {
            Self(Arc::new(KindDef {
                name: "Exception".to_string(),
                label: None,
                scope_key: ScopeKey::global(),
                scope_index: 0,
                code: None,
                base: true,
            }))
        })
        .clone()
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn label(&self) -> Option<&str> {
        self.0.label.as_deref()
    }

    pub fn scope_key(&self) -> &ScopeKey {
        &self.0.scope_key
    }

    /// Position at which this kind was first registered in its scope
    pub fn scope_index(&self) -> usize {
        self.0.scope_index
    }

    /// Numeric code, present when the name is a base-10 integer
    pub fn code(&self) -> Option<i64> {
        self.0.code
    }

    pub fn is_base(&self) -> bool {
        self.0.base
    }

    /// True when both handles refer to the same kind
    pub fn ptr_eq(&self, other: &ExceptionKind) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Build an exception from arbitrary arguments
    ///
    /// The first error-like argument becomes the cause; all arguments are
    /// joined into the raw message by the configured encoding.
    #[track_caller]
    pub fn new_exception<I>(&self, args: I) -> Exception
    where
        I: IntoIterator,
        I::Item: Into<Arg>,
    {
        let caller = Location::caller();
        let args: Vec<Arg> = args.into_iter().map(Into::into).collect();
        let cause = args.iter().find_map(Arg::as_cause);
        let config = config::current();
        let raw_message = encode_args(&args, &config);
        Exception::build(self.clone(), raw_message, cause, caller, &config)
    }

    /// Build an exception with a single message argument
    #[track_caller]
    pub fn create(&self, message: impl Into<Arg>) -> Exception {
        let message: Arg = message.into();
        self.new_exception([message])
    }

    /// Build an exception without a message
    #[track_caller]
    pub fn new_empty(&self) -> Exception {
        self.new_exception(Vec::<Arg>::new())
    }

    /// Build an exception and return it as the error
    ///
    /// ```
    /// use exkind_core::define_labeled;
    ///
    /// let errors = define_labeled("doc");
    /// let denied = errors.kind("Denied");
    /// let result: Result<(), _> = denied.throw(["no access"]);
    /// assert_eq!(result.unwrap_err().message(), "[doc] Denied: no access");
    /// ```
    ///
    /// # Errors
    ///
    /// Always returns `Err`.
    #[track_caller]
    pub fn throw<T, I>(&self, args: I) -> Result<T, Exception>
    where
        I: IntoIterator,
        I::Item: Into<Arg>,
    {
        Err(self.new_exception(args))
    }

    /// True when `value` is an exception of this kind
    pub fn is(&self, value: &(dyn Error + 'static)) -> bool {
        Exception::downcast(value).map_or(false, |e| self.is_base() || e.kind().ptr_eq(self))
    }

    /// Apply `f` when `value` is an exception of this kind
    pub fn match_with<R, F>(&self, value: &(dyn Error + 'static), f: F) -> Option<R>
    where
        F: FnOnce(&Exception) -> R,
    {
        match Exception::downcast(value) {
            Some(e) if self.is(value) => Some(f(e)),
            _ => None,
        }
    }

    /// Normalise any value into an exception of this kind
    ///
    /// An exception of this kind is returned unchanged. Error-like values
    /// contribute their message and are attached as the cause. Anything
    /// else becomes the sole message argument.
    #[track_caller]
    pub fn cast(&self, value: impl Into<Arg>) -> Exception {
        let caller = Location::caller();
        let config = config::current();
        match value.into() {
            Arg::Error(Cause::Exception(e)) if self.is(&*e) => *e,
            arg => match arg.as_cause() {
                Some(cause) => {
                    Exception::build(self.clone(), cause.message(), Some(cause), caller, &config)
                }
                None => {
                    let raw_message = encode_args(std::slice::from_ref(&arg), &config);
                    Exception::build(self.clone(), raw_message, None, caller, &config)
                }
            },
        }
    }

    /// Rebuild an exception of this kind from a snapshot
    ///
    /// The snapshot's stack, when present, replaces the fresh one so the
    /// copy keeps the original's trace.
    #[track_caller]
    pub fn restore(&self, snapshot: impl Into<Snapshot>) -> Exception {
        let caller = Location::caller();
        let snapshot = snapshot.into();
        let config = config::current();
        let mut exception = Exception::build(
            self.clone(),
            snapshot.resolved_raw_message(),
            snapshot.cause,
            caller,
            &config,
        );
        if let Some(stack) = snapshot.stack {
            exception.overwrite_stack(stack);
        }
        exception
    }
}

impl PartialEq for ExceptionKind {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for ExceptionKind {}

impl fmt::Debug for ExceptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExceptionKind")
            .field("name", &self.0.name)
            .field("scope_key", &self.0.scope_key)
            .field("scope_index", &self.0.scope_index)
            .finish()
    }
}

impl fmt::Display for ExceptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.name)
    }
}
