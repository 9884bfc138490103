//! The on-demand kind factory
//!
//! An [`ExceptionEnum`] hands out kinds by name. The first request for a
//! name in a scope creates the kind and gives it the next ordinal; every
//! later request, through any factory resolving to the same scope, returns
//! that same handle.
//!
//! ```
//! use exkind_core::define_labeled;
//!
//! let errors = define_labeled("http");
//! let [not_found, timeout] = errors.kinds(["NotFound", "Timeout"]);
//!
//! assert_eq!(not_found.scope_index() + 1, timeout.scope_index());
//! assert!(not_found.ptr_eq(&errors.kind("NotFound")));
//! ```

use std::error::Error;
use std::panic::Location;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use exkind_core_types::ScopeKey;

use crate::config;
use crate::exception::Exception;
use crate::kind::ExceptionKind;
use crate::registry::{Definition, ScopeRegistry};
use crate::resolver::{resolve_scope, CallSiteResolver, CallerLocation};
use crate::{log_kind_collision, log_kind_created};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnumOptions {
    /// Prefix of the scope key and the `$label` placeholder value
    pub label: Option<String>,
}

impl EnumOptions {
    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
        }
    }
}

/// Factory of exception kinds
#[derive(Debug)]
pub struct ExceptionEnum {
    registry: Arc<ScopeRegistry>,
    resolver: Arc<dyn CallSiteResolver>,
    scope: LocalScope,
}

impl ExceptionEnum {
    /// A factory over the process-wide registry, scoped by call site
    pub fn new(options: EnumOptions) -> Self {
        Self::builder().options(options).build()
    }

    pub fn builder() -> ExceptionEnumBuilder {
        ExceptionEnumBuilder::default()
    }

    pub fn label(&self) -> Option<&str> {
        self.scope.label()
    }

    pub fn registry(&self) -> &Arc<ScopeRegistry> {
        &self.registry
    }

    /// Kinds requested through this factory
    pub fn scope(&self) -> &LocalScope {
        &self.scope
    }

    /// Get the kind named `name` in the caller's scope, creating it if needed
    #[track_caller]
    pub fn kind(&self, name: &str) -> ExceptionKind {
        self.kind_at(name, Location::caller())
    }

    /// Get several kinds at once, in the order given
    ///
    /// Every name resolves to a kind, so the result can always be
    /// destructured.
    #[track_caller]
    pub fn kinds<const N: usize>(&self, names: [&str; N]) -> [ExceptionKind; N] {
        let caller = Location::caller();
        names.map(|name| self.kind_at(name, caller))
    }

    /// Scope key a request made here would use
    #[track_caller]
    pub fn scope_key(&self) -> ScopeKey {
        resolve_scope(self.resolver.as_ref(), self.label(), Location::caller())
    }

    fn kind_at(&self, name: &str, caller: &Location<'_>) -> ExceptionKind {
        let key = resolve_scope(self.resolver.as_ref(), self.label(), caller);
        let scope = self.registry.get_or_create_scope(&key);

        let definition = scope.get_or_define(name, self.label());
        match &definition {
            Definition::Existing(kind) => {
                log_kind_collision!(
                    "kind",
                    kind = name,
                    scope_key = key.as_str(),
                    scope_index = kind.scope_index(),
                );
            }
            Definition::Created(kind) => {
                log_kind_created!(
                    "kind",
                    kind = name,
                    scope_key = key.as_str(),
                    scope_index = kind.scope_index(),
                    label = ?self.label(),
                );
                let max = config::current().max_scoped_defs;
                if kind.scope_index() >= max {
                    tracing::debug!(
                        component = module_path!(),
                        op = "kind",
                        scope_key = key.as_str(),
                        len = kind.scope_index() + 1,
                        max_scoped_defs = max,
                        "scope exceeds max_scoped_defs; extra kinds are not enumerated"
                    );
                }
            }
        }

        let kind = definition.into_kind();
        self.scope.record(&kind);
        kind
    }
}

impl Default for ExceptionEnum {
    fn default() -> Self {
        Self::new(EnumOptions::default())
    }
}

#[derive(Debug, Default)]
pub struct ExceptionEnumBuilder {
    label: Option<String>,
    registry: Option<Arc<ScopeRegistry>>,
    resolver: Option<Arc<dyn CallSiteResolver>>,
}

impl ExceptionEnumBuilder {
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn options(mut self, options: EnumOptions) -> Self {
        self.label = options.label;
        self
    }

    /// Use `registry` instead of the process-wide one
    pub fn registry(mut self, registry: Arc<ScopeRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn resolver(mut self, resolver: impl CallSiteResolver + 'static) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    pub fn build(self) -> ExceptionEnum {
        ExceptionEnum {
            registry: self.registry.unwrap_or_else(ScopeRegistry::global),
            resolver: self.resolver.unwrap_or_else(|| Arc::new(CallerLocation)),
            scope: LocalScope::new(self.label),
        }
    }
}

/// Kinds requested through one factory
///
/// Two factories resolving to the same registry scope share kinds but keep
/// separate local lists.
#[derive(Debug, Default)]
pub struct LocalScope {
    label: Option<String>,
    kinds: Mutex<Vec<ExceptionKind>>,
}

impl LocalScope {
    fn new(label: Option<String>) -> Self {
        Self {
            label,
            kinds: Mutex::new(Vec::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ExceptionKind>> {
        self.kinds.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, kind: &ExceptionKind) {
        let mut kinds = self.lock();
        if !kinds.iter().any(|k| k.ptr_eq(kind)) {
            kinds.push(kind.clone());
        }
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Requested kinds in request order, at most `max_scoped_defs`
    pub fn kinds(&self) -> Vec<ExceptionKind> {
        let max = config::current().max_scoped_defs;
        self.lock().iter().take(max).cloned().collect()
    }

    /// Names of the requested kinds, at most `max_scoped_defs`
    pub fn names(&self) -> Vec<String> {
        self.kinds().iter().map(|k| k.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lock().iter().any(|k| k.name() == name)
    }

    /// True when `value` is an exception of a kind requested here
    pub fn matches(&self, value: &(dyn Error + 'static)) -> bool {
        Exception::downcast(value).map_or(false, |e| {
            self.lock().iter().any(|k| k.ptr_eq(e.kind()))
        })
    }

    /// Apply `f` when `value` is an exception of a kind requested here
    pub fn match_with<R, F>(&self, value: &(dyn Error + 'static), f: F) -> Option<R>
    where
        F: FnOnce(&Exception) -> R,
    {
        match Exception::downcast(value) {
            Some(e) if self.matches(value) => Some(f(e)),
            _ => None,
        }
    }
}

/// A factory with no label over the process-wide registry
pub fn define() -> ExceptionEnum {
    ExceptionEnum::default()
}

/// A labeled factory over the process-wide registry
pub fn define_labeled(label: impl Into<String>) -> ExceptionEnum {
    ExceptionEnum::new(EnumOptions::labeled(label))
}
