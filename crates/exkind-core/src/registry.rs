//! Scope registry
//!
//! Maps each scope key to the kinds declared under it. A kind is created at
//! most once per `(scope, name)`: the lookup and the insert happen under the
//! scope's lock, so concurrent first requests agree on one handle and one
//! ordinal. Nothing is ever evicted.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use exkind_core_types::ScopeKey;

use crate::kind::ExceptionKind;

/// Outcome of a get-or-define request
#[derive(Debug, Clone)]
pub(crate) enum Definition {
    Created(ExceptionKind),
    Existing(ExceptionKind),
}

impl Definition {
    pub(crate) fn into_kind(self) -> ExceptionKind {
        match self {
            Definition::Created(kind) | Definition::Existing(kind) => kind,
        }
    }
}

#[derive(Debug, Default)]
struct ScopeKinds {
    ordered: Vec<ExceptionKind>,
    by_name: HashMap<String, usize>,
}

/// Kinds registered under one scope key, in ordinal order
#[derive(Debug)]
pub struct Scope {
    key: ScopeKey,
    kinds: Mutex<ScopeKinds>,
}

impl Scope {
    fn new(key: ScopeKey) -> Self {
        Self {
            key,
            kinds: Mutex::new(ScopeKinds::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ScopeKinds> {
        self.kinds.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn key(&self) -> &ScopeKey {
        &self.key
    }

    pub fn len(&self) -> usize {
        self.lock().ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, name: &str) -> Option<ExceptionKind> {
        let kinds = self.lock();
        kinds.by_name.get(name).map(|&i| kinds.ordered[i].clone())
    }

    /// Registered kinds, ordered by `scope_index`
    pub fn kinds(&self) -> Vec<ExceptionKind> {
        self.lock().ordered.clone()
    }

    pub fn names(&self) -> Vec<String> {
        self.lock()
            .ordered
            .iter()
            .map(|k| k.name().to_string())
            .collect()
    }

    /// Return the kind registered as `name`, creating it on first request
    ///
    /// A new kind takes the next ordinal, which equals the number of kinds
    /// already in the scope.
    pub(crate) fn get_or_define(&self, name: &str, label: Option<&str>) -> Definition {
        let mut kinds = self.lock();
        if let Some(&i) = kinds.by_name.get(name) {
            return Definition::Existing(kinds.ordered[i].clone());
        }

        let index = kinds.ordered.len();
        let kind = ExceptionKind::new(name, label, self.key.clone(), index);
        kinds.ordered.push(kind.clone());
        kinds.by_name.insert(name.to_string(), index);
        Definition::Created(kind)
    }
}

/// All scopes known to a factory
#[derive(Debug, Default)]
pub struct ScopeRegistry {
    scopes: Mutex<HashMap<ScopeKey, Arc<Scope>>>,
}

impl ScopeRegistry {
    /// An empty registry, independent of the process-wide one
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry shared by default factories
    pub fn global() -> Arc<Self> {
        static GLOBAL: OnceLock<Arc<ScopeRegistry>> = OnceLock::new();
        GLOBAL.get_or_init(|| Arc::new(Self::new())).clone()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ScopeKey, Arc<Scope>>> {
        self.scopes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get_or_create_scope(&self, key: &ScopeKey) -> Arc<Scope> {
        self.lock()
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Scope::new(key.clone())))
            .clone()
    }

    pub fn scope(&self, key: &ScopeKey) -> Option<Arc<Scope>> {
        self.lock().get(key).cloned()
    }

    pub fn lookup(&self, key: &ScopeKey, name: &str) -> Option<ExceptionKind> {
        self.scope(key)?.get(name)
    }

    /// Known scope keys, sorted
    pub fn scope_keys(&self) -> Vec<ScopeKey> {
        let mut keys: Vec<ScopeKey> = self.lock().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_is_created_once() {
        let registry = ScopeRegistry::new();
        let key = ScopeKey::from("a.rs");
        let first = registry.get_or_create_scope(&key);
        let second = registry.get_or_create_scope(&key);

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_ordinals_follow_first_request() {
        let registry = ScopeRegistry::new();
        let scope = registry.get_or_create_scope(&ScopeKey::from("a.rs"));

        let a = scope.get_or_define("A", None).into_kind();
        let b = scope.get_or_define("B", None).into_kind();
        let again = scope.get_or_define("A", None);

        assert_eq!(a.scope_index(), 0);
        assert_eq!(b.scope_index(), 1);
        assert!(matches!(again, Definition::Existing(ref k) if k.ptr_eq(&a)));
        assert_eq!(scope.len(), 2);
        assert_eq!(scope.names(), vec!["A", "B"]);
    }

    #[test]
    fn test_lookup() {
        let registry = ScopeRegistry::new();
        let key = ScopeKey::from("a.rs");
        assert!(registry.lookup(&key, "A").is_none());

        let created = registry
            .get_or_create_scope(&key)
            .get_or_define("A", Some("L"))
            .into_kind();
        let found = registry.lookup(&key, "A").unwrap();

        assert!(found.ptr_eq(&created));
        assert_eq!(found.label(), Some("L"));
        assert!(registry.lookup(&ScopeKey::from("b.rs"), "A").is_none());
    }

    #[test]
    fn test_scope_keys_sorted() {
        let registry = ScopeRegistry::new();
        registry.get_or_create_scope(&ScopeKey::from("z.rs"));
        registry.get_or_create_scope(&ScopeKey::from("a.rs"));

        let keys: Vec<String> = registry
            .scope_keys()
            .iter()
            .map(|k| k.to_string())
            .collect();
        assert_eq!(keys, vec!["a.rs", "z.rs"]);
    }

    #[test]
    fn test_concurrent_first_requests_agree() {
        let registry = Arc::new(ScopeRegistry::new());
        let key = ScopeKey::from("race.rs");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                let key = key.clone();
                std::thread::spawn(move || {
                    registry
                        .get_or_create_scope(&key)
                        .get_or_define("Race", None)
                        .into_kind()
                })
            })
            .collect();

        let kinds: Vec<ExceptionKind> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(kinds.iter().all(|k| k.ptr_eq(&kinds[0])));
        assert_eq!(registry.scope(&key).unwrap().len(), 1);
    }
}
