use std::sync::Arc;

use exkind_core::{ExceptionEnum, FixedLocation, ScopeRegistry};

/// A factory over a fresh registry whose scope is always `location`
#[allow(dead_code)]
pub fn isolated_at(label: Option<&str>, location: &str) -> ExceptionEnum {
    let mut builder = ExceptionEnum::builder()
        .registry(Arc::new(ScopeRegistry::new()))
        .resolver(FixedLocation::new(location));
    if let Some(label) = label {
        builder = builder.label(label);
    }
    builder.build()
}

/// A factory over a fresh registry, scoped at `tests/api.rs`
#[allow(dead_code)]
pub fn isolated(label: Option<&str>) -> ExceptionEnum {
    isolated_at(label, "tests/api.rs")
}

/// Two factories sharing one fresh registry and one scope
#[allow(dead_code)]
pub fn shared_pair(label: Option<&str>) -> (ExceptionEnum, ExceptionEnum) {
    let registry = Arc::new(ScopeRegistry::new());
    let build = || {
        let mut builder = ExceptionEnum::builder()
            .registry(registry.clone())
            .resolver(FixedLocation::new("tests/shared.rs"));
        if let Some(label) = label {
            builder = builder.label(label);
        }
        builder.build()
    };
    (build(), build())
}
