#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::sync::Arc;

use exkind_core::{
    define, define_labeled, Arg, BacktraceResolver, EnumOptions, ExceptionEnum, ExceptionKind,
    FixedLocation, Node, ScopeKey, ScopeRegistry, StackTextResolver,
};

#[test]
fn test_distinct_names_get_increasing_ordinals() {
    let errors = common::isolated(Some("L"));
    let names = ["NotFound", "Timeout", "Conflict", "Denied"];

    for (i, name) in names.iter().enumerate() {
        assert_eq!(errors.kind(name).scope_index(), i);
    }
}

#[test]
fn test_repeat_request_is_identity_stable() {
    let errors = common::isolated(None);
    let first = errors.kind("NotFound");
    errors.kind("Timeout");
    errors.kind("Conflict");
    let again = errors.kind("NotFound");

    assert!(first.ptr_eq(&again));
    assert_eq!(again.scope_index(), 0);
    assert_eq!(errors.registry().scope(first.scope_key()).unwrap().len(), 3);
}

#[test]
fn test_collision_does_not_consume_ordinal() {
    let (one, two) = common::shared_pair(Some("L"));
    let a = one.kind("A");
    let a_again = two.kind("A");
    let b = two.kind("B");

    assert!(a.ptr_eq(&a_again));
    assert_eq!(b.scope_index(), 1);
}

#[test]
fn test_labels_separate_scopes() {
    let registry = Arc::new(ScopeRegistry::new());
    let build = |label: &str| {
        ExceptionEnum::builder()
            .registry(registry.clone())
            .resolver(FixedLocation::new("tests/api.rs"))
            .label(label)
            .build()
    };
    let http = build("http");
    let db = build("db");

    let a = http.kind("Failure");
    let b = db.kind("Failure");

    assert!(!a.ptr_eq(&b));
    assert_eq!(a.scope_index(), 0);
    assert_eq!(b.scope_index(), 0);
    assert_eq!(a.scope_key().as_str(), "http:tests/api.rs");
    assert_eq!(b.scope_key().as_str(), "db:tests/api.rs");
    assert_eq!(registry.scope_keys().len(), 2);
}

#[test]
fn test_destructuring_never_fails() {
    let errors = common::isolated(None);
    let [a, b, a_again] = errors.kinds(["A", "B", "A"]);

    assert!(a.ptr_eq(&a_again));
    assert_eq!(b.scope_index(), 1);
    assert_eq!(errors.scope().names(), vec!["A", "B"]);
}

#[test]
fn test_default_scope_is_call_site_file() {
    let errors = define();
    let kind = errors.kind("FactoryTestsCallSite");

    assert_eq!(kind.scope_key().as_str(), "tests/factory_tests.rs");
    assert_eq!(errors.scope_key().as_str(), "tests/factory_tests.rs");
}

#[test]
fn test_labeled_call_site_scope() {
    let errors = define_labeled("api");
    let kind = errors.kind("FactoryTestsLabeled");

    assert_eq!(kind.scope_key().as_str(), "api:tests/factory_tests.rs");
    assert_eq!(kind.label(), Some("api"));
}

#[test]
fn test_enum_options_label() {
    let errors = ExceptionEnum::new(EnumOptions::labeled("opts"));
    assert_eq!(errors.label(), Some("opts"));
    assert_eq!(errors.scope().label(), Some("opts"));
}

#[test]
fn test_unresolved_call_site_degrades_to_global() {
    let errors = ExceptionEnum::builder()
        .registry(Arc::new(ScopeRegistry::new()))
        .resolver(FixedLocation::unresolved())
        .build();
    let kind = errors.kind("Lost");
    assert_eq!(kind.scope_key(), &ScopeKey::global());

    let labeled = ExceptionEnum::builder()
        .registry(Arc::new(ScopeRegistry::new()))
        .resolver(StackTextResolver::new("Error\n    at <anonymous>"))
        .label("L")
        .build();
    assert_eq!(labeled.kind("Lost").scope_key().as_str(), "L:global");
}

#[test]
fn test_stack_text_resolver_takes_first_frame() {
    let text = "Error: x\n    at handler (/srv/app/routes/user.rs:10:5)\n    at main (/srv/app/main.rs:1:1)";
    let errors = ExceptionEnum::builder()
        .registry(Arc::new(ScopeRegistry::new()))
        .resolver(StackTextResolver::new(text))
        .build();

    let key = errors.kind("X").scope_key().clone();
    assert_eq!(key.as_str(), "/srv/app/routes/user.rs");
}

#[test]
fn test_backtrace_resolver_never_fails() {
    let errors = ExceptionEnum::builder()
        .registry(Arc::new(ScopeRegistry::new()))
        .resolver(BacktraceResolver)
        .build();
    let key = errors.kind("Traced").scope_key().clone();

    assert!(key.is_global() || key.as_str().ends_with(".rs"), "{key}");
}

#[test]
fn test_numeric_names_have_codes() {
    let errors = common::isolated(None);
    let [not_found, teapot, named] = errors.kinds(["404", "418", "Named"]);

    assert_eq!(not_found.code(), Some(404));
    assert_eq!(teapot.code(), Some(418));
    assert_eq!(named.code(), None);
    assert_eq!(not_found.create("missing").code(), Some(404));
}

#[test]
fn test_empty_message_drops_message_block() {
    let errors = common::isolated(Some("L"));
    let e = errors.kind("EmptyError").new_empty();

    assert_eq!(e.message(), "[L] EmptyError");
    assert_eq!(e.raw_message(), "");
}

#[test]
fn test_unlabeled_message() {
    let errors = common::isolated(None);
    let e = errors.kind("X").create("boom");
    assert_eq!(e.message(), "X: boom");
}

#[test]
fn test_circular_argument_keeps_name() {
    let errors = common::isolated(Some("L"));
    let node = Node::new();
    node.set("id", 1);
    node.set("parent", node.clone());

    let e = errors
        .kind("CycleError")
        .new_exception(vec![Arg::from("bad"), Arg::from(node)]);
    assert!(e.message().contains("CycleError"));
    assert_eq!(e.raw_message(), "bad [object]");
}

#[test]
fn test_is_and_match() {
    let errors = common::isolated(None);
    let [a, b] = errors.kinds(["A", "B"]);
    let e = a.create("x");

    assert!(a.is(&e));
    assert!(!b.is(&e));
    assert!(ExceptionKind::base().is(&e));
    assert_eq!(a.match_with(&e, |e| e.raw_message().to_string()), Some("x".to_string()));
    assert_eq!(b.match_with(&e, |_| ()), None);
}

#[test]
fn test_throw_returns_err() {
    let errors = common::isolated(None);
    let denied = errors.kind("Denied");

    let result: Result<u8, _> = denied.throw(["nope"]);
    let err = result.unwrap_err();
    assert!(denied.is(&err));
    assert_eq!(err.message(), "Denied: nope");
}

#[test]
fn test_exception_macro_and_early_return() {
    fn guarded(errors: &ExceptionEnum, n: i64) -> Result<i64, exkind_core::Exception> {
        if n > 10 {
            exkind_core::throw!(errors.kind("TooLarge"), "value", n);
        }
        Ok(n)
    }

    let errors = common::isolated(None);
    assert_eq!(guarded(&errors, 3).unwrap(), 3);
    assert_eq!(guarded(&errors, 11).unwrap_err().message(), "TooLarge: value 11");

    let e = exkind_core::exception!(errors.kind("Bare"));
    assert_eq!(e.message(), "Bare");
}

#[test]
fn test_stack_points_at_construction_site() {
    let errors = common::isolated(None);
    let e = errors.kind("Sited").create("x");

    let site = e.call_site().unwrap();
    assert!(site.file.ends_with("factory_tests.rs"), "{}", site.file);
    assert!(e.stack().unwrap().starts_with("Sited: x\n"));
}
