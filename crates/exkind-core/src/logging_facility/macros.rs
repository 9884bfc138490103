//! Canonical logging macros
//!
//! Every event carries `component`, `op` and `event`; the remaining fields
//! are passed through to `tracing`.

/// Log that a kind was created and registered
///
/// ```
/// # use exkind_core::log_kind_created;
/// log_kind_created!("kind", kind = "NotFound", scope_index = 0usize);
/// ```
#[macro_export]
macro_rules! log_kind_created {
    ($op:expr, $($field:tt)*) => {
        tracing::debug!(
            component = module_path!(),
            op = $op,
            event = exkind_core_types::schema::EVENT_KIND_CREATED,
            $($field)*
        );
    };
}

/// Log that a request resolved to an already-registered kind
///
/// ```
/// # use exkind_core::log_kind_collision;
/// log_kind_collision!("kind", kind = "NotFound", scope_key = "global");
/// ```
#[macro_export]
macro_rules! log_kind_collision {
    ($op:expr, $($field:tt)*) => {
        tracing::warn!(
            component = module_path!(),
            op = $op,
            event = exkind_core_types::schema::EVENT_KIND_COLLISION,
            $($field)*
        );
    };
}

/// Log that an operation fell back to a degraded path
///
/// ```
/// # use exkind_core::log_degraded;
/// log_degraded!("encode_args");
/// log_degraded!("encode_args", reason = "cycle");
/// ```
#[macro_export]
macro_rules! log_degraded {
    ($op:expr) => {
        tracing::warn!(
            component = module_path!(),
            op = $op,
            event = exkind_core_types::schema::EVENT_DEGRADED,
        );
    };
    ($op:expr, $($field:tt)*) => {
        tracing::warn!(
            component = module_path!(),
            op = $op,
            event = exkind_core_types::schema::EVENT_DEGRADED,
            $($field)*
        );
    };
}
