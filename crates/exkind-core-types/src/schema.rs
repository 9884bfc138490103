//! Canonical schema constants for structured logging
//!
//! These constants keep field names consistent between the code that emits
//! events and the tests that capture them.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";

// Kind identity
pub const FIELD_SCOPE_KEY: &str = "scope_key";
pub const FIELD_KIND: &str = "kind";
pub const FIELD_SCOPE_INDEX: &str = "scope_index";
pub const FIELD_LABEL: &str = "label";

// Degradation details
pub const FIELD_REASON: &str = "reason";

// Canonical event names
pub const EVENT_KIND_CREATED: &str = "kind_created";
pub const EVENT_KIND_COLLISION: &str = "kind_collision";
pub const EVENT_DEGRADED: &str = "degraded";
pub const EVENT_DEBUG_DUMP: &str = "debug_dump";
