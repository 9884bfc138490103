//! Dynamic exception kinds
//!
//! Kinds are declared on demand by name through an [`ExceptionEnum`]. Each
//! kind lives in a scope derived from an optional label and the call site
//! that first requested it, and carries a stable ordinal within that scope.
//! Every kind produces the same concrete [`Exception`] type, whose message is
//! rendered from the process-wide template at construction.
//!
//! ```
//! use exkind_core::{define_labeled, Exception};
//!
//! let errors = define_labeled("api");
//! let timeout = errors.kind("Timeout");
//!
//! let e = timeout.create("after 30s");
//! assert_eq!(e.message(), "[api] Timeout: after 30s");
//! assert!(timeout.is(&e));
//! assert!(Exception::is(&e));
//!
//! let copy = timeout.restore(e.to_snapshot());
//! assert_eq!(copy.message(), e.message());
//! ```

pub mod cause;
pub mod config;
pub mod debug;
pub mod encoding;
pub mod errors;
pub mod exception;
pub mod factory;
pub mod kind;
pub mod logging_facility;
mod macros;
pub mod registry;
pub mod resolver;
pub mod template;

pub use cause::{Cause, ObjectCause};
pub use config::{configure, Config, ConfigOverride, Encoding};
pub use debug::{set_debug_sink, CollectingSink, DebugOptions, DebugRecord, DebugSink};
pub use encoding::{Arg, Node};
pub use errors::{ExkindError, Result};
pub use exception::{Exception, Snapshot};
pub use factory::{define, define_labeled, EnumOptions, ExceptionEnum, LocalScope};
pub use kind::ExceptionKind;
pub use registry::{Scope, ScopeRegistry};
pub use resolver::{
    BacktraceResolver, CallSite, CallSiteResolver, CallerLocation, FixedLocation,
    StackTextResolver,
};

pub use exkind_core_types::{ScopeKey, GLOBAL_SCOPE};
