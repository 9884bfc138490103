//! Structured logging facility for exkind
//!
//! - Single initialization point via `init(profile)`
//! - Structured macros for kind creation, collisions and degraded paths
//! - Test capture mode for deterministic assertions
//!
//! # Usage
//!
//! ```rust
//! use exkind_core::logging_facility::{init, Profile};
//!
//! init(Profile::Development);
//! ```
//!
//! # Logging Macros
//!
//! - `log_kind_created!(op, kind = .., ...)` - a kind was registered (debug)
//! - `log_kind_collision!(op, kind = .., ...)` - an existing kind was returned (warn)
//! - `log_degraded!(op, ...)` - a fallback path was taken (warn)

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
