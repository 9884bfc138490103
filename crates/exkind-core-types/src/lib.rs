//! Core types shared across the exkind facilities
//!
//! This crate provides foundational types used by both the exception
//! factory and the logging facility:
//!
//! - **Scope keys**: `ScopeKey`, the registry bucket identifier
//! - **Schema constants**: Canonical field keys and event names

pub mod schema;
pub mod scope;

pub use scope::{ScopeKey, GLOBAL_SCOPE};
