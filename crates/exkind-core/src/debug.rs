//! Diagnostic dumps of exceptions
//!
//! `Exception::debug` hands a [`DebugRecord`] to the process debug sink and
//! returns the exception for chaining. The default sink writes a structured
//! `tracing` event; callers may install their own.

use std::error::Error;
use std::sync::{Arc, Mutex, OnceLock, PoisonError, RwLock};

use serde::Serialize;

use crate::exception::Exception;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DebugOptions {
    /// Include stack text and the cause chain
    pub verbose: bool,
}

impl DebugOptions {
    pub fn verbose() -> Self {
        Self { verbose: true }
    }
}

/// What a sink receives for one dump
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DebugRecord {
    pub name: String,
    pub label: Option<String>,
    pub scope_key: String,
    pub scope_index: usize,
    pub code: Option<i64>,
    pub message: String,
    pub stack: Option<String>,
    /// Messages along `source()`, nearest first; empty unless verbose
    pub causes: Vec<String>,
}

impl DebugRecord {
    pub fn from_exception(exception: &Exception, options: DebugOptions) -> Self {
        let mut causes = Vec::new();
        let mut stack = None;

        if options.verbose {
            stack = exception.stack().map(str::to_string);
            let mut next = exception.source();
            while let Some(err) = next {
                causes.push(err.to_string());
                next = err.source();
            }
        }

        Self {
            name: exception.name().to_string(),
            label: exception.label().map(str::to_string),
            scope_key: exception.scope_key().to_string(),
            scope_index: exception.scope_index(),
            code: exception.code(),
            message: exception.message().to_string(),
            stack,
            causes,
        }
    }
}

/// Destination of debug dumps
pub trait DebugSink: Send + Sync {
    fn emit(&self, record: &DebugRecord);
}

/// Writes each record as a `tracing` event
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DebugSink for TracingSink {
    fn emit(&self, record: &DebugRecord) {
        tracing::info!(
            component = module_path!(),
            op = "debug",
            event = exkind_core_types::schema::EVENT_DEBUG_DUMP,
            kind = record.name.as_str(),
            scope_key = record.scope_key.as_str(),
            scope_index = record.scope_index,
            label = ?record.label,
            code = ?record.code,
            message = record.message.as_str(),
            stack = ?record.stack,
            causes = ?record.causes,
        );
    }
}

/// Keeps records in memory
#[derive(Debug, Default)]
pub struct CollectingSink {
    records: Mutex<Vec<DebugRecord>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<DebugRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl DebugSink for CollectingSink {
    fn emit(&self, record: &DebugRecord) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
    }
}

static SINK: OnceLock<RwLock<Arc<dyn DebugSink>>> = OnceLock::new();

fn cell() -> &'static RwLock<Arc<dyn DebugSink>> {
    SINK.get_or_init(|| RwLock::new(Arc::new(TracingSink)))
}

/// Install the process debug sink
pub fn set_debug_sink(sink: Arc<dyn DebugSink>) {
    *cell().write().unwrap_or_else(PoisonError::into_inner) = sink;
}

/// The sink `Exception::debug` writes to
pub fn debug_sink() -> Arc<dyn DebugSink> {
    cell()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}
