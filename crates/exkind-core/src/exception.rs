//! The exception value every kind produces
//!
//! There is one concrete [`Exception`] type; what distinguishes a
//! `NotFound` from a `Timeout` is the [`ExceptionKind`] it carries. The
//! display message is rendered once, at construction, from the template in
//! effect at that moment.

use std::backtrace::Backtrace;
use std::error::Error;
use std::fmt;
use std::panic::Location;

use exkind_core_types::ScopeKey;
use serde::{Deserialize, Serialize};

use crate::cause::Cause;
use crate::config::Config;
use crate::debug::{self, DebugOptions, DebugRecord, DebugSink};
use crate::encoding::Arg;
use crate::errors::Result;
use crate::kind::ExceptionKind;
use crate::resolver::{parse_stack, CallSite};
use crate::template::{self, render, TemplateValues};

#[derive(Debug, Clone)]
pub struct Exception {
    kind: ExceptionKind,
    raw_message: String,
    message: String,
    cause: Option<Cause>,
    stack: Option<String>,
}

impl Exception {
    pub(crate) fn build(
        kind: ExceptionKind,
        raw_message: String,
        cause: Option<Cause>,
        caller: &Location<'_>,
        config: &Config,
    ) -> Self {
        let site = CallSite::from_location(caller);
        let message = {
            let values = TemplateValues::new()
                .with(template::LABEL, kind.label())
                .with(template::ERROR, Some(kind.name()))
                .with(template::MESSAGE, Some(raw_message.as_str()))
                .with(template::FILE, Some(site.file.as_str()));
            render(&config.template, &values)
        };
        let stack = stack_text(&message, &site, config.capture_backtrace);

        Self {
            kind,
            raw_message,
            message,
            cause,
            stack: Some(stack),
        }
    }

    pub(crate) fn overwrite_stack(&mut self, stack: String) {
        self.stack = Some(stack);
    }

    pub fn kind(&self) -> &ExceptionKind {
        &self.kind
    }

    pub fn name(&self) -> &str {
        self.kind.name()
    }

    pub fn label(&self) -> Option<&str> {
        self.kind.label()
    }

    pub fn scope_key(&self) -> &ScopeKey {
        self.kind.scope_key()
    }

    pub fn scope_index(&self) -> usize {
        self.kind.scope_index()
    }

    pub fn code(&self) -> Option<i64> {
        self.kind.code()
    }

    /// Rendered display message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Caller-supplied message before templating
    pub fn raw_message(&self) -> &str {
        &self.raw_message
    }

    pub fn cause(&self) -> Option<&Cause> {
        self.cause.as_ref()
    }

    /// Opaque trace text; `None` once cleared
    pub fn stack(&self) -> Option<&str> {
        self.stack.as_deref()
    }

    pub fn clear_stack(&mut self) {
        self.stack = None;
    }

    /// Construction call site, parsed from the frames of the stack text
    ///
    /// The leading message lines are skipped, so a message that mentions a
    /// `path:line:col` is never taken for a frame.
    pub fn call_site(&self) -> Option<CallSite> {
        let stack = self.stack.as_deref()?;
        let frames = stack.strip_prefix(self.message.as_str()).unwrap_or(stack);
        parse_stack(frames, None)
    }

    pub fn file_name(&self) -> Option<String> {
        self.call_site().map(|site| site.file)
    }

    /// True when `value` is an exception of any kind
    pub fn is(value: &(dyn Error + 'static)) -> bool {
        value.downcast_ref::<Exception>().is_some()
    }

    pub fn downcast<'a>(value: &'a (dyn Error + 'static)) -> Option<&'a Exception> {
        value.downcast_ref::<Exception>()
    }

    /// Normalise any value into an exception of the base kind
    #[track_caller]
    pub fn cast(value: impl Into<Arg>) -> Exception {
        ExceptionKind::base().cast(value)
    }

    /// Rebuild a snapshot as an exception of the base kind
    #[track_caller]
    pub fn restore(snapshot: impl Into<Snapshot>) -> Exception {
        ExceptionKind::base().restore(snapshot)
    }

    /// Structural projection used for reconstruction
    pub fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            name: self.name().to_string(),
            message: self.message.clone(),
            raw_message: Some(self.raw_message.clone()),
            label: self.label().map(str::to_string),
            scope_index: self.scope_index(),
            stack: self.stack.clone(),
            cause: self.cause.clone(),
            file_name: self.file_name(),
        }
    }

    /// Rebuild this exception through its snapshot
    ///
    /// Unlike `Clone`, the copy is constructed afresh by its kind; only the
    /// stack is carried over.
    #[track_caller]
    pub fn replicate(&self) -> Exception {
        self.kind.restore(self.to_snapshot())
    }

    /// Dump this exception to the process debug sink
    pub fn debug(&self, options: DebugOptions) -> &Self {
        let sink = debug::debug_sink();
        self.debug_to(sink.as_ref(), options)
    }

    /// Dump this exception to `sink`
    pub fn debug_to(&self, sink: &dyn DebugSink, options: DebugOptions) -> &Self {
        sink.emit(&DebugRecord::from_exception(self, options));
        self
    }
}

fn stack_text(message: &str, site: &CallSite, capture_backtrace: bool) -> String {
    let mut stack = format!("{}\n    at {}", message, site);
    if capture_backtrace {
        stack.push('\n');
        stack.push_str(&Backtrace::force_capture().to_string());
    }
    stack
}

impl PartialEq for Exception {
    fn eq(&self, other: &Self) -> bool {
        self.kind.ptr_eq(&other.kind)
            && self.message == other.message
            && self.raw_message == other.raw_message
            && self.cause == other.cause
    }
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for Exception {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause.as_ref().map(Cause::as_error)
    }
}

/// Serializable projection of an exception
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub name: String,
    pub message: String,
    /// Absent in hand-written snapshots; see [`Snapshot::resolved_raw_message`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub scope_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<Cause>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

impl Snapshot {
    /// The raw message to rebuild from
    ///
    /// Without a stored raw message, the `[label] ` and `Name: ` blocks of
    /// the default template are stripped from `message`.
    pub fn resolved_raw_message(&self) -> String {
        if let Some(raw) = &self.raw_message {
            return raw.clone();
        }

        let mut rest = self.message.as_str();
        if let Some(label) = &self.label {
            let prefix = format!("[{}] ", label);
            if let Some(stripped) = rest.strip_prefix(prefix.as_str()) {
                rest = stripped;
            }
        }

        if let Some(after_name) = rest.strip_prefix(self.name.as_str()) {
            if after_name.is_empty() {
                return String::new();
            }
            if let Some(body) = after_name.strip_prefix(": ") {
                return body.to_string();
            }
        }

        rest.to_string()
    }

    /// # Errors
    ///
    /// Returns `Serialization` if JSON encoding fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// # Errors
    ///
    /// Returns `Serialization` for malformed JSON or missing fields.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

impl From<&Exception> for Snapshot {
    fn from(e: &Exception) -> Self {
        e.to_snapshot()
    }
}

impl From<Exception> for Snapshot {
    fn from(e: Exception) -> Self {
        e.to_snapshot()
    }
}
