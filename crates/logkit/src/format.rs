//! Console-style line encoder
//!
//! One line per entry:
//!
//! ```text
//! time=2024-03-09 12:00:00 level=error log=api.auth file=src/handler.rs:42 msg=token expired namespace=svc project=demo
//! ```

use crate::level::Severity;
use crate::sink::{event_now, Clock};
use std::fmt::{self, Write as _};
use std::sync::Arc;
use std::time::Duration;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::{self, FormatEvent, FormatFields};
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::registry::LookupSpan;

pub const TIME_KEY: &str = "time";
pub const LEVEL_KEY: &str = "level";
pub const NAME_KEY: &str = "log";
pub const CALLER_KEY: &str = "file";
pub const MESSAGE_KEY: &str = "msg";
pub const STACKTRACE_KEY: &str = "stacktrace";

pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// Fields a `Logger` handle attaches to its events; never printed as-is.
pub(crate) const SEVERITY_FIELD: &str = "logkit.severity";
pub(crate) const CALLER_FIELD: &str = "logkit.caller";
pub(crate) const NAME_FIELD: &str = "logkit.name";
pub(crate) const CONTEXT_FIELD: &str = "logkit.fields";

/// Duration rendered as whole milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Millis(pub Duration);

impl fmt::Display for Millis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.as_millis())
    }
}

/// `FormatEvent` producing the `key=value` console layout
#[derive(Debug, Clone)]
pub struct ConsoleFormat {
    clock: Arc<dyn Clock>,
}

impl ConsoleFormat {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

impl<S, N> FormatEvent<S, N> for ConsoleFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();
        let mut entry = EntryVisitor::default();
        event.record(&mut entry);

        let level = entry
            .severity
            .take()
            .unwrap_or_else(|| Severity::from_tracing(metadata.level()).as_str().to_string());
        let caller = entry
            .caller
            .take()
            .or_else(|| metadata.file().map(|file| short_caller(file, metadata.line())));

        write!(writer, "{}={}", TIME_KEY, event_now(&*self.clock).format(TIME_FORMAT))?;
        write!(writer, " {}={}", LEVEL_KEY, level)?;
        if let Some(name) = entry.name.as_deref().filter(|n| !n.is_empty()) {
            write!(writer, " {}={}", NAME_KEY, name)?;
        }
        if let Some(caller) = caller {
            write!(writer, " {}={}", CALLER_KEY, caller)?;
        }
        write!(writer, " {}={}", MESSAGE_KEY, entry.message)?;

        if let Some(context) = entry.context.as_deref().filter(|c| !c.is_empty()) {
            write!(writer, " {}", context)?;
        }
        let mut fields = String::new();
        for (key, value) in &entry.fields {
            push_pair(&mut fields, key, value);
        }
        if !fields.is_empty() {
            write!(writer, " {}", fields)?;
        }
        if let Some(stacktrace) = entry.stacktrace {
            write!(writer, " {}={}", STACKTRACE_KEY, stacktrace)?;
        }

        writeln!(writer)
    }
}

/// Shortened caller: the file's parent directory, file name and line
pub fn short_caller(file: &str, line: Option<u32>) -> String {
    let mut parts = file.rsplit(['/', '\\']);
    let name = parts.next().unwrap_or(file);
    let short = match parts.next() {
        Some(dir) if !dir.is_empty() => format!("{}/{}", dir, name),
        _ => name.to_string(),
    };
    match line {
        Some(line) => format!("{}:{}", short, line),
        None => short,
    }
}

/// Append ` key=value` (space-separated) to `out`, quoting values that would
/// break the line apart.
pub(crate) fn push_pair(out: &mut String, key: &str, value: &str) {
    if !out.is_empty() {
        out.push(' ');
    }
    let needs_quotes = value.is_empty()
        || value
            .chars()
            .any(|c| c.is_whitespace() || c == '=' || c == '"');
    if needs_quotes {
        let _ = write!(out, "{}={:?}", key, value);
    } else {
        let _ = write!(out, "{}={}", key, value);
    }
}

#[derive(Default)]
struct EntryVisitor {
    message: String,
    severity: Option<String>,
    caller: Option<String>,
    name: Option<String>,
    context: Option<String>,
    stacktrace: Option<String>,
    fields: Vec<(&'static str, String)>,
}

impl EntryVisitor {
    fn put(&mut self, field: &Field, value: String) {
        match field.name() {
            "message" => self.message = value,
            SEVERITY_FIELD => self.severity = Some(value),
            CALLER_FIELD => self.caller = Some(value),
            NAME_FIELD => self.name = Some(value),
            CONTEXT_FIELD => self.context = Some(value),
            STACKTRACE_KEY => self.stacktrace = Some(value),
            name => self.fields.push((name, value)),
        }
    }
}

impl Visit for EntryVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.put(field, format!("{:?}", value));
    }
}
