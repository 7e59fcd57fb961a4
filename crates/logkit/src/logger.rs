//! Logger handle and the core it writes through

use crate::config::LoggerConfig;
use crate::error::Result;
use crate::format::{push_pair, short_caller, ConsoleFormat, STACKTRACE_KEY};
use crate::level::{AtomicLevel, Severity, HANDLE_TARGET};
use crate::sink::{Clock, EventTime, RotatingFile, SinkOptions};
use std::fmt;
use std::io::{self, Write};
use std::panic::Location;
use std::sync::Arc;
use std::time::Duration;
use tracing::{dispatcher, Dispatch, Level};
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::layer::{Layer, SubscriberExt};

/// Key/value pairs attached to an entry
pub type Fields<'a> = [(&'a str, &'a dyn fmt::Display)];

/// Cheaply clonable, thread-safe handle for emitting leveled entries.
///
/// Clones share everything. [`Logger::named`] and [`Logger::with`] derive new
/// handles that still share the sink, the core and the threshold.
#[derive(Clone)]
pub struct Logger {
    inner: Arc<LoggerInner>,
}

struct LoggerInner {
    dispatch: Dispatch,
    level: AtomicLevel,
    sink: Arc<RotatingFile>,
    name: String,
    /// Constant fields, already rendered
    context: String,
    development: bool,
}

/// Builder for a [`Logger`] with knobs beyond [`LoggerConfig`]
#[derive(Debug, Clone)]
pub struct LoggerBuilder {
    config: LoggerConfig,
    development: bool,
    sink: SinkOptions,
}

impl LoggerBuilder {
    /// In development mode `dpanic` entries panic after being written (default: on)
    pub fn development(mut self, development: bool) -> Self {
        self.development = development;
        self
    }

    /// Retention window for dated files
    pub fn max_age(mut self, max_age: Duration) -> Self {
        self.sink.max_age = max_age;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.sink.clock = clock;
        self
    }

    /// Open the sink and assemble the core.
    ///
    /// Two pipelines share the sink: one accepts every level, the other only
    /// warn and above, so warn+ entries are written twice. Both sit behind the
    /// shared threshold. The returned handle carries `namespace` and
    /// `project` as constant fields.
    pub fn build(self) -> Result<Logger> {
        let LoggerBuilder {
            config,
            development,
            sink: options,
        } = self;

        let clock = options.clock.clone();
        let sink = Arc::new(RotatingFile::new(
            &config.output_dir,
            &config.filename,
            options,
        )?);
        let level = AtomicLevel::new(config.severity());

        let every_level = tracing_subscriber::fmt::layer()
            .event_format(ConsoleFormat::new(clock.clone()))
            .with_writer(sink.clone())
            .with_filter(filter_fn(|_| true));
        let warn_and_above = tracing_subscriber::fmt::layer()
            .event_format(ConsoleFormat::new(clock.clone()))
            .with_writer(sink.clone())
            .with_filter(filter_fn(|metadata| *metadata.level() <= Level::WARN));

        let subscriber = tracing_subscriber::registry()
            .with(level.clone())
            .with(EventTime::stamp(clock))
            .with(every_level)
            .with(warn_and_above)
            .with(EventTime::clear());

        let root = Logger {
            inner: Arc::new(LoggerInner {
                dispatch: Dispatch::new(subscriber),
                level,
                sink,
                name: String::new(),
                context: String::new(),
                development,
            }),
        };

        Ok(root.with(&[
            ("namespace", &config.namespace),
            ("project", &config.project),
        ]))
    }
}

impl Logger {
    /// Build a logger with default options
    pub fn build(config: &LoggerConfig) -> Result<Self> {
        Self::builder(config.clone()).build()
    }

    pub fn builder(config: LoggerConfig) -> LoggerBuilder {
        LoggerBuilder {
            config,
            development: true,
            sink: SinkOptions::default(),
        }
    }

    /// Whether two handles are the same instance
    pub fn ptr_eq(a: &Logger, b: &Logger) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    /// Derive a handle whose name gets `name` appended (`parent.child`)
    pub fn named(&self, name: &str) -> Logger {
        let name = match (self.inner.name.is_empty(), name.is_empty()) {
            (_, true) => self.inner.name.clone(),
            (true, false) => name.to_string(),
            (false, false) => format!("{}.{}", self.inner.name, name),
        };
        self.derive(name, self.inner.context.clone())
    }

    /// Derive a handle that adds `fields` to every entry
    pub fn with(&self, fields: &Fields<'_>) -> Logger {
        let mut context = self.inner.context.clone();
        for (key, value) in fields {
            push_pair(&mut context, key, &value.to_string());
        }
        self.derive(self.inner.name.clone(), context)
    }

    fn derive(&self, name: String, context: String) -> Logger {
        Logger {
            inner: Arc::new(LoggerInner {
                dispatch: self.inner.dispatch.clone(),
                level: self.inner.level.clone(),
                sink: self.inner.sink.clone(),
                name,
                context,
                development: self.inner.development,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn level(&self) -> Severity {
        self.inner.level.get()
    }

    /// Change the threshold for this logger and every handle sharing its core
    pub fn set_level(&self, level: Severity) {
        self.inner.level.set(level);
    }

    pub fn atomic_level(&self) -> &AtomicLevel {
        &self.inner.level
    }

    pub fn enabled(&self, severity: Severity) -> bool {
        self.inner.level.allows(severity)
    }

    pub fn sink(&self) -> &RotatingFile {
        &self.inner.sink
    }

    /// The tracing dispatcher behind this handle
    pub fn dispatch(&self) -> &Dispatch {
        &self.inner.dispatch
    }

    /// Run `f` with this logger as the current tracing dispatcher, so plain
    /// `tracing` macros inside it reach the same file.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        dispatcher::with_default(&self.inner.dispatch, f)
    }

    /// Flush buffered output
    pub fn sync(&self) -> io::Result<()> {
        (&*self.inner.sink).flush()
    }

    #[track_caller]
    pub fn debug(&self, msg: impl fmt::Display) {
        self.log(Severity::Debug, &msg, &[]);
    }

    #[track_caller]
    pub fn info(&self, msg: impl fmt::Display) {
        self.log(Severity::Info, &msg, &[]);
    }

    #[track_caller]
    pub fn warn(&self, msg: impl fmt::Display) {
        self.log(Severity::Warn, &msg, &[]);
    }

    #[track_caller]
    pub fn error(&self, msg: impl fmt::Display) {
        self.log(Severity::Error, &msg, &[]);
    }

    /// Logs, then panics in development mode
    #[track_caller]
    pub fn dpanic(&self, msg: impl fmt::Display) {
        self.log(Severity::DPanic, &msg, &[]);
    }

    /// Logs, then panics
    #[track_caller]
    pub fn panic(&self, msg: impl fmt::Display) {
        self.log(Severity::Panic, &msg, &[]);
    }

    /// Logs, then exits the process with status 1
    #[track_caller]
    pub fn fatal(&self, msg: impl fmt::Display) {
        self.log(Severity::Fatal, &msg, &[]);
    }

    #[track_caller]
    pub fn debugw(&self, msg: impl fmt::Display, fields: &Fields<'_>) {
        self.log(Severity::Debug, &msg, fields);
    }

    #[track_caller]
    pub fn infow(&self, msg: impl fmt::Display, fields: &Fields<'_>) {
        self.log(Severity::Info, &msg, fields);
    }

    #[track_caller]
    pub fn warnw(&self, msg: impl fmt::Display, fields: &Fields<'_>) {
        self.log(Severity::Warn, &msg, fields);
    }

    #[track_caller]
    pub fn errorw(&self, msg: impl fmt::Display, fields: &Fields<'_>) {
        self.log(Severity::Error, &msg, fields);
    }

    #[track_caller]
    pub fn dpanicw(&self, msg: impl fmt::Display, fields: &Fields<'_>) {
        self.log(Severity::DPanic, &msg, fields);
    }

    #[track_caller]
    pub fn panicw(&self, msg: impl fmt::Display, fields: &Fields<'_>) {
        self.log(Severity::Panic, &msg, fields);
    }

    #[track_caller]
    pub fn fatalw(&self, msg: impl fmt::Display, fields: &Fields<'_>) {
        self.log(Severity::Fatal, &msg, fields);
    }

    /// Emit at `severity`, then apply the severity's terminal behaviour
    /// (which happens even when the threshold drops the entry).
    #[track_caller]
    pub fn log(&self, severity: Severity, msg: &dyn fmt::Display, fields: &Fields<'_>) {
        let caller = Location::caller();
        if self.enabled(severity) {
            self.emit(severity, caller, msg, fields);
        }
        self.terminate(severity, msg);
    }

    fn emit(
        &self,
        severity: Severity,
        caller: &Location<'_>,
        msg: &dyn fmt::Display,
        fields: &Fields<'_>,
    ) {
        let caller = short_caller(caller.file(), Some(caller.line()));
        let mut context = self.inner.context.clone();
        let mut stacktrace = None;
        for (key, value) in fields {
            if *key == STACKTRACE_KEY {
                stacktrace = Some(value.to_string());
            } else {
                push_pair(&mut context, key, &value.to_string());
            }
        }
        let name = self.inner.name.as_str();

        macro_rules! emit_at {
            ($level:expr) => {
                tracing::event!(
                    target: HANDLE_TARGET,
                    $level,
                    logkit.severity = severity.as_str(),
                    logkit.caller = caller.as_str(),
                    logkit.name = name,
                    logkit.fields = context.as_str(),
                    stacktrace = stacktrace.as_deref(),
                    "{}",
                    msg
                )
            };
        }

        self.in_scope(|| match severity.tracing_level() {
            Level::DEBUG => emit_at!(Level::DEBUG),
            Level::INFO => emit_at!(Level::INFO),
            Level::WARN => emit_at!(Level::WARN),
            _ => emit_at!(Level::ERROR),
        });
    }

    fn terminate(&self, severity: Severity, msg: &dyn fmt::Display) {
        match severity {
            Severity::DPanic if self.inner.development => panic!("{}", msg),
            Severity::Panic => panic!("{}", msg),
            Severity::Fatal => {
                let _ = self.sync();
                std::process::exit(1);
            }
            _ => {}
        }
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.inner.name)
            .field("level", &self.inner.level.get())
            .field("sink", &self.inner.sink)
            .finish()
    }
}
