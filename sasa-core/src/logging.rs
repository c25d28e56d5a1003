//! Run logger: one record format, two sinks (log file and console).
//!
//! Records render as `[LEVEL | file.rs:line] 2024-01-05 14:30:02,123: message`.
//! `tracing` has no level above ERROR, so [`critical!`](crate::critical) tags an
//! ERROR event with `critical = true` and the formatter prints it as `CRITICAL`.

use chrono::Local;
use std::fmt::{self, Write as _};
use std::path::{Path, PathBuf};
use tracing::field::{Field, Visit};
use tracing::{Dispatch, Event, Level, Subscriber};
use tracing_appender::non_blocking::{NonBlockingBuilder, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::RunConfig;
use crate::error::Result;

/// Directory the log file is written to, relative to the working directory.
///
/// This does not follow the run's `log_dir`; all runs share one flat directory.
pub const DEFAULT_LOG_ROOT: &str = "./log";

/// Field name that marks an ERROR event as critical.
pub const CRITICAL_FIELD: &str = "critical";

/// `strftime` pattern for record timestamps.
pub const RECORD_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

// Lowest level: everything passes.
const MIN_LEVEL: &str = "trace";

/// Emit an ERROR event rendered with the `CRITICAL` level name.
#[macro_export]
macro_rules! critical {
    ($($arg:tt)+) => {
        ::tracing::error!(critical = true, $($arg)+)
    };
}

/// Event formatter shared by both sinks.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordFormat;

impl<S, N> FormatEvent<S, N> for RecordFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let meta = event.metadata();
        let mut record = RecordVisitor::default();
        event.record(&mut record);

        let file = meta
            .file()
            .and_then(|f| Path::new(f).file_name())
            .and_then(|name| name.to_str())
            .unwrap_or("<unknown>");

        write!(
            writer,
            "[{} | {}:",
            level_name(meta.level(), record.critical),
            file
        )?;
        match meta.line() {
            Some(line) => write!(writer, "{line}")?,
            None => writer.write_char('?')?,
        }
        writeln!(
            writer,
            "] {}: {}{}",
            Local::now().format(RECORD_TIME_FORMAT),
            record.message,
            record.fields
        )
    }
}

fn level_name(level: &Level, critical: bool) -> &'static str {
    match *level {
        Level::TRACE => "TRACE",
        Level::DEBUG => "DEBUG",
        Level::INFO => "INFO",
        Level::WARN => "WARNING",
        _ if critical => "CRITICAL",
        _ => "ERROR",
    }
}

#[derive(Default)]
struct RecordVisitor {
    message: String,
    fields: String,
    critical: bool,
}

impl Visit for RecordVisitor {
    fn record_bool(&mut self, field: &Field, value: bool) {
        if field.name() == CRITICAL_FIELD {
            self.critical = value;
        } else {
            self.record_debug(field, &value);
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}

/// Builder for [`Logger`].
pub struct LoggerBuilder {
    filename: String,
    run_log_dir: PathBuf,
    log_root: PathBuf,
    console: BoxMakeWriter,
}

impl LoggerBuilder {
    /// Directory holding `<filename>.log`. Defaults to [`DEFAULT_LOG_ROOT`].
    pub fn log_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.log_root = root.into();
        self
    }

    /// Replace the console sink (stderr by default).
    pub fn console_writer<W>(mut self, writer: W) -> Self
    where
        W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
    {
        self.console = BoxMakeWriter::new(writer);
        self
    }

    /// Create the run's log directory, open the log file for appending, and
    /// assemble the dispatcher.
    pub fn build(self) -> Result<Logger> {
        std::fs::create_dir_all(&self.run_log_dir)?;
        std::fs::create_dir_all(&self.log_root)?;

        let file_name = format!("{}.log", self.filename);
        let file_path = self.log_root.join(&file_name);
        let appender = RollingFileAppender::builder()
            .rotation(Rotation::NEVER)
            .filename_prefix(file_name)
            .build(&self.log_root)?;
        // Block instead of dropping records when the writer falls behind.
        let (non_blocking, guard) = NonBlockingBuilder::default()
            .lossy(false)
            .finish(appender);

        let console_layer = tracing_subscriber::fmt::layer()
            .event_format(RecordFormat)
            .with_ansi(false)
            .with_writer(self.console)
            .with_filter(EnvFilter::new(MIN_LEVEL));

        let file_layer = tracing_subscriber::fmt::layer()
            .event_format(RecordFormat)
            .with_ansi(false)
            .with_writer(non_blocking)
            .with_filter(EnvFilter::new(MIN_LEVEL));

        let subscriber = tracing_subscriber::registry()
            .with(console_layer)
            .with(file_layer);

        Ok(Logger {
            dispatch: Dispatch::new(subscriber),
            file_path,
            _guard: guard,
        })
    }
}

/// Handle to the run's logger.
///
/// Dropping it flushes and closes the file sink.
#[derive(Debug)]
pub struct Logger {
    dispatch: Dispatch,
    file_path: PathBuf,
    _guard: WorkerGuard,
}

impl Logger {
    /// Start building a logger that writes `<filename>.log` and creates
    /// `config.log_dir`.
    pub fn builder(filename: impl Into<String>, config: &RunConfig) -> LoggerBuilder {
        LoggerBuilder {
            filename: filename.into(),
            run_log_dir: config.log_dir.clone(),
            log_root: PathBuf::from(DEFAULT_LOG_ROOT),
            console: BoxMakeWriter::new(std::io::stderr),
        }
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Run `f` with this logger as the current dispatcher.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }

    /// Make this logger the process-wide default. Fails if one is already set.
    pub fn install(&self) -> Result<()> {
        tracing::dispatcher::set_global_default(self.dispatch.clone())?;
        Ok(())
    }
}
