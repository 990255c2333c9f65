//! File-backed logging context.
//!
//! Every line has the shape
//!
//! ```text
//! LEVEL : 2026-01-31 09:15:02,118 : src/runner/mod.rs : 112 : message
//! ```
//!
//! A `LogContext` owns its own `tracing` dispatcher instead of installing a
//! global subscriber. Code that should log into it runs inside
//! [`LogContext::in_scope`].

use std::fmt;
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Local;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use tracing::{Dispatch, Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive that overrides
/// the configured level.
pub const LOG_ENV_VAR: &str = "DEVKIT_LOG";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// The log file could not be opened.
#[derive(Debug, Error)]
#[error("cannot open log file '{}': {source}", .path.display())]
pub struct LogError {
    path: PathBuf,
    source: io::Error,
}

/// A logging sink that code opts into explicitly.
#[derive(Clone)]
pub struct LogContext {
    dispatch: Dispatch,
    path: Option<PathBuf>,
}

impl LogContext {
    /// Opens `path` for appending (creating it and its parent directories)
    /// and builds a dispatcher that writes events at `level` or above to it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or its parent directory cannot be created.
    pub fn init(path: &Path, level: LevelFilter) -> Result<Self, LogError> {
        let wrap = |source| LogError { path: path.to_path_buf(), source };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(wrap)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path).map_err(wrap)?;

        let filter = EnvFilter::builder()
            .with_default_directive(level.into())
            .with_env_var(LOG_ENV_VAR)
            .from_env_lossy();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_env_filter(filter)
            .event_format(LineFormat)
            .finish();

        Ok(Self { dispatch: Dispatch::new(subscriber), path: Some(path.to_path_buf()) })
    }

    /// A context that discards every event.
    #[must_use]
    pub fn disabled() -> Self {
        Self { dispatch: Dispatch::none(), path: None }
    }

    /// The log file, if this context writes to one.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Runs `f` with this context as the default `tracing` dispatcher.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }
}

impl fmt::Debug for LogContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogContext").field("path", &self.path).finish_non_exhaustive()
    }
}

struct LineFormat;

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let meta = event.metadata();
        write!(
            writer,
            "{} : {} : {} : {} : ",
            meta.level(),
            Local::now().format(TIMESTAMP_FORMAT),
            meta.file().unwrap_or("<unknown>"),
            meta.line().unwrap_or(0),
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}
