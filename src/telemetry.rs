//! Log subscriber installation.
//!
//! # Design
//! - One entry point, [`init`], installs a `tracing-subscriber` registry with
//!   an `EnvFilter` and a fmt layer (pretty or flattened JSON).
//! - Output goes through [`FallbackMakeWriter`]: a failed write to stdout is
//!   retried on stderr and then dropped. Logging never fails a request.

use std::io::{self, Write};
use std::str::FromStr;

use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::error::Error;

/// Default filter directive when none is configured.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Output format of the fmt layer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LogFormat {
    /// One JSON object per line, event fields at the top level.
    Json,
    /// Human-readable output.
    Pretty,
}

impl LogFormat {
    /// Pretty for debug builds, JSON for release builds.
    #[must_use]
    pub const fn infer() -> Self {
        if cfg!(debug_assertions) {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

impl FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            _ => Err(Error::LogFormat(s.to_owned())),
        }
    }
}

/// Logging configuration.
#[derive(Clone, Debug)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `tether::request=info,warn`.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: DEFAULT_LOG_LEVEL.to_owned(), format: LogFormat::infer() }
    }
}

/// Installs the global tracing subscriber.
///
/// # Errors
///
/// Returns [`Error::Logging`] if the filter directive does not parse or a
/// global subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<(), Error> {
    let filter = EnvFilter::try_new(&config.level).map_err(|e| Error::Logging(e.to_string()))?;
    let writer = FallbackMakeWriter::new(io::stdout, io::stderr);
    let registry = tracing_subscriber::registry().with(filter);

    match config.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().flatten_event(true).with_writer(writer))
            .try_init(),
        LogFormat::Pretty => registry.with(fmt::layer().with_writer(writer)).try_init(),
    }
    .map_err(|e| Error::Logging(e.to_string()))
}

// ── Fallback writer ──────────────────────────────────────────────────────────

/// `MakeWriter` that sends output to `primary` and, when that write fails, to
/// `fallback`. Errors from both are swallowed.
#[derive(Clone, Debug)]
pub struct FallbackMakeWriter<P, F> {
    primary: P,
    fallback: F,
}

impl<P, F> FallbackMakeWriter<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }
}

impl<'a, P, F> MakeWriter<'a> for FallbackMakeWriter<P, F>
where
    P: MakeWriter<'a>,
    F: MakeWriter<'a>,
{
    type Writer = FallbackWriter<P::Writer, F::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        FallbackWriter {
            primary: self.primary.make_writer(),
            fallback: self.fallback.make_writer(),
        }
    }
}

/// Writer produced by [`FallbackMakeWriter`].
pub struct FallbackWriter<P, F> {
    primary: P,
    fallback: F,
}

impl<P: Write, F: Write> Write for FallbackWriter<P, F> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut written = 0;
        while written < buf.len() {
            match self.primary.write(&buf[written..]) {
                Ok(0) => break,
                Ok(n) => written += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(_) => break,
            }
        }
        // Only the bytes the primary did not take go to the fallback.
        if written < buf.len() {
            let _ = self.fallback.write_all(&buf[written..]);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.primary.flush().is_err() {
            let _ = self.fallback.flush();
        }
        Ok(())
    }
}
