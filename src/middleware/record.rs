//! The per-request log record.

use std::time::Duration;

use http::Method;
use tracing::{error, info, warn};

use super::identity::{CorrelationId, RequestId};

/// Target of every request log record. Filter on it with
/// `RUST_LOG=tether::request=info`.
pub const LOG_TARGET: &str = "tether::request";

/// Status recorded for requests whose future was dropped before the handler
/// returned (nginx's "client closed request").
pub const CLIENT_CLOSED_REQUEST: u16 = 499;

/// How the inner handler finished.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Termination<'a> {
    Completed,
    Panicked(&'a str),
    Cancelled,
}

/// One structured log line describing a finished request.
///
/// Fields are emitted in this order: `requestID`, `correlationID`,
/// `duration`, `method`, `path`, `statusCode`, `bytes` and, for a panic,
/// `panic`.
#[derive(Debug)]
pub struct LogRecord<'a> {
    pub request_id: &'a RequestId,
    pub correlation_id: &'a CorrelationId,
    pub duration: Duration,
    pub method: &'a Method,
    pub path: &'a str,
    pub status: u16,
    pub bytes: usize,
    pub termination: Termination<'a>,
}

impl LogRecord<'_> {
    /// `"<METHOD> <PATH> StatusCode: <code>"`
    pub fn message(&self) -> String {
        format!("{} {} StatusCode: {}", self.method, self.path, self.status)
    }

    /// Writes the record through the current `tracing` dispatcher.
    ///
    /// Completed requests log at INFO, cancelled ones at WARN, panics at
    /// ERROR.
    pub fn emit(&self) {
        let message = self.message();
        match self.termination {
            Termination::Completed => info!(
                target: LOG_TARGET,
                requestID = %self.request_id,
                correlationID = %self.correlation_id,
                duration = ?self.duration,
                method = %self.method,
                path = self.path,
                statusCode = self.status,
                bytes = self.bytes,
                "{message}"
            ),
            Termination::Cancelled => warn!(
                target: LOG_TARGET,
                requestID = %self.request_id,
                correlationID = %self.correlation_id,
                duration = ?self.duration,
                method = %self.method,
                path = self.path,
                statusCode = self.status,
                bytes = self.bytes,
                "{message}"
            ),
            Termination::Panicked(panic) => error!(
                target: LOG_TARGET,
                requestID = %self.request_id,
                correlationID = %self.correlation_id,
                duration = ?self.duration,
                method = %self.method,
                path = self.path,
                statusCode = self.status,
                bytes = self.bytes,
                panic,
                "{message}"
            ),
        }
    }
}
