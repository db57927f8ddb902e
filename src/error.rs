//! Unified error type.

use thiserror::Error;

/// The error type returned by tether's fallible operations.
///
/// Application-level errors (404, 500, etc.) are expressed as HTTP
/// [`Response`](crate::Response) values, not as `Error`s. This type surfaces
/// infrastructure failures: binding to a port, accepting a connection,
/// reading configuration or installing the log subscriber.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid socket address `{addr}`: {source}")]
    Address {
        addr: String,
        #[source]
        source: std::net::AddrParseError,
    },

    #[error("invalid header name for {key}: `{value}`")]
    HeaderName { key: &'static str, value: String },

    #[error("invalid log format `{0}` (expected `json` or `pretty`)")]
    LogFormat(String),

    #[error("logging: {0}")]
    Logging(String),
}
