//! Process configuration from environment variables.
//!
//! | Variable | Default |
//! |---|---|
//! | `TETHER_ADDR` | `0.0.0.0:3000` |
//! | `RUST_LOG` | `info` |
//! | `TETHER_LOG_FORMAT` | `pretty` in debug builds, `json` in release |
//! | `TETHER_REQUEST_ID_HEADER` | `x-request-id` |
//! | `TETHER_CORRELATION_ID_HEADER` | `x-correlation-id` |

use http::HeaderName;

use crate::error::Error;
use crate::middleware::{CORRELATION_ID_HEADER, IdentityResolver, REQUEST_ID_HEADER};
use crate::telemetry::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig};

pub const DEFAULT_ADDR: &str = "0.0.0.0:3000";

const ADDR: &str = "TETHER_ADDR";
const LOG_LEVEL: &str = "RUST_LOG";
const LOG_FORMAT: &str = "TETHER_LOG_FORMAT";
const REQUEST_ID: &str = "TETHER_REQUEST_ID_HEADER";
const CORRELATION_ID: &str = "TETHER_CORRELATION_ID_HEADER";

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: String,
    pub logging: LoggingConfig,
    pub identity: IdentityResolver,
}

impl Config {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error when a header name or the log format is invalid.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name
    /// to its value. Blank values count as unset.
    ///
    /// # Errors
    ///
    /// Same as [`from_env`](Self::from_env).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let format = match get(LOG_FORMAT) {
            Some(v) => v.parse()?,
            None => LogFormat::infer(),
        };

        Ok(Self {
            addr: get(ADDR).unwrap_or_else(|| DEFAULT_ADDR.to_owned()),
            logging: LoggingConfig {
                level: get(LOG_LEVEL).unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_owned()),
                format,
            },
            identity: IdentityResolver::new(
                header_name(REQUEST_ID, get(REQUEST_ID), REQUEST_ID_HEADER)?,
                header_name(CORRELATION_ID, get(CORRELATION_ID), CORRELATION_ID_HEADER)?,
            ),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_owned(),
            logging: LoggingConfig::default(),
            identity: IdentityResolver::default(),
        }
    }
}

fn header_name(
    key: &'static str,
    value: Option<String>,
    default: HeaderName,
) -> Result<HeaderName, Error> {
    match value {
        None => Ok(default),
        Some(value) => HeaderName::from_bytes(value.trim().as_bytes())
            .map_err(|_| Error::HeaderName { key, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, Error> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = config(&[]).unwrap();

        assert_eq!(config.addr, DEFAULT_ADDR);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::infer());
        assert_eq!(config.identity.request_header(), &REQUEST_ID_HEADER);
        assert_eq!(config.identity.correlation_header(), &CORRELATION_ID_HEADER);
    }

    #[test]
    fn variables_override_defaults() {
        let config = config(&[
            ("TETHER_ADDR", "127.0.0.1:8080"),
            ("RUST_LOG", "tether::request=info,warn"),
            ("TETHER_LOG_FORMAT", "json"),
            ("TETHER_REQUEST_ID_HEADER", "X-Amzn-Trace-Id"),
            ("TETHER_CORRELATION_ID_HEADER", "x-b3-traceid"),
        ])
        .unwrap();

        assert_eq!(config.addr, "127.0.0.1:8080");
        assert_eq!(config.logging.level, "tether::request=info,warn");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.identity.request_header().as_str(), "x-amzn-trace-id");
        assert_eq!(config.identity.correlation_header().as_str(), "x-b3-traceid");
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = config(&[("TETHER_ADDR", "  "), ("TETHER_REQUEST_ID_HEADER", "")]).unwrap();
        assert_eq!(config.addr, DEFAULT_ADDR);
        assert_eq!(config.identity.request_header(), &REQUEST_ID_HEADER);
    }

    #[test]
    fn invalid_header_name_is_rejected() {
        let err = config(&[("TETHER_CORRELATION_ID_HEADER", "bad header")]).unwrap_err();
        assert!(matches!(err, Error::HeaderName { key: "TETHER_CORRELATION_ID_HEADER", .. }));
    }

    #[test]
    fn invalid_log_format_is_rejected() {
        let err = config(&[("TETHER_LOG_FORMAT", "xml")]).unwrap_err();
        assert!(matches!(err, Error::LogFormat(_)));
    }
}
