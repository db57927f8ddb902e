//! Request and correlation identities.
//!
//! Each inbound request carries two identities:
//!
//! | Identity | Header | Scope |
//! |---|---|---|
//! | [`RequestId`] | `x-request-id` | one request, one log line |
//! | [`CorrelationId`] | `x-correlation-id` | a unit of work that may span services |
//!
//! A non-empty inbound header is taken verbatim, so an upstream caller can
//! hand its correlation identity down a call chain. Missing or empty headers
//! get a fresh UUID v4. The values are **not** validated: anything a client
//! sends ends up in the logs as-is.

use std::fmt;
use std::sync::Arc;

use http::header::{HeaderMap, HeaderName};
use uuid::Uuid;

/// Default header carrying an inbound request identity.
pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Default header carrying an inbound correlation identity.
pub const CORRELATION_ID_HEADER: HeaderName = HeaderName::from_static("x-correlation-id");

/// Identifies one inbound request.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct RequestId(Arc<str>);

/// Identifies a logical operation that may span several requests and services.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct CorrelationId(Arc<str>);

impl RequestId {
    pub fn as_str(&self) -> &str { &self.0 }
}

impl CorrelationId {
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derives both identities from request headers.
///
/// ```rust
/// use http::HeaderMap;
/// use tether::middleware::IdentityResolver;
///
/// let mut headers = HeaderMap::new();
/// headers.insert("x-request-id", "abc123".parse().unwrap());
///
/// let (request_id, correlation_id) = IdentityResolver::default().resolve(&headers);
/// assert_eq!(request_id.as_str(), "abc123");
/// assert!(!correlation_id.as_str().is_empty());
/// ```
#[derive(Clone, Debug)]
pub struct IdentityResolver {
    request_header: HeaderName,
    correlation_header: HeaderName,
}

impl IdentityResolver {
    /// A resolver reading identities from custom header names.
    pub fn new(request_header: HeaderName, correlation_header: HeaderName) -> Self {
        Self { request_header, correlation_header }
    }

    pub fn request_header(&self) -> &HeaderName { &self.request_header }
    pub fn correlation_header(&self) -> &HeaderName { &self.correlation_header }

    /// Returns the request and correlation identities for `headers`.
    ///
    /// Never fails and never returns an empty identity.
    pub fn resolve(&self, headers: &HeaderMap) -> (RequestId, CorrelationId) {
        (
            RequestId(inbound_or_generated(headers, &self.request_header)),
            CorrelationId(inbound_or_generated(headers, &self.correlation_header)),
        )
    }
}

impl Default for IdentityResolver {
    fn default() -> Self {
        Self::new(REQUEST_ID_HEADER, CORRELATION_ID_HEADER)
    }
}

fn inbound_or_generated(headers: &HeaderMap, name: &HeaderName) -> Arc<str> {
    match headers.get(name) {
        // Opaque bytes are decoded lossily; valid UTF-8 passes through untouched.
        Some(value) if !value.is_empty() => Arc::from(String::from_utf8_lossy(value.as_bytes())),
        _ => Arc::from(Uuid::new_v4().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(*name, HeaderValue::from_static(*value));
        }
        map
    }

    #[test]
    fn generates_both_when_headers_are_absent() {
        let (request_id, correlation_id) = IdentityResolver::default().resolve(&HeaderMap::new());

        assert!(Uuid::parse_str(request_id.as_str()).is_ok());
        assert!(Uuid::parse_str(correlation_id.as_str()).is_ok());
        assert_ne!(request_id.as_str(), correlation_id.as_str());
    }

    #[test]
    fn inbound_request_id_is_used_verbatim() {
        let (request_id, _) = IdentityResolver::default().resolve(&headers(&[("x-request-id", "123abc")]));
        assert_eq!(request_id.as_str(), "123abc");
    }

    #[test]
    fn inbound_correlation_id_is_used_verbatim() {
        let (_, correlation_id) =
            IdentityResolver::default().resolve(&headers(&[("x-correlation-id", "123abc")]));
        assert_eq!(correlation_id.as_str(), "123abc");
    }

    #[test]
    fn identities_resolve_independently() {
        let (request_id, correlation_id) =
            IdentityResolver::default().resolve(&headers(&[("x-correlation-id", "xyz")]));

        assert!(Uuid::parse_str(request_id.as_str()).is_ok());
        assert_eq!(correlation_id.as_str(), "xyz");
    }

    #[test]
    fn empty_header_is_treated_as_absent() {
        let (request_id, _) = IdentityResolver::default().resolve(&headers(&[("x-request-id", "")]));
        assert!(Uuid::parse_str(request_id.as_str()).is_ok());
    }

    #[test]
    fn first_of_repeated_headers_wins() {
        let (request_id, _) = IdentityResolver::default()
            .resolve(&headers(&[("x-request-id", "first"), ("x-request-id", "second")]));
        assert_eq!(request_id.as_str(), "first");
    }

    #[test]
    fn unusual_values_are_accepted() {
        let (request_id, correlation_id) = IdentityResolver::default().resolve(&headers(&[
            ("x-request-id", "'; DROP TABLE logs; --"),
            ("x-correlation-id", "{\"forged\":true}"),
        ]));

        assert_eq!(request_id.as_str(), "'; DROP TABLE logs; --");
        assert_eq!(correlation_id.as_str(), "{\"forged\":true}");
    }

    #[test]
    fn non_utf8_bytes_are_decoded_lossily() {
        let mut map = HeaderMap::new();
        map.insert(REQUEST_ID_HEADER, HeaderValue::from_bytes(b"id-\xff").unwrap());

        let (request_id, _) = IdentityResolver::default().resolve(&map);
        assert_eq!(request_id.as_str(), "id-\u{fffd}");
    }

    #[test]
    fn custom_header_names_are_honoured() {
        let resolver = IdentityResolver::new(
            HeaderName::from_static("x-amzn-trace-id"),
            HeaderName::from_static("x-b3-traceid"),
        );
        let (request_id, correlation_id) = resolver.resolve(&headers(&[
            ("x-amzn-trace-id", "root-1"),
            ("x-b3-traceid", "b3-1"),
            ("x-request-id", "ignored"),
        ]));

        assert_eq!(request_id.as_str(), "root-1");
        assert_eq!(correlation_id.as_str(), "b3-1");
    }
}
