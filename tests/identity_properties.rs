//! Property tests for identity resolution and the record message.

use std::time::Duration;

use http::{HeaderMap, HeaderValue, Method};
use proptest::prelude::*;
use tether::middleware::{
    CORRELATION_ID_HEADER, IdentityResolver, LogRecord, REQUEST_ID_HEADER, Termination,
};
use uuid::Uuid;

// Strategy: any header value made of visible ASCII and spaces, never empty
fn arb_header_value() -> impl Strategy<Value = String> {
    prop::string::string_regex("[!-~][ -~]{0,63}").unwrap()
}

fn arb_method() -> impl Strategy<Value = Method> {
    prop_oneof![
        Just(Method::GET),
        Just(Method::POST),
        Just(Method::PUT),
        Just(Method::PATCH),
        Just(Method::DELETE),
    ]
}

proptest! {
    /// Non-empty inbound values come back exactly as sent.
    #[test]
    fn inbound_values_are_returned_verbatim(
        request_value in arb_header_value(),
        correlation_value in arb_header_value(),
    ) {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_str(&request_value).unwrap());
        headers.insert(CORRELATION_ID_HEADER, HeaderValue::from_str(&correlation_value).unwrap());

        let (request_id, correlation_id) = IdentityResolver::default().resolve(&headers);

        prop_assert_eq!(request_id.as_str(), request_value.as_str());
        prop_assert_eq!(correlation_id.as_str(), correlation_value.as_str());
    }

    /// Whatever other headers arrive, a missing identity is a fresh UUID v4.
    #[test]
    fn missing_identities_are_generated(
        noise in prop::collection::vec(("x-[a-z]{1,12}", arb_header_value()), 0..8),
    ) {
        let mut headers = HeaderMap::new();
        for (name, value) in &noise {
            headers.append(
                http::HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }

        let (request_id, correlation_id) = IdentityResolver::default().resolve(&headers);

        let request_uuid = Uuid::parse_str(request_id.as_str()).unwrap();
        let correlation_uuid = Uuid::parse_str(correlation_id.as_str()).unwrap();
        prop_assert_eq!(request_uuid.get_version_num(), 4);
        prop_assert_eq!(correlation_uuid.get_version_num(), 4);
        prop_assert_ne!(request_uuid, correlation_uuid);
    }

    #[test]
    fn message_is_method_path_and_status(
        method in arb_method(),
        path in "/[a-z0-9/-]{0,32}",
        status in 100u16..600,
    ) {
        let (request_id, correlation_id) = IdentityResolver::default().resolve(&HeaderMap::new());
        let record = LogRecord {
            request_id: &request_id,
            correlation_id: &correlation_id,
            duration: Duration::ZERO,
            method: &method,
            path: &path,
            status,
            bytes: 0,
            termination: Termination::Completed,
        };

        prop_assert_eq!(record.message(), format!("{method} {path} StatusCode: {status}"));
    }
}
