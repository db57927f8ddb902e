//! Application resources served behind the request logger.

pub mod user;

use http::StatusCode;
use serde::Serialize;

use crate::response::Response;

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

/// `{"error": "<message>"}` with the given status.
///
/// `message` is sent to the client as-is, so it must never carry internal
/// error detail.
pub fn error_response(status: StatusCode, message: &str) -> Response {
    match serde_json::to_vec(&ErrorBody { error: message }) {
        Ok(body) => Response::builder().status(status).json(body),
        Err(_) => Response::status(status),
    }
}
