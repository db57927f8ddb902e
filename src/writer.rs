//! Imperative response construction.
//!
//! [`ResponseWriter`] is for handlers that prefer to write a response step by
//! step instead of building it in one expression. It follows the usual
//! response-writer rules:
//!
//! - the first status write wins, later ones are ignored;
//! - writing a body before any status commits `200 OK`;
//! - headers written after the status is committed are ignored.
//!
//! ```rust
//! use tether::{ResponseWriter, StatusCode};
//!
//! async fn gone(_req: tether::Request) -> ResponseWriter {
//!     let mut w = ResponseWriter::new();
//!     w.write_status(StatusCode::GONE);
//!     w.write(b"moved on");
//!     w
//! }
//! ```

use bytes::{Bytes, BytesMut};
use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, StatusCode};
use tracing::debug;

use crate::response::{IntoResponse, Response, ResponseSink};

/// A response sink that accumulates into a [`Response`].
#[derive(Debug, Default)]
pub struct ResponseWriter {
    headers: HeaderMap,
    status: Option<StatusCode>,
    body: BytesMut,
}

impl ResponseWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Headers are mutable until the status is committed.
    pub fn headers_mut(&mut self) -> Option<&mut HeaderMap> {
        match self.status {
            None => Some(&mut self.headers),
            Some(_) => None,
        }
    }

    /// Commits `status` unless a status has already been committed.
    pub fn write_status(&mut self, status: StatusCode) {
        match self.status {
            None => self.status = Some(status),
            Some(committed) => debug!(
                committed = committed.as_u16(),
                ignored = status.as_u16(),
                "superfluous status write"
            ),
        }
    }

    /// Appends `chunk` to the body, committing `200 OK` first if needed.
    pub fn write(&mut self, chunk: &[u8]) {
        self.status.get_or_insert(StatusCode::OK);
        self.body.extend_from_slice(chunk);
    }

    /// The committed status, if any.
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }
}

impl ResponseSink for ResponseWriter {
    fn append_header(&mut self, name: HeaderName, value: HeaderValue) {
        if let Some(headers) = self.headers_mut() {
            headers.append(name, value);
        }
    }

    fn write_status(&mut self, status: StatusCode) {
        ResponseWriter::write_status(self, status);
    }

    fn write_body(&mut self, chunk: Bytes) {
        self.write(&chunk);
    }
}

impl IntoResponse for ResponseWriter {
    fn into_response(self) -> Response {
        Response {
            body: self.body.freeze(),
            headers: self.headers,
            status: self.status.unwrap_or(StatusCode::OK),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use http::header;

    #[test]
    fn first_status_write_wins() {
        let mut w = ResponseWriter::new();
        w.write_status(StatusCode::NOT_FOUND);
        w.write_status(StatusCode::INTERNAL_SERVER_ERROR);

        let res = w.into_response();
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn body_write_commits_ok() {
        let mut w = ResponseWriter::new();
        w.write(b"");
        assert_eq!(w.status(), Some(StatusCode::OK));

        w.write_status(StatusCode::BAD_REQUEST);
        assert_eq!(w.into_response().status_code(), StatusCode::OK);
    }

    #[test]
    fn untouched_writer_is_ok_with_empty_body() {
        let res = ResponseWriter::new().into_response();
        assert_eq!(res.status_code(), StatusCode::OK);
        assert!(res.body().is_empty());
    }

    #[test]
    fn headers_freeze_once_status_is_committed() {
        let mut w = ResponseWriter::new();
        w.append_header(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        w.write_status(StatusCode::CREATED);
        w.append_header(header::LOCATION, HeaderValue::from_static("/late"));
        assert!(w.headers_mut().is_none());

        let res = w.into_response();
        assert_eq!(res.headers().len(), 1);
        assert!(res.headers().get(header::LOCATION).is_none());
    }

    #[test]
    fn body_chunks_accumulate() {
        let mut w = ResponseWriter::new();
        w.write(b"hello, ");
        w.write_body(Bytes::from_static(b"world"));
        assert_eq!(w.into_response().body().as_ref(), b"hello, world");
    }
}
