//! Status observation by decorating a [`ResponseSink`].

use bytes::Bytes;
use http::StatusCode;
use http::header::{HeaderName, HeaderValue};

use crate::response::ResponseSink;

/// Forwards every write to the wrapped sink while remembering the first
/// status written and the number of body bytes.
///
/// A body write with no status before it counts as `200 OK`, and so does a
/// response that never writes anything.
///
/// The request logger feeds it a finished [`Response`](crate::Response)
/// through [`Response::write_to`](crate::Response::write_to), which writes
/// the status exactly once. On that path the first-write and default-200
/// rules are already settled by [`ResponseWriter`](crate::ResponseWriter)
/// inside the handler, and the observer only reads the outcome back. The
/// rules here matter for sinks driven write by write.
#[derive(Debug)]
pub struct ObservedResponse<S> {
    inner: S,
    status: Option<StatusCode>,
    bytes: usize,
}

impl<S: ResponseSink> ObservedResponse<S> {
    pub fn new(inner: S) -> Self {
        Self { inner, status: None, bytes: 0 }
    }

    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }

    pub fn bytes_written(&self) -> usize {
        self.bytes
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: ResponseSink> ResponseSink for ObservedResponse<S> {
    fn append_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.inner.append_header(name, value);
    }

    fn write_status(&mut self, status: StatusCode) {
        self.status.get_or_insert(status);
        self.inner.write_status(status);
    }

    fn write_body(&mut self, chunk: Bytes) {
        self.status.get_or_insert(StatusCode::OK);
        self.bytes += chunk.len();
        self.inner.write_body(chunk);
    }
}
