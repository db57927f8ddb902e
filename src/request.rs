//! Incoming HTTP request type.

use std::collections::HashMap;

use bytes::Bytes;
use http::{HeaderMap, Method, Uri};

use crate::middleware::RequestContext;

/// An incoming HTTP request with its body fully buffered.
///
/// Build one from an [`http::Request<Bytes>`] with `From`:
///
/// ```rust
/// use tether::Request;
///
/// let req: Request = http::Request::get("/users/42")
///     .header("x-request-id", "abc123")
///     .body(bytes::Bytes::new())
///     .unwrap()
///     .into();
///
/// assert_eq!(req.path(), "/users/42");
/// assert_eq!(req.header("X-Request-Id"), Some("abc123"));
/// ```
pub struct Request {
    inner: http::Request<Bytes>,
    params: HashMap<String, String>,
}

impl Request {
    pub(crate) fn new(inner: http::Request<Bytes>, params: HashMap<String, String>) -> Self {
        Self { inner, params }
    }

    pub fn method(&self) -> &Method { self.inner.method() }
    pub fn uri(&self) -> &Uri { self.inner.uri() }
    pub fn path(&self) -> &str { self.inner.uri().path() }
    pub fn headers(&self) -> &HeaderMap { self.inner.headers() }
    pub fn body(&self) -> &Bytes { self.inner.body() }

    /// Case-insensitive header lookup. Returns the first value if it is
    /// visible ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.inner.headers().get(name)?.to_str().ok()
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// The identities and logging handle attached by
    /// [`RequestLogger`](crate::middleware::RequestLogger).
    ///
    /// `None` when the request did not pass through the middleware.
    pub fn context(&self) -> Option<&RequestContext> {
        self.inner.extensions().get::<RequestContext>()
    }

    pub(crate) fn set_context(&mut self, context: RequestContext) {
        self.inner.extensions_mut().insert(context);
    }

    pub(crate) fn set_params(&mut self, params: HashMap<String, String>) {
        self.params = params;
    }
}

impl From<http::Request<Bytes>> for Request {
    fn from(inner: http::Request<Bytes>) -> Self {
        Self::new(inner, HashMap::new())
    }
}
