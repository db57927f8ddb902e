//! Request-scoped context handed to downstream code.

use http::HeaderMap;
use tracing::Span;

use super::identity::{CorrelationId, IdentityResolver, RequestId};

/// Identities of the current request plus a logging handle bound to them.
///
/// The request logger builds one per request and stores it on the
/// [`Request`](crate::Request); handlers read it with
/// [`Request::context`](crate::Request::context). The span is already entered
/// while the handler runs, so plain `tracing::info!` calls inside a handler
/// carry `requestID` and `correlationID`. Use [`span`](Self::span) to attach
/// the same fields to work spawned onto other tasks.
#[derive(Clone, Debug)]
pub struct RequestContext {
    request_id: RequestId,
    correlation_id: CorrelationId,
    span: Span,
}

impl RequestContext {
    /// Resolves identities from `headers` and opens the request span.
    pub fn resolve(resolver: &IdentityResolver, headers: &HeaderMap) -> Self {
        let (request_id, correlation_id) = resolver.resolve(headers);
        let span = tracing::info_span!(
            "request",
            requestID = %request_id,
            correlationID = %correlation_id,
        );
        Self { request_id, correlation_id, span }
    }

    pub fn request_id(&self) -> &RequestId { &self.request_id }
    pub fn correlation_id(&self) -> &CorrelationId { &self.correlation_id }
    pub fn span(&self) -> &Span { &self.span }
}
