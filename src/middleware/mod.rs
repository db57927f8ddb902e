//! Middleware layer.
//!
//! [`RequestLogger`] wraps any [`Handler`] (usually the whole [`Router`]) so
//! that every request is identified, timed and logged exactly once:
//!
//! ```text
//! request ─▶ resolve x-request-id / x-correlation-id (or generate)
//!         ─▶ attach RequestContext, enter the request span, start the clock
//!         ─▶ inner handler (panics caught here)
//!         ─▶ replay the response through ObservedResponse
//!         ─▶ one LogRecord: requestID, correlationID, duration, …
//! ```
//!
//! ```rust,no_run
//! use tether::{Request, Response, Router, Server};
//! use tether::middleware::request_logger;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), tether::Error> {
//!     let app = Router::new().get("/users/{id}", get_user);
//!     Server::bind("0.0.0.0:3000")?.serve(request_logger(app)).await
//! }
//!
//! async fn get_user(req: Request) -> Response {
//!     let ctx = req.context().expect("wrapped by request_logger");
//!     tracing::info!(user = req.param("id"), "loading user"); // carries both identities
//!     Response::text(ctx.request_id().to_string())
//! }
//! ```
//!
//! [`Router`]: crate::Router

mod context;
mod identity;
mod observe;
mod record;

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use http::{Method, StatusCode};
use tracing::Instrument;

use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler, Handler};
use crate::request::Request;
use crate::response::{IntoResponse, Response};
use crate::writer::ResponseWriter;

pub use context::RequestContext;
pub use identity::{
    CORRELATION_ID_HEADER, CorrelationId, IdentityResolver, REQUEST_ID_HEADER, RequestId,
};
pub use observe::ObservedResponse;
pub use record::{CLIENT_CLOSED_REQUEST, LOG_TARGET, LogRecord, Termination};

/// Wraps `inner` with the default [`RequestLogger`].
pub fn request_logger(inner: impl Handler) -> Instrumented {
    RequestLogger::default().wrap(inner)
}

/// Builds [`Instrumented`] handlers.
#[derive(Clone, Debug, Default)]
pub struct RequestLogger {
    resolver: IdentityResolver,
}

impl RequestLogger {
    pub fn new(resolver: IdentityResolver) -> Self {
        Self { resolver }
    }

    pub fn wrap(&self, inner: impl Handler) -> Instrumented {
        Instrumented {
            inner: inner.into_boxed_handler(),
            resolver: self.resolver.clone(),
        }
    }
}

/// A handler wrapped by [`RequestLogger`].
pub struct Instrumented {
    inner: BoxedHandler,
    resolver: IdentityResolver,
}

impl ErasedHandler for Instrumented {
    fn call(&self, mut req: Request) -> BoxFuture {
        let context = RequestContext::resolve(&self.resolver, req.headers());
        let span = context.span().clone();
        let in_flight = InFlight::start(context.clone(), req.method().clone(), req.path().to_owned());
        req.set_context(context);

        let inner = Arc::clone(&self.inner);
        Box::pin(async move {
            // The inner call happens on first poll so a panic while building
            // its future is caught as well.
            let outcome = AssertUnwindSafe(async move { inner.call(req).await }.instrument(span))
                .catch_unwind()
                .await;

            let (response, panic) = match outcome {
                Ok(response) => (response, None),
                Err(payload) => (
                    Response::status(StatusCode::INTERNAL_SERVER_ERROR),
                    Some(panic_message(payload.as_ref())),
                ),
            };

            // The status is already final here; ResponseWriter enforced the
            // write rules while the handler ran.
            let mut observed = ObservedResponse::new(ResponseWriter::new());
            response.write_to(&mut observed);

            let termination = match &panic {
                Some(message) => Termination::Panicked(message),
                None => Termination::Completed,
            };
            in_flight.finish(observed.status().as_u16(), observed.bytes_written(), termination);

            observed.into_inner().into_response()
        })
    }
}

// ── In-flight guard ──────────────────────────────────────────────────────────

/// Owns the per-request log line. Emits it on [`finish`](Self::finish), or on
/// drop if the request future was abandoned first.
struct InFlight {
    context: RequestContext,
    method: Method,
    path: String,
    started: Instant,
    emitted: bool,
}

impl InFlight {
    fn start(context: RequestContext, method: Method, path: String) -> Self {
        Self { context, method, path, started: Instant::now(), emitted: false }
    }

    fn finish(mut self, status: u16, bytes: usize, termination: Termination<'_>) {
        self.emit(status, bytes, termination);
    }

    fn emit(&mut self, status: u16, bytes: usize, termination: Termination<'_>) {
        if self.emitted {
            return;
        }
        self.emitted = true;
        LogRecord {
            request_id: self.context.request_id(),
            correlation_id: self.context.correlation_id(),
            duration: self.started.elapsed(),
            method: &self.method,
            path: &self.path,
            status,
            bytes,
            termination,
        }
        .emit();
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.emit(CLIENT_CLOSED_REQUEST, 0, Termination::Cancelled);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
