//! # tether
//!
//! Request identity, correlation propagation and one structured log line per
//! request, for services built on hyper.
//!
//! ## The contract
//!
//! Every request that passes through [`middleware::RequestLogger`]:
//!
//! - gets a **request id** (`x-request-id`, or a fresh UUID v4)
//! - gets a **correlation id** (`x-correlation-id`, or a fresh UUID v4), so
//!   a caller can thread one identity through a chain of services
//! - is timed from the moment the logger sees it until the handler returns
//! - produces **exactly one** log record, after the handler finishes, with
//!   fields in a fixed order:
//!
//! ```text
//! requestID=… correlationID=… duration=1.2ms method=GET path=/users/… statusCode=404 bytes=26
//!     GET /users/… StatusCode: 404
//! ```
//!
//! Handlers read both identities, plus a span already bound to them, from
//! [`Request::context`]. A panicking handler is answered with `500` and still
//! logged once.
//!
//! What tether does not do: export spans, sample, or validate the identities
//! a client sends. Inbound header values are logged verbatim.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use tether::middleware::RequestLogger;
//! use tether::resource::user::{InMemoryUserService, UserApi};
//! use tether::{Config, Router, Server, telemetry};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), tether::Error> {
//!     let config = Config::from_env()?;
//!     telemetry::init(&config.logging)?;
//!
//!     let users = UserApi::new(Arc::new(InMemoryUserService::new()));
//!     let app = users.routes(Router::new());
//!
//!     Server::bind(&config.addr)?
//!         .serve(RequestLogger::new(config.identity).wrap(app))
//!         .await
//! }
//! ```

mod config;
mod error;
mod handler;
mod request;
mod response;
mod router;
mod server;
mod writer;

pub mod middleware;
pub mod resource;
pub mod telemetry;

pub use config::{Config, DEFAULT_ADDR};
pub use error::Error;
pub use handler::{Handler, oneshot};
pub use http::{Method, StatusCode};
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder, ResponseSink};
pub use router::Router;
pub use server::Server;
pub use writer::ResponseWriter;
