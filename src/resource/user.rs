//! `GET /users/{userID}`.
//!
//! The handler validates its input, asks a [`UserService`] for the user and
//! maps the outcome onto a response:
//!
//! | Outcome | Status | Body |
//! |---|---|---|
//! | `userID` is not a lowercase UUID v4 | 400 | `{"error":"Invalid get user request"}` |
//! | [`UserError::NotFound`] | 404 | `{"error":"user not found"}` |
//! | any other error | 500 | `{"error":"Internal server error"}` |
//! | found | 200 | the [`User`] as JSON |
//!
//! Internal error detail only ever reaches the log.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, error};
use uuid::fmt::Hyphenated;
use uuid::{Uuid, Variant, Version};

use crate::middleware::RequestContext;
use crate::request::Request;
use crate::resource::error_response;
use crate::response::Response;
use crate::router::Router;

pub const ERR_INVALID_REQUEST: &str = "Invalid get user request";
pub const ERR_INTERNAL: &str = "Internal server error";
pub const ERR_ENCODE: &str = "Error encoding user to JSON";

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// A user with a fresh random id, created now.
    pub fn new() -> Self {
        let now = Utc::now();
        Self { id: Uuid::new_v4(), created_at: now, updated_at: now }
    }
}

impl Default for User {
    fn default() -> Self { Self::new() }
}

#[derive(Debug, Error)]
pub enum UserError {
    #[error("user not found")]
    NotFound,
    #[error("{0}")]
    Internal(String),
}

/// Domain lookup behind the endpoint.
///
/// `ctx` is the context the request logger attached, or `None` when the
/// endpoint is served without it.
#[async_trait]
pub trait UserService: Send + Sync {
    async fn get_user(&self, ctx: Option<&RequestContext>, id: &str) -> Result<User, UserError>;
}

/// A [`UserService`] over a map, for demos and tests.
#[derive(Debug, Default)]
pub struct InMemoryUserService {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserService {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, user: User) {
        self.users.write().await.insert(user.id, user);
    }
}

#[async_trait]
impl UserService for InMemoryUserService {
    async fn get_user(&self, _ctx: Option<&RequestContext>, id: &str) -> Result<User, UserError> {
        let id = Uuid::parse_str(id).map_err(|_| UserError::NotFound)?;
        self.users.read().await.get(&id).cloned().ok_or(UserError::NotFound)
    }
}

/// Input of the get-user endpoint.
#[derive(Debug)]
pub struct GetUserRequest<'a> {
    pub user_id: &'a str,
}

#[derive(Debug, Error, Eq, PartialEq)]
pub enum ValidationError {
    #[error("userID is required")]
    Required,
    #[error("userID must be a UUID v4")]
    NotUuidV4,
}

impl GetUserRequest<'_> {
    /// Requires `user_id` to be a hyphenated, lowercase RFC 4122 version-4
    /// UUID.
    pub fn validate(&self) -> Result<Uuid, ValidationError> {
        if self.user_id.is_empty() {
            return Err(ValidationError::Required);
        }
        Uuid::parse_str(self.user_id)
            .ok()
            .filter(|id| {
                self.user_id.len() == Hyphenated::LENGTH
                    && !self.user_id.bytes().any(|b| b.is_ascii_uppercase())
                    && id.get_version() == Some(Version::Random)
                    && id.get_variant() == Variant::RFC4122
            })
            .ok_or(ValidationError::NotUuidV4)
    }
}

/// The user resource: routes and handler.
#[derive(Clone)]
pub struct UserApi {
    service: Arc<dyn UserService>,
}

impl UserApi {
    pub fn new(service: Arc<dyn UserService>) -> Self {
        Self { service }
    }

    /// Registers `GET /users/{userID}` on `router`.
    pub fn routes(self, router: Router) -> Router {
        let api = Arc::new(self);
        router.get("/users/{userID}", move |req: Request| {
            let api = Arc::clone(&api);
            async move { api.get_user(req).await }
        })
    }

    pub async fn get_user(&self, req: Request) -> Response {
        let input = GetUserRequest { user_id: req.param("userID").unwrap_or_default() };
        if let Err(e) = input.validate() {
            debug!(user_id = input.user_id, "rejected get user request: {e}");
            return error_response(StatusCode::BAD_REQUEST, ERR_INVALID_REQUEST);
        }

        let user = match self.service.get_user(req.context(), input.user_id).await {
            Ok(user) => user,
            Err(e @ UserError::NotFound) => {
                return error_response(StatusCode::NOT_FOUND, &e.to_string());
            }
            Err(e) => {
                error!("Issue getting user: {e}");
                return error_response(StatusCode::INTERNAL_SERVER_ERROR, ERR_INTERNAL);
            }
        };

        match serde_json::to_vec(&user) {
            Ok(body) => Response::json(body),
            Err(e) => {
                error!("Issue encoding user: {e}");
                error_response(StatusCode::INTERNAL_SERVER_ERROR, ERR_ENCODE)
            }
        }
    }
}
