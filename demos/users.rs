//! tether example: one user resource behind the request logger.
//!
//! Run with:
//!   TETHER_LOG_FORMAT=json cargo run --example users
//!
//! The seeded user's id is logged at startup. Try:
//!   curl -i http://localhost:3000/users/<seeded id>
//!   curl -i http://localhost:3000/users/9f2c1d4e-5b6a-4c7d-8e9f-0a1b2c3d4e5f   # 404
//!   curl -i http://localhost:3000/users/not-a-uuid                             # 400
//!   curl -i -H 'x-correlation-id: checkout-42' http://localhost:3000/nowhere  # 404, still logged

use std::sync::Arc;

use tether::middleware::RequestLogger;
use tether::resource::user::{InMemoryUserService, User, UserApi};
use tether::{Config, Router, Server, telemetry};

#[tokio::main]
async fn main() -> Result<(), tether::Error> {
    let config = Config::from_env()?;
    telemetry::init(&config.logging)?;

    let users = Arc::new(InMemoryUserService::new());
    let seeded = User::new();
    tracing::info!(user_id = %seeded.id, "seeded user");
    users.insert(seeded).await;

    let app = UserApi::new(users).routes(Router::new());

    Server::bind(&config.addr)?
        .serve(RequestLogger::new(config.identity).wrap(app))
        .await
}
