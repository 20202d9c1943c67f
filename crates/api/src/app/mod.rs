//! Router assembly.
//!
//! - `services.rs`: store-backed services, the login gate, session carts, SSE
//! - `routes/`: one file per screen of the till
//! - `dto.rs`: request bodies and response views
//! - `errors.rs`: `{error, message}` failure bodies
//! - `extract.rs`: body/query extractors that fail with those bodies

use std::sync::Arc;

use axum::{
    Extension, Router,
    routing::{get, post},
};
use tower::ServiceBuilder;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod extract;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Build the full HTTP router (used by `main.rs` and the API tests).
pub fn build_app(services: Arc<AppServices>) -> Router {
    let auth_state = middleware::AuthState {
        tokens: services.tokens(),
        revoked: services.revoked(),
    };

    // Protected routes: require a valid session token.
    let protected = routes::router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    Router::new()
        .route("/health", get(routes::system::health))
        .route("/session/login", post(routes::session::login))
        .merge(protected)
        .layer(ServiceBuilder::new().layer(Extension(services)))
}
