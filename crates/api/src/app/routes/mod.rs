use axum::{
    Router,
    routing::{get, post},
};

pub mod cart;
pub mod dashboard;
pub mod inventory;
pub mod search;
pub mod session;
pub mod settings;
pub mod system;
pub mod transactions;

/// Router for all endpoints behind the login gate.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/stream", get(system::stream))
        .route("/session/logout", post(session::logout))
        .route("/dashboard", get(dashboard::dashboard))
        .route("/search", get(search::search))
        .route("/transactions", get(transactions::list))
        .route("/settings", get(settings::get_settings).put(settings::update_settings))
        .nest("/inventory", inventory::router())
        .nest("/cart", cart::router())
}
