//! Maps HTTP paths to handlers.

use axum::routing::{get, post};
use axum::{middleware, Router};

use super::{auth, handlers, SharedState};

/// Build the application router. Everything under `/api` requires a function
/// key; `/` is an unauthenticated liveness check.
pub fn router(state: SharedState) -> Router {
    let api = Router::new()
        .route("/scrape", post(handlers::scrape))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_function_key,
        ));

    Router::new()
        .route("/", get(handlers::root))
        .nest("/api", api)
        .with_state(state)
}
