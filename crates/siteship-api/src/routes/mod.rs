//! API routes.

pub mod deploy;
pub mod health;
pub mod publish;

use axum::Router;

use crate::AppState;

/// Build the main API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_router())
        .merge(health::router())
        .with_state(state)
}

fn api_router() -> Router<AppState> {
    Router::new().merge(publish::router()).merge(deploy::router())
}
