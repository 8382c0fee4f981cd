use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/display", get(handlers::get_display))
        .route("/api/cycle", get(handlers::get_cycle))
        .route("/api/visibility", post(handlers::visibility))
        .route("/api/interaction", post(handlers::interaction))
        .route("/silence.wav", get(handlers::silence))
        .with_state(state)
}
