use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers::{
    decode_handler, encode_handler, health_handler, not_found_handler, redirect_handler,
};
use crate::state::AppState;

pub struct App {}

impl App {
    pub fn router(state: AppState) -> Router {
        Router::new()
            .route("/", get(health_handler))
            .route("/encode", post(encode_handler))
            .route("/decode/{short_code}", get(decode_handler))
            // single-segment catch-all; static routes above take priority
            .route("/{short_code}", get(redirect_handler))
            .fallback(not_found_handler)
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}
