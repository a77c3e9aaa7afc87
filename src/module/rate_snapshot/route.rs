use axum::routing::get;
use axum::Router;

use crate::app::AppState;
use crate::module::rate_snapshot::controller;

pub fn register_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(controller::health))
        .route("/latest", get(controller::get_latest))
        .route("/range", get(controller::get_range))
        .route("/:date", get(controller::get_by_date))
        .with_state(state)
}
