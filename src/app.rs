use crate::config::environment::AppConfig;
use crate::infra::InfraClients;
use crate::module::rate_snapshot::crud::SnapshotStore;
use crate::module::rate_snapshot::route::register_routes;
use crate::service::flight_service::FlightGuards;
use axum::http::Method;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Debug, Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<SnapshotStore>,
    pub infra: Option<InfraClients>,
    pub flights: Arc<FlightGuards>,
}

impl AppState {
    pub fn new(config: AppConfig, infra: Option<InfraClients>) -> Self {
        Self {
            config,
            store: Arc::new(SnapshotStore::default()),
            infra,
            flights: Arc::new(FlightGuards::default()),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);

    register_routes(state).layer(cors)
}
