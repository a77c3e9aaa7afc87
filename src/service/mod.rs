pub mod date_service;
pub mod flight_service;
pub mod metrics_service;
pub mod provider_service;
