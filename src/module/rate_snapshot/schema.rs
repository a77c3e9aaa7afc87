use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotResponse {
    pub success: bool,
    pub date: String,
    pub timestamp: i64,
    pub historical: bool,
    pub base: String,
    pub rates: HashMap<String, f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RangeQuery {
    pub start_date: String,
    pub end_date: String,
    pub symbols: Option<String>,
    pub base: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangeResponse {
    pub success: bool,
    pub start_date: String,
    pub end_date: String,
    pub base: String,
    pub rates: BTreeMap<String, HashMap<String, f64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error_code: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub cached_snapshots: usize,
    pub metrics: MetricsView,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsView {
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub upstream_fetches: u64,
    pub upstream_failures: u64,
    pub snapshots_persisted: u64,
}
