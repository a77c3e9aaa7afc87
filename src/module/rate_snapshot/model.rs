use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One persisted exchange-rate record for a base currency on a UTC day.
/// `timestamp` is unix seconds, normalized to the day's midnight so the
/// (base, timestamp) pair is the cache key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateSnapshot {
    pub success: bool,
    pub timestamp: i64,
    pub historical: bool,
    pub base: String,
    pub rates: HashMap<String, f64>,
}
