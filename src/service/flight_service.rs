use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::Mutex as AsyncMutex;

/// Per-key guards collapsing concurrent cache misses for the same
/// (base, day) into a single upstream fetch. The holder of the lock is the
/// leader; followers re-check the cache once the lock is released.
#[derive(Debug, Default)]
pub struct FlightGuards {
    inner: Mutex<HashMap<(String, i64), Arc<AsyncMutex<()>>>>,
}

impl FlightGuards {
    pub fn guard(&self, base: &str, day_start: i64) -> Arc<AsyncMutex<()>> {
        // the map holds only lock handles, so a poisoned map is still usable
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner
            .entry((base.to_string(), day_start))
            .or_default()
            .clone()
    }
}
