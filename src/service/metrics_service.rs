use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

static CACHE_HITS: AtomicU64 = AtomicU64::new(0);
static CACHE_MISSES: AtomicU64 = AtomicU64::new(0);
static UPSTREAM_FETCHES: AtomicU64 = AtomicU64::new(0);
static UPSTREAM_FAILURES: AtomicU64 = AtomicU64::new(0);
static SNAPSHOTS_PERSISTED: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub upstream_fetches: u64,
    pub upstream_failures: u64,
    pub snapshots_persisted: u64,
}

pub fn inc_cache_hits() {
    CACHE_HITS.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_cache_misses() {
    CACHE_MISSES.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_upstream_fetches() {
    UPSTREAM_FETCHES.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_upstream_failures() {
    UPSTREAM_FAILURES.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_snapshots_persisted() {
    SNAPSHOTS_PERSISTED.fetch_add(1, Ordering::Relaxed);
}

pub fn start_timer() -> Instant {
    Instant::now()
}

pub fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

pub fn snapshot() -> MetricsSnapshot {
    MetricsSnapshot {
        cache_hits: CACHE_HITS.load(Ordering::Relaxed),
        cache_misses: CACHE_MISSES.load(Ordering::Relaxed),
        upstream_fetches: UPSTREAM_FETCHES.load(Ordering::Relaxed),
        upstream_failures: UPSTREAM_FAILURES.load(Ordering::Relaxed),
        snapshots_persisted: SNAPSHOTS_PERSISTED.load(Ordering::Relaxed),
    }
}
