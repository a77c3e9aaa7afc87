use super::error::AppError;
use super::model::RateSnapshot;
use super::schema::{RangeQuery, RangeResponse};
use crate::app::AppState;
use crate::infra::{InfraClients, SNAPSHOTS_COLLECTION};
use crate::service::date_service::{self, DateToken, DayWindow};
use crate::service::metrics_service;
use crate::service::provider_service;
use chrono::Days;
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::Collection;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};
use tracing::{info, warn};

/// Process-local warm cache over the mongo collection, keyed by
/// (base, day start). Every entry was either written through to mongo or
/// read back from it.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    inner: Mutex<HashMap<(String, i64), RateSnapshot>>,
}

impl SnapshotStore {
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .map(|inner| inner.len())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub async fn get_snapshot(state: &AppState, token: DateToken) -> Result<RateSnapshot, AppError> {
    let window = date_service::day_window(&token)?;
    let base = state.config.base_currency.clone();

    if let Some(found) = find_by_window(state, &base, &window).await? {
        metrics_service::inc_cache_hits();
        return Ok(found);
    }

    // collapse concurrent misses for the same day into one fetch
    let guard = state.flights.guard(&base, window.start);
    let _leader = guard.lock().await;

    if let Some(found) = find_by_window(state, &base, &window).await? {
        metrics_service::inc_cache_hits();
        return Ok(found);
    }

    metrics_service::inc_cache_misses();
    let snapshot = provider_service::fetch_snapshot(&state.config, &token, &window).await?;
    if snapshot.base != base {
        warn!(
            requested = %base,
            received = %snapshot.base,
            "provider returned a different base currency; cached under the received base"
        );
    }
    insert_snapshot(state, &snapshot).await?;
    Ok(snapshot)
}

pub async fn get_range(state: &AppState, query: RangeQuery) -> Result<RangeResponse, AppError> {
    let start = date_service::parse_iso_date(&query.start_date)?;
    let end = date_service::parse_iso_date(&query.end_date)?;
    if start > end {
        return Err(AppError::bad_request(
            "INVALID_DATE_RANGE",
            "start_date must not be after end_date",
        ));
    }

    let base = query
        .base
        .as_deref()
        .map(str::to_uppercase)
        .unwrap_or_else(|| state.config.base_currency.clone());
    let symbols = parse_symbols(query.symbols.as_deref());

    // end date itself is included
    let day_after_end = end.checked_add_days(Days::new(1)).ok_or_else(|| {
        AppError::bad_request("INVALID_DATE_FORMAT", format!("no day follows {end}"))
    })?;
    let window_start = date_service::day_start(start);
    let window_end = date_service::day_start(day_after_end);

    let rows = find_range(state, &base, window_start, window_end).await?;

    let mut rates: BTreeMap<String, HashMap<String, f64>> = BTreeMap::new();
    for snapshot in rows {
        let day = date_service::iso_day(snapshot.timestamp)?;
        rates.insert(day, project_rates(snapshot.rates, &symbols));
    }

    // an empty window is a valid answer, not an error
    Ok(RangeResponse {
        success: true,
        start_date: query.start_date,
        end_date: query.end_date,
        base,
        rates,
    })
}

async fn find_by_window(
    state: &AppState,
    base: &str,
    window: &DayWindow,
) -> Result<Option<RateSnapshot>, AppError> {
    let warm = lock_store(&state.store)?
        .get(&(base.to_string(), window.start))
        .cloned();
    if warm.is_some() {
        return Ok(warm);
    }

    let Some(infra) = &state.infra else {
        return Ok(None);
    };

    let collection = snapshots(infra);
    let found = collection
        .find_one(doc! {
            "base": base,
            "timestamp": { "$gte": window.start, "$lt": window.end },
        })
        .await
        .map_err(|e| {
            AppError::service_unavailable("CACHE_READ_ERROR", format!("mongodb read failed: {e}"))
        })?;

    if let Some(snapshot) = &found {
        warm_store(state, snapshot)?;
    }
    Ok(found)
}

async fn insert_snapshot(state: &AppState, snapshot: &RateSnapshot) -> Result<(), AppError> {
    if let Some(infra) = &state.infra {
        let collection = snapshots(infra);
        if let Err(e) = collection.insert_one(snapshot).await {
            if is_duplicate_key(&e) {
                // another process stored this day first; a day's rates are
                // immutable, so the copies are equivalent
                info!(base = %snapshot.base, timestamp = snapshot.timestamp, "snapshot already persisted for this day");
            } else {
                return Err(AppError::internal(
                    "PERSISTENCE_ERROR",
                    format!("mongodb insert failed: {e}"),
                ));
            }
        }
    }

    warm_store(state, snapshot)?;
    metrics_service::inc_snapshots_persisted();
    Ok(())
}

async fn find_range(
    state: &AppState,
    base: &str,
    window_start: i64,
    window_end: i64,
) -> Result<Vec<RateSnapshot>, AppError> {
    let Some(infra) = &state.infra else {
        let store = lock_store(&state.store)?;
        let mut rows: Vec<RateSnapshot> = store
            .values()
            .filter(|s| s.base == base && s.timestamp >= window_start && s.timestamp < window_end)
            .cloned()
            .collect();
        rows.sort_by_key(|s| s.timestamp);
        return Ok(rows);
    };

    let collection = snapshots(infra);
    let cursor = collection
        .find(doc! {
            "base": base,
            "timestamp": { "$gte": window_start, "$lt": window_end },
        })
        .sort(doc! { "timestamp": 1 })
        .await
        .map_err(|e| {
            AppError::service_unavailable("CACHE_READ_ERROR", format!("mongodb query failed: {e}"))
        })?;

    cursor.try_collect().await.map_err(|e| {
        AppError::service_unavailable("CACHE_READ_ERROR", format!("mongodb cursor failed: {e}"))
    })
}

fn snapshots(infra: &InfraClients) -> Collection<RateSnapshot> {
    infra.mongo_db.collection(SNAPSHOTS_COLLECTION)
}

fn warm_store(state: &AppState, snapshot: &RateSnapshot) -> Result<(), AppError> {
    lock_store(&state.store)?.insert(
        (snapshot.base.clone(), snapshot.timestamp),
        snapshot.clone(),
    );
    Ok(())
}

fn lock_store(
    store: &SnapshotStore,
) -> Result<MutexGuard<'_, HashMap<(String, i64), RateSnapshot>>, AppError> {
    store
        .inner
        .lock()
        .map_err(|_| AppError::internal("STORE_POISONED", "snapshot store lock poisoned"))
}

fn parse_symbols(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_uppercase)
        .collect()
}

fn project_rates(rates: HashMap<String, f64>, symbols: &[String]) -> HashMap<String, f64> {
    if symbols.is_empty() {
        return rates;
    }
    rates
        .into_iter()
        .filter(|(code, _)| symbols.contains(code))
        .collect()
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(we)) if we.code == 11_000
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_parse_trims_and_uppercases() {
        assert_eq!(parse_symbols(Some("usd, gbp,")), vec!["USD", "GBP"]);
        assert!(parse_symbols(None).is_empty());
        assert!(parse_symbols(Some("")).is_empty());
    }

    #[test]
    fn projection_keeps_only_requested_symbols() {
        let rates = HashMap::from([
            ("USD".to_string(), 1.1),
            ("GBP".to_string(), 0.85),
            ("JPY".to_string(), 160.0),
        ]);
        let projected = project_rates(rates.clone(), &["USD".to_string(), "GBP".to_string()]);
        assert_eq!(projected.len(), 2);
        assert!(projected.contains_key("USD"));
        assert!(projected.contains_key("GBP"));

        let full = project_rates(rates, &[]);
        assert_eq!(full.len(), 3);
    }
}
