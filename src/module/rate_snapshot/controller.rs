use super::crud;
use super::error::AppError;
use super::model::RateSnapshot;
use super::schema::{ErrorResponse, HealthResponse, MetricsView, RangeQuery, SnapshotResponse};
use crate::app::AppState;
use crate::service::date_service::{self, DateToken};
use crate::service::metrics_service;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use tracing::{error, info};

pub async fn get_latest(State(state): State<AppState>) -> impl IntoResponse {
    let started = metrics_service::start_timer();
    match crud::get_snapshot(&state, DateToken::Latest)
        .await
        .and_then(snapshot_reply)
    {
        Ok(resp) => {
            info!(
                date = %resp.date,
                base = %resp.base,
                elapsed_ms = metrics_service::elapsed_ms(started),
                "latest snapshot served"
            );
            (axum::http::StatusCode::OK, Json(resp)).into_response()
        }
        Err(err) => error_reply(err, started, "latest"),
    }
}

pub async fn get_by_date(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> impl IntoResponse {
    let started = metrics_service::start_timer();
    let result = match date_service::classify(&date) {
        Ok(token) => crud::get_snapshot(&state, token).await.and_then(snapshot_reply),
        Err(err) => Err(err),
    };
    match result {
        Ok(resp) => {
            info!(
                date = %resp.date,
                base = %resp.base,
                historical = resp.historical,
                elapsed_ms = metrics_service::elapsed_ms(started),
                "snapshot served"
            );
            (axum::http::StatusCode::OK, Json(resp)).into_response()
        }
        Err(err) => error_reply(err, started, &date),
    }
}

pub async fn get_range(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> impl IntoResponse {
    let started = metrics_service::start_timer();
    let requested = format!("{}..{}", query.start_date, query.end_date);
    match crud::get_range(&state, query).await {
        Ok(resp) => {
            info!(
                start_date = %resp.start_date,
                end_date = %resp.end_date,
                base = %resp.base,
                days = resp.rates.len(),
                elapsed_ms = metrics_service::elapsed_ms(started),
                "range served"
            );
            (axum::http::StatusCode::OK, Json(resp)).into_response()
        }
        Err(err) => error_reply(err, started, &requested),
    }
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let metrics = metrics_service::snapshot();
    Json(HealthResponse {
        status: "ok".to_string(),
        cached_snapshots: state.store.len(),
        metrics: MetricsView {
            cache_hits: metrics.cache_hits,
            cache_misses: metrics.cache_misses,
            upstream_fetches: metrics.upstream_fetches,
            upstream_failures: metrics.upstream_failures,
            snapshots_persisted: metrics.snapshots_persisted,
        },
    })
}

fn snapshot_reply(snapshot: RateSnapshot) -> Result<SnapshotResponse, AppError> {
    Ok(SnapshotResponse {
        success: snapshot.success,
        date: date_service::iso_day(snapshot.timestamp)?,
        timestamp: snapshot.timestamp,
        historical: snapshot.historical,
        base: snapshot.base,
        rates: snapshot.rates,
    })
}

fn error_reply(err: AppError, started: std::time::Instant, requested: &str) -> axum::response::Response {
    let AppError {
        status,
        code,
        message,
    } = err;
    error!(
        error_code = code,
        reason = %message,
        requested = %requested,
        elapsed_ms = metrics_service::elapsed_ms(started),
        "request failed"
    );
    (
        status,
        Json(ErrorResponse {
            success: false,
            error_code: code.to_string(),
            reason: message,
        }),
    )
        .into_response()
}
