use crate::config::environment::AppConfig;
use crate::module::rate_snapshot::error::AppError;
use crate::module::rate_snapshot::model::RateSnapshot;
use crate::service::date_service::{self, DateToken, DayWindow};
use crate::service::metrics_service;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

#[derive(Debug, Deserialize)]
struct ProviderPayload {
    success: bool,
    timestamp: i64,
    historical: Option<bool>,
    base: String,
    rates: HashMap<String, f64>,
}

pub async fn fetch_snapshot(
    config: &AppConfig,
    token: &DateToken,
    window: &DayWindow,
) -> Result<RateSnapshot, AppError> {
    let endpoint = format!(
        "{}/api/{}?access_key={}",
        config.provider_base_url.trim_end_matches('/'),
        date_service::provider_token(token),
        config.provider_access_key
    );

    let client = Client::builder()
        .timeout(Duration::from_secs(config.provider_timeout_seconds))
        .build()
        .map_err(|e| {
            AppError::internal("HTTP_CLIENT_ERROR", format!("failed to build http client: {e}"))
        })?;

    metrics_service::inc_upstream_fetches();
    let value = request_with_retry(config, &client, &endpoint).await.map_err(|err| {
        metrics_service::inc_upstream_failures();
        err
    })?;

    if value.get("success").and_then(Value::as_bool) != Some(true) {
        metrics_service::inc_upstream_failures();
        return Err(AppError::service_unavailable(
            "UPSTREAM_REJECTED",
            "rate provider rejected the request",
        ));
    }

    let payload: ProviderPayload = serde_json::from_value(value).map_err(|e| {
        metrics_service::inc_upstream_failures();
        AppError::service_unavailable(
            "UPSTREAM_MALFORMED_RESPONSE",
            format!("unexpected rate provider payload: {e}"),
        )
    })?;

    if payload.timestamp < window.start || payload.timestamp >= window.end {
        warn!(
            provider_timestamp = payload.timestamp,
            day_start = window.start,
            "provider instant falls outside the requested day window"
        );
    }

    Ok(RateSnapshot {
        success: payload.success,
        // stored under the requested day, not the provider's intra-day instant
        timestamp: window.start,
        historical: payload.historical.unwrap_or(false),
        base: payload.base.to_uppercase(),
        rates: payload.rates,
    })
}

async fn request_with_retry(
    config: &AppConfig,
    client: &Client,
    endpoint: &str,
) -> Result<Value, AppError> {
    let mut attempt: u64 = 0;
    loop {
        match try_request(client, endpoint).await {
            Ok(value) => return Ok(value),
            Err(reason) if attempt < config.provider_max_retries => {
                attempt += 1;
                warn!(attempt, reason = %reason, "rate provider request failed; retrying");
                sleep(Duration::from_millis(config.provider_backoff_base_ms * attempt)).await;
            }
            Err(reason) => {
                return Err(AppError::service_unavailable(
                    "UPSTREAM_TRANSPORT_ERROR",
                    reason,
                ));
            }
        }
    }
}

async fn try_request(client: &Client, endpoint: &str) -> Result<Value, String> {
    let resp = client
        .get(endpoint)
        .send()
        .await
        .map_err(|e| format!("rate provider request failed: {e}"))?;

    if !resp.status().is_success() {
        return Err(format!(
            "rate provider returned non-success status: {}",
            resp.status()
        ));
    }

    resp.json::<Value>()
        .await
        .map_err(|e| format!("failed to read rate provider body: {e}"))
}
