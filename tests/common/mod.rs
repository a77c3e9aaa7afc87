#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{NaiveDate, NaiveTime, Utc};
use fx_rate_cache::config::environment::AppConfig;
use http::Request;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::util::ServiceExt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderMode {
    Ok,
    Rejected,
    Malformed,
}

#[derive(Clone)]
struct ProviderState {
    mode: ProviderMode,
    hits: Arc<AtomicU64>,
}

pub struct MockProvider {
    pub base_url: String,
    hits: Arc<AtomicU64>,
}

impl MockProvider {
    pub fn hit_count(&self) -> u64 {
        self.hits.load(Ordering::SeqCst)
    }
}

pub async fn spawn_provider(mode: ProviderMode) -> MockProvider {
    let hits = Arc::new(AtomicU64::new(0));
    let state = ProviderState {
        mode,
        hits: hits.clone(),
    };
    let router = Router::new()
        .route("/api/:token", get(serve_token))
        .with_state(state);
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock provider");
    let addr = listener.local_addr().expect("mock provider addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("mock provider serve");
    });
    MockProvider {
        base_url: format!("http://{addr}"),
        hits,
    }
}

async fn serve_token(
    State(state): State<ProviderState>,
    Path(token): Path<String>,
) -> Json<Value> {
    state.hits.fetch_add(1, Ordering::SeqCst);
    match state.mode {
        ProviderMode::Rejected => Json(json!({
            "success": false,
            "error": { "code": 105, "type": "function_access_restricted" }
        })),
        ProviderMode::Malformed => Json(json!({
            "success": true,
            "rates": "not-a-map"
        })),
        ProviderMode::Ok => {
            let mut payload = json!({
                "success": true,
                "base": "EUR",
                "rates": { "USD": 1.09, "GBP": 0.85, "JPY": 161.2 }
            });
            if token == "latest" {
                payload["timestamp"] = json!(Utc::now().timestamp());
            } else {
                let date = NaiveDate::parse_from_str(&token, "%Y-%m-%d").expect("token date");
                // an intra-day instant, as the real provider reports
                let ts = date.and_time(NaiveTime::MIN).and_utc().timestamp() + 3600;
                payload["timestamp"] = json!(ts);
                payload["historical"] = json!(true);
            }
            Json(payload)
        }
    }
}

pub fn test_config(provider_base_url: &str) -> AppConfig {
    AppConfig {
        rust_env: "test".to_string(),
        api_host: "127.0.0.1".to_string(),
        api_port: 0,
        mongodb_url: None,
        mongodb_database: None,
        provider_base_url: provider_base_url.to_string(),
        provider_access_key: "test-key".to_string(),
        base_currency: "EUR".to_string(),
        provider_timeout_seconds: 2,
        provider_max_retries: 0,
        provider_backoff_base_ms: 10,
    }
}

pub async fn get_json<TResp: serde::de::DeserializeOwned>(
    app: axum::Router,
    path: &str,
) -> (http::StatusCode, TResp) {
    let request = Request::builder()
        .method("GET")
        .uri(path)
        .body(Body::empty())
        .expect("build request");
    let response = app.oneshot(request).await.expect("response");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let payload: TResp = serde_json::from_slice(&body).expect("parse body");
    (status, payload)
}
