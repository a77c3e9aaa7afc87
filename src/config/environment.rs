use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub rust_env: String,
    pub api_host: String,
    pub api_port: u16,
    pub mongodb_url: Option<String>,
    pub mongodb_database: Option<String>,
    pub provider_base_url: String,
    pub provider_access_key: String,
    pub base_currency: String,
    pub provider_timeout_seconds: u64,
    pub provider_max_retries: u64,
    pub provider_backoff_base_ms: u64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        load_dotenv_layers();
        Ok(Self {
            rust_env: read_var("RUST_ENV")?,
            api_host: read_var("API_HOST")?,
            api_port: read_var("API_PORT")?
                .parse::<u16>()
                .map_err(|e| format!("invalid API_PORT: {e}"))?,
            mongodb_url: env::var("MONGODB_URL").ok(),
            mongodb_database: env::var("MONGODB_DATABASE").ok(),
            provider_base_url: read_optional_string("PROVIDER_BASE_URL", "http://data.fixer.io"),
            provider_access_key: read_var("PROVIDER_ACCESS_KEY")?,
            base_currency: read_optional_string("BASE_CURRENCY", "EUR").to_uppercase(),
            provider_timeout_seconds: read_optional_u64("PROVIDER_TIMEOUT_SECONDS", 10)?,
            provider_max_retries: read_optional_u64("PROVIDER_MAX_RETRIES", 2)?,
            provider_backoff_base_ms: read_optional_u64("PROVIDER_BACKOFF_BASE_MS", 250)?,
        })
    }
}

fn read_var(key: &str) -> Result<String, String> {
    env::var(key).map_err(|_| format!("missing required env var: {key}"))
}

fn read_optional_u64(key: &str, default: u64) -> Result<u64, String> {
    match env::var(key) {
        Ok(v) => v.parse::<u64>().map_err(|e| format!("invalid {key}: {e}")),
        Err(_) => Ok(default),
    }
}

fn read_optional_string(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn load_dotenv_layers() {
    for path in [".env", "../.env"] {
        let _ = dotenvy::from_path_override(path);
    }
}
