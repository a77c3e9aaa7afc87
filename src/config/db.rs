use crate::config::environment::AppConfig;

#[derive(Debug, Clone)]
pub struct MongoConfig {
    pub url: Option<String>,
    pub database: String,
}

impl MongoConfig {
    pub fn from_app(app: &AppConfig) -> Self {
        Self {
            url: app.mongodb_url.clone(),
            database: app
                .mongodb_database
                .clone()
                .unwrap_or_else(|| "fx_rate_cache".to_string()),
        }
    }
}
