use anyhow::Result;
use dotenvy::dotenv;
use service_core::config::Config as CommonConfig;
use std::env;

#[derive(Clone, Debug)]
pub struct FeesConfig {
    pub common: CommonConfig,
    pub service_name: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub database: DatabaseConfig,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

impl FeesConfig {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let port = env::var("FEES_SERVICE_PORT")
            .unwrap_or_else(|_| "3006".to_string())
            .parse()?;

        let database_url = env::var("FEES_DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("FEES_DATABASE_URL must be set"))?;
        let max_connections = env::var("FEES_DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()?;
        let min_connections = env::var("FEES_DB_MIN_CONNECTIONS")
            .unwrap_or_else(|_| "1".to_string())
            .parse()?;

        Ok(Self {
            common: CommonConfig { port },
            service_name: "fees-service".to_string(),
            log_level: env::var("FEES_LOG_LEVEL")
                .unwrap_or_else(|_| "info,fees_service=debug".to_string()),
            otlp_endpoint: env::var("FEES_OTLP_ENDPOINT").ok(),
            database: DatabaseConfig {
                url: database_url,
                max_connections,
                min_connections,
            },
        })
    }
}
