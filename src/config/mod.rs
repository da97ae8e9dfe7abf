use anyhow::{Context, Result};
use dotenvy::dotenv;
use secrecy::Secret;
use std::env;

#[derive(Clone)]
pub struct Config {
    pub service_name: String,
    pub log_level: String,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
}

#[derive(Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Clone)]
pub struct DatabaseConfig {
    pub url: Secret<String>,
    pub max_connections: u32,
    pub min_connections: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let host = env::var("FAKTURA_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("FAKTURA_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .context("FAKTURA_PORT must be a valid port number")?;

        let database_url =
            env::var("FAKTURA_DATABASE_URL").context("FAKTURA_DATABASE_URL must be set")?;
        let max_connections = env::var("FAKTURA_DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("FAKTURA_DB_MAX_CONNECTIONS must be a number")?;
        let min_connections = env::var("FAKTURA_DB_MIN_CONNECTIONS")
            .unwrap_or_else(|_| "1".to_string())
            .parse()
            .context("FAKTURA_DB_MIN_CONNECTIONS must be a number")?;

        let log_level = env::var("FAKTURA_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            service_name: "faktura-service".to_string(),
            log_level,
            server: ServerConfig { host, port },
            database: DatabaseConfig {
                url: Secret::new(database_url),
                max_connections,
                min_connections,
            },
        })
    }
}
