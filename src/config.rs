use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub scraper: ScraperConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// Fetch timeout in seconds. A fetch that exceeds this is reported as a
    /// timeout, distinct from other network failures.
    pub request_timeout: u64,
    /// Domains a product URL may belong to. Checked before any network call.
    pub allowed_domains: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding `products.csv` and the `price_history/` files.
    pub data_dir: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8501)?
            .set_default("scraper.request_timeout", 30)?
            .set_default("scraper.allowed_domains", vec!["meritocomercial.com.br"])?
            .set_default("storage.data_dir", "data")?
            // Optional configuration files layered over the defaults
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(File::with_name("config/local").required(false))
            // Environment variables with prefix "VIGIA_"
            .add_source(Environment::with_prefix("VIGIA").separator("__"))
            .build()?;

        let config: AppConfig = s.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Message(
                "Server port must be greater than 0".into(),
            ));
        }

        if self.scraper.request_timeout == 0 {
            return Err(ConfigError::Message(
                "Scraper request_timeout must be greater than 0".into(),
            ));
        }

        if self.scraper.allowed_domains.is_empty() {
            return Err(ConfigError::Message(
                "At least one allowed domain is required".into(),
            ));
        }

        if self.storage.data_dir.trim().is_empty() {
            return Err(ConfigError::Message(
                "Storage data_dir must not be empty".into(),
            ));
        }

        Ok(())
    }
}
