//! Configuration module for boxoffice-server.
//!
//! Handles loading configuration from TOML files, CLI arguments,
//! and environment variables.

pub mod file;
pub mod runtime;

use crate::config::file::FileConfig;
use crate::config::runtime::RuntimeConfig;
use boxoffice_core::entities::{PriceTable, TicketType};
use boxoffice_core::partners::PartnerRoute;
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("DATABASE_URL environment variable not set")]
    MissingDatabaseUrl,
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: std::path::PathBuf,
    listen_override: Option<SocketAddr>,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(config_path: impl AsRef<Path>, listen_override: Option<SocketAddr>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            listen_override,
        }
    }

    /// Read, override, validate and convert the configuration file.
    pub fn load(&self) -> Result<RuntimeConfig, ConfigError> {
        let config_content = std::fs::read_to_string(&self.config_path)?;
        self.load_str(&config_content)
    }

    fn load_str(&self, config_content: &str) -> Result<RuntimeConfig, ConfigError> {
        let mut file_config: FileConfig = toml::from_str(config_content)?;

        // Apply CLI overrides
        if let Some(listen) = self.listen_override {
            file_config.server.listen = listen;
        }

        self.validate(&file_config)?;
        self.build_runtime_config(file_config)
    }

    fn validate(&self, config: &FileConfig) -> Result<(), ConfigError> {
        if config.partners.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "partners.timeout_secs must be greater than zero".to_string(),
            ));
        }

        let mut ids = HashSet::new();
        for route in &config.partners.routes {
            if !ids.insert(route.id) {
                return Err(ConfigError::ValidationError(format!(
                    "partner {} is routed more than once",
                    route.id
                )));
            }
        }

        for (name, multiplier) in [
            ("full", config.pricing.full),
            ("half", config.pricing.half),
        ] {
            if multiplier <= Decimal::ZERO {
                return Err(ConfigError::ValidationError(format!(
                    "pricing.{name} must be greater than zero, got {multiplier}"
                )));
            }
        }
        Ok(())
    }

    fn build_runtime_config(&self, file_config: FileConfig) -> Result<RuntimeConfig, ConfigError> {
        let prices = PriceTable::new([
            (TicketType::Full, file_config.pricing.full),
            (TicketType::Half, file_config.pricing.half),
        ])
        .map_err(|e| ConfigError::ValidationError(e.to_string()))?;

        let partner_routes = file_config
            .partners
            .routes
            .into_iter()
            .map(|r| PartnerRoute {
                id: r.id,
                kind: r.kind,
                base_url: r.base_url,
            })
            .collect();

        Ok(RuntimeConfig {
            listen: file_config.server.listen,
            partner_routes,
            partner_timeout: Duration::from_secs(file_config.partners.timeout_secs),
            prices,
        })
    }
}

/// Get the database URL from the environment.
pub fn get_database_url() -> Result<String, ConfigError> {
    std::env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)
}
