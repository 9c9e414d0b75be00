// src/config.rs - Configuration for the BD Doc client
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use anyhow::{Context, Result};

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SessionConfig {
    pub store_path: String,
    pub ttl_days: i64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api/v1".to_string(),
            timeout_seconds: 30,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            store_path: "bddoc_session.json".to_string(),
            // Токены живут неделю, как и куки веб-клиента
            ttl_days: 7,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            session: SessionConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

pub fn load_config() -> Result<Config> {
    load_env_file()?;

    let mut config = if let Ok(config_file) = env::var("CONFIG_FILE") {
        let path = Path::new(&config_file);
        let config_str = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", config_file))?;
        toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", config_file))?
    } else {
        Config::default()
    };

    override_with_env(&mut config);

    config.validate()
        .context("Configuration validation failed")?;

    Ok(config)
}

fn override_with_env(config: &mut Config) {
    if let Ok(base_url) = env::var("BDDOC_API_URL") {
        config.api.base_url = base_url;
    }
    if let Ok(timeout_str) = env::var("BDDOC_API_TIMEOUT_SECONDS") {
        if let Ok(timeout) = timeout_str.parse::<u64>() {
            config.api.timeout_seconds = timeout;
        }
    }
    if let Ok(store_path) = env::var("BDDOC_SESSION_PATH") {
        config.session.store_path = store_path;
    }
    if let Ok(ttl_str) = env::var("BDDOC_SESSION_TTL_DAYS") {
        if let Ok(ttl) = ttl_str.parse::<i64>() {
            config.session.ttl_days = ttl;
        }
    }
    if let Ok(level) = env::var("RUST_LOG") {
        config.logging.level = level;
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://") {
            return Err(anyhow::anyhow!(
                "api.base_url must start with http:// or https:// (current: {})",
                self.api.base_url
            ));
        }

        if self.api.timeout_seconds == 0 {
            return Err(anyhow::anyhow!("api.timeout_seconds must be positive"));
        }

        if self.session.ttl_days <= 0 {
            return Err(anyhow::anyhow!(
                "session.ttl_days must be positive (current: {})",
                self.session.ttl_days
            ));
        }

        Ok(())
    }
}

pub fn load_env_file() -> Result<()> {
    if let Ok(env_file) = env::var("ENV_FILE") {
        dotenvy::from_filename(&env_file)
            .with_context(|| format!("Failed to load environment file: {}", env_file))?;
    } else if Path::new(".env").exists() {
        dotenvy::dotenv().context("Failed to load .env file")?;
    }
    Ok(())
}
