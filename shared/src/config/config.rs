use std::fs;
use tracing::{debug, error, info};

use crate::gate::normalize_path;
use crate::types::server_config::{AppConfig, ConfigError};

pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    info!("Loading configuration from: {}", path);

    let contents = fs::read_to_string(path)?;
    debug!("Processing file: {}", path);

    if contents.trim().is_empty() {
        error!("Configuration file is empty");
        return Err(ConfigError::InvalidConfig("empty file".into()));
    }

    let config: AppConfig = toml::from_str(&contents)?;

    info!("Configuration loaded successfully");
    debug!("Config: {:?}", config);

    validate_config(&config)?;

    info!("Config validated");

    Ok(config)
}

pub fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.paths.web_dir.is_empty() {
        return Err(ConfigError::InvalidConfig("web_dir cannot be empty".into()));
    }

    if config.server.max_connections == 0 {
        return Err(ConfigError::InvalidConfig(
            "max_connections must be greater than 0".into(),
        ));
    }

    if config.server.request_timeout_secs == 0 {
        return Err(ConfigError::InvalidConfig(
            "request_timeout_secs must be greater than 0".into(),
        ));
    }

    // The simulated latency has to fit inside the request timeout.
    if config.session.latency() >= config.server.request_timeout() {
        return Err(ConfigError::InvalidConfig(
            "latency_ms must be shorter than request_timeout_secs".into(),
        ));
    }

    let cookie = &config.session.cookie_name;
    if cookie.is_empty()
        || !cookie
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(ConfigError::InvalidConfig(format!(
            "cookie_name {:?} must be non-empty and alphanumeric",
            cookie
        )));
    }

    for p in &config.session.extra_public_paths {
        if !p.starts_with('/') {
            return Err(ConfigError::InvalidConfig(format!(
                "public path {:?} must start with '/'",
                p
            )));
        }
        if normalize_path(p).starts_with("/api/") {
            return Err(ConfigError::InvalidConfig(format!(
                "public path {:?} may not expose an API route",
                p
            )));
        }
    }

    Ok(())
}
