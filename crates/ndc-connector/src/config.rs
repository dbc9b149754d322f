//! Server configuration from environment variables.

use anyhow::{Context, Result};
use tracing::Level;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Path of the connector configuration file.
    pub configuration: String,
    pub port: u16,
    pub log_level: Level,
    /// When set, every request must carry `Authorization: Bearer <token>`.
    pub service_token: Option<String>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            configuration: std::env::var("NDC_CONFIGURATION")
                .unwrap_or_else(|_| "config.json".to_string()),
            port: std::env::var("NDC_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("Invalid NDC_PORT")?,
            log_level: std::env::var("NDC_LOG_LEVEL")
                .unwrap_or_else(|_| "info".to_string())
                .parse()
                .context("Invalid NDC_LOG_LEVEL")?,
            service_token: std::env::var("NDC_SERVICE_TOKEN")
                .ok()
                .filter(|t| !t.is_empty()),
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn clear_env() {
        for key in [
            "NDC_CONFIGURATION",
            "NDC_PORT",
            "NDC_LOG_LEVEL",
            "NDC_SERVICE_TOKEN",
        ] {
            unsafe { std::env::remove_var(key) };
        }
    }

    #[test]
    fn from_env_defaults() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env();

        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.configuration, "config.json");
        assert_eq!(config.port, 8080);
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.service_token, None);
        assert_eq!(config.listen_addr(), "0.0.0.0:8080");

        clear_env();
    }

    #[test]
    fn from_env_with_all_vars() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env();

        unsafe {
            std::env::set_var("NDC_CONFIGURATION", "/etc/connector/config.json");
            std::env::set_var("NDC_PORT", "9100");
            std::env::set_var("NDC_LOG_LEVEL", "debug");
            std::env::set_var("NDC_SERVICE_TOKEN", "secret");
        }

        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.configuration, "/etc/connector/config.json");
        assert_eq!(config.port, 9100);
        assert_eq!(config.log_level, Level::DEBUG);
        assert_eq!(config.service_token, Some("secret".to_string()));

        clear_env();
    }

    #[test]
    fn from_env_invalid_port() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env();

        unsafe {
            std::env::set_var("NDC_PORT", "not-a-number");
        }
        assert!(ServerConfig::from_env().is_err());

        clear_env();
    }

    #[test]
    fn from_env_invalid_log_level() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env();

        unsafe {
            std::env::set_var("NDC_LOG_LEVEL", "loud");
        }
        assert!(ServerConfig::from_env().is_err());

        clear_env();
    }
}
