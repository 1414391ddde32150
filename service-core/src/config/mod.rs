//! Settings shared by every service binary.
//!
//! Values come from an optional `configuration.{toml,yaml,json}` file in the
//! working directory, overridden by `APP__*` environment variables
//! (`APP__PORT=4000`). A `.env` file is read first when present.

use crate::error::AppError;
use config::{Config as Cfg, Environment, File, Map};
use serde::Deserialize;
use std::net::SocketAddr;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// HTTP listen port. `0` asks the OS for a free one.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    3000
}

impl Config {
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_sources(None)
    }

    /// Build from the configuration file plus `APP__*` variables. `env`
    /// replaces the process environment when given.
    pub fn from_sources(env: Option<Map<String, String>>) -> Result<Self, AppError> {
        let config = Cfg::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(Environment::with_prefix("APP").separator("__").source(env))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Address to bind on all interfaces.
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> Option<Map<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn port_defaults_to_3000() {
        let config = Config::from_sources(env(&[])).unwrap();
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn app_port_overrides_default() {
        let config = Config::from_sources(env(&[("APP__PORT", "4100")])).unwrap();

        assert_eq!(config.port, 4100);
        assert_eq!(config.listen_addr().port(), 4100);
    }

    #[test]
    fn invalid_port_is_a_config_error() {
        let err = Config::from_sources(env(&[("APP__PORT", "not-a-port")])).unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
    }
}
