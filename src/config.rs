//! Configuration
//!
//! Client and stand-in server settings, read from the environment after
//! loading an optional `.env` file.

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;

/// Settings for a cart client talking to the storefront API.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub timeout: Duration,
    /// Where the guest cart id is persisted; `None` means the platform data dir.
    pub cart_store_path: Option<PathBuf>,
}

impl ClientConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let api_base_url = env::var("STOREFRONT_API_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:8000/api".to_string());
        let timeout_secs = match env::var("STOREFRONT_HTTP_TIMEOUT_SECS") {
            Ok(raw) => raw
                .parse::<u64>()
                .with_context(|| format!("invalid STOREFRONT_HTTP_TIMEOUT_SECS: {raw}"))?,
            Err(_) => 30,
        };
        let cart_store_path = env::var("STOREFRONT_CART_STORE").ok().map(PathBuf::from);

        Ok(Self {
            api_base_url,
            timeout: Duration::from_secs(timeout_secs),
            cart_store_path,
        })
    }
}

/// Bind settings for the stand-in API server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8000);
        Ok(Self { host, port })
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let ip = self
            .host
            .parse::<IpAddr>()
            .with_context(|| format!("invalid APP_HOST: {}", self.host))?;
        Ok(SocketAddr::from((ip, self.port)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn socket_addr_rejects_hostnames() {
        let config = ServerConfig {
            host: "localhost".into(),
            port: 8000,
        };
        assert!(config.socket_addr().is_err());

        let config = ServerConfig {
            host: "127.0.0.1".into(),
            port: 8081,
        };
        assert_eq!(config.socket_addr().unwrap().port(), 8081);
    }
}
