//! Configuration loading from environment.

use std::{env, time::Duration};

/// Application configuration.
#[derive(Debug, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    /// Artificial delay added to every call of the in-memory stores
    pub store_latency: Duration,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(env::var("PORT").ok(), env::var("STORE_LATENCY_MS").ok())
    }

    fn from_vars(port: Option<String>, store_latency_ms: Option<String>) -> anyhow::Result<Self> {
        let port = match port {
            Some(port) => port
                .parse::<u16>()
                .map_err(|err| anyhow::anyhow!("invalid PORT '{port}': {err}"))?,
            None => 8080,
        };

        let store_latency_ms = match store_latency_ms {
            Some(ms) => ms
                .parse::<u64>()
                .map_err(|err| anyhow::anyhow!("invalid STORE_LATENCY_MS '{ms}': {err}"))?,
            None => 0,
        };

        Ok(Self {
            port,
            store_latency: Duration::from_millis(store_latency_ms),
        })
    }
}
