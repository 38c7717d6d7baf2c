use std::time::Duration;

use crate::scheduler::Algorithm;

/// Runtime configuration, loaded from the environment (with an optional
/// `.env` file, as `principal`'s bootstrap does). Every field falls back
/// to the values the distilled spec hardcodes.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub sweep_period: Duration,
    pub staleness_threshold: chrono::Duration,
    pub initial_algorithm: Algorithm,
    pub runtime_binary: String,
    pub node_image: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            sweep_period: Duration::from_secs(5),
            staleness_threshold: chrono::Duration::seconds(15),
            initial_algorithm: Algorithm::FirstFit,
            runtime_binary: "docker".to_string(),
            node_image: "node-image".to_string(),
        }
    }
}

impl Config {
    /// Loads overrides from the environment; unset variables keep the
    /// spec's defaults. Invalid values fall back rather than panic, since
    /// a malformed env var should not take down the control plane.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            sweep_period: std::env::var("SWEEP_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.sweep_period),
            staleness_threshold: std::env::var("HEARTBEAT_STALE_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(chrono::Duration::seconds)
                .unwrap_or(defaults.staleness_threshold),
            initial_algorithm: std::env::var("SCHEDULER_ALGORITHM")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.initial_algorithm),
            runtime_binary: std::env::var("CONTAINER_RUNTIME").unwrap_or(defaults.runtime_binary),
            node_image: std::env::var("NODE_IMAGE").unwrap_or(defaults.node_image),
        }
    }
}
