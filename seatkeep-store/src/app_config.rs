use serde::Deserialize;
use std::env;
use seatkeep_core::{PolicyError, ReservationPolicy};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub reservation: ReservationRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 { 5 }

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReservationRules {
    #[serde(default = "default_grace_window")]
    pub grace_window_seconds: u64,
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
    #[serde(default = "default_sweep_batch")]
    pub sweep_batch_size: usize,
    /// Offset applied to request times given without a zone, e.g. 420 for +07:00.
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

fn default_grace_window() -> u64 { 600 }
fn default_sweep_interval() -> u64 { 10 }
fn default_sweep_batch() -> usize { 100 }

impl ReservationRules {
    pub fn policy(&self) -> Result<ReservationPolicy, PolicyError> {
        ReservationPolicy::from_seconds(
            self.grace_window_seconds,
            self.sweep_interval_seconds,
            self.sweep_batch_size,
        )
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("config")
    }

    /// Layered load: `default`, then `{RUN_MODE}` and `local` if present,
    /// then `SEATKEEP__SECTION__KEY` environment variables.
    pub fn load_from(dir: &str) -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name(&format!("{}/default", dir)))
            .add_source(config::File::with_name(&format!("{}/{}", dir, run_mode)).required(false))
            // Not checked in
            .add_source(config::File::with_name(&format!("{}/local", dir)).required(false))
            .add_source(config::Environment::with_prefix("SEATKEEP").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
