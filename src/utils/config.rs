// src/utils/config.rs
//! Client configuration.
//!
//! Settings come from `INDY_`-prefixed environment variables layered over
//! defaults:
//! - `INDY_PROXY_URL` (default `http://localhost:3030/`)
//! - `INDY_TIMEOUT_SECS` (default 30)
//! - `INDY_TAA_DIGEST`, `INDY_TAA_MECHANISM`, `INDY_TAA_TIME` (all three or none)

use std::time::Duration;

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

use crate::models::request::TaaAcceptance;

pub const ENV_PREFIX: &str = "INDY";
pub const DEFAULT_PROXY_URL: &str = "http://localhost:3030/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub proxy_url: String,
    pub timeout_secs: u64,
    #[serde(default)]
    pub taa_digest: Option<String>,
    #[serde(default)]
    pub taa_mechanism: Option<String>,
    #[serde(default)]
    pub taa_time: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            proxy_url: DEFAULT_PROXY_URL.to_owned(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            taa_digest: None,
            taa_mechanism: None,
            taa_time: None,
        }
    }
}

impl ClientConfig {
    /// Loads configuration from `INDY_*` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_prefix(ENV_PREFIX)
    }

    /// Loads configuration from `<prefix>_*` environment variables.
    pub fn load_with_prefix(prefix: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("proxy_url", DEFAULT_PROXY_URL)?
            .set_default("timeout_secs", DEFAULT_TIMEOUT_SECS as i64)?
            .add_source(Environment::with_prefix(prefix).try_parsing(true))
            .build()?
            .try_deserialize()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The configured TAA acceptance, if digest, mechanism and time are all set.
    pub fn taa_acceptance(&self) -> Option<TaaAcceptance> {
        match (&self.taa_digest, &self.taa_mechanism, self.taa_time) {
            (Some(digest), Some(mechanism), Some(time)) => {
                Some(TaaAcceptance::new(digest, mechanism, time))
            }
            _ => None,
        }
    }
}
