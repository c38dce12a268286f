use std::time::Duration;

use crate::util::env::{env_flag, env_opt, env_parse, log_config_snapshot};

use super::availability::DEFAULT_MAX_ATTEMPTS;
use super::upstream::DEFAULT_UPSTREAM_URL;

/// Settings for the refresh cache and its upstream client.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub upstream_url: String,
    pub upstream_timeout: Duration,
    /// Total availability attempts per manufacturer and cycle.
    pub max_attempts: u32,
    /// Await one full refresh before serving.
    pub warmup: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            upstream_url: DEFAULT_UPSTREAM_URL.to_string(),
            upstream_timeout: Duration::from_secs(30),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            warmup: true,
        }
    }
}

impl CatalogConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let config = Self {
            upstream_url: env_opt("CATALOG_UPSTREAM_URL").unwrap_or(defaults.upstream_url),
            upstream_timeout: Duration::from_secs(env_parse(
                "CATALOG_UPSTREAM_TIMEOUT_SECS",
                defaults.upstream_timeout.as_secs(),
            )),
            max_attempts: env_parse("CATALOG_AVAILABILITY_MAX_ATTEMPTS", defaults.max_attempts)
                .max(1),
            warmup: env_flag("CATALOG_WARMUP", defaults.warmup),
        };

        log_config_snapshot(
            "catalog",
            &[
                "CATALOG_UPSTREAM_URL",
                "CATALOG_UPSTREAM_TIMEOUT_SECS",
                "CATALOG_AVAILABILITY_MAX_ATTEMPTS",
                "CATALOG_WARMUP",
            ],
        );
        config
    }
}
