// Copyright (c) 2021 Tangram Robotics Inc. - All Rights Reserved
// Unauthorized copying of this file, via any medium is strictly prohibited
// Proprietary and confidential
// ----------------------------

use anyhow::Result;
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::core::api::longevity::{DEFAULT_CALCULATOR_URL, DEFAULT_TIMEOUT_SECS};

/// Default location of the config file, before tilde expansion.
pub const DEFAULT_CONFIG_PATH: &str = "~/.config/ssa-scraper/ssa-scraper.toml";

/// Prefix for environment overrides, e.g. SSA_SCRAPER_SERVER__PORT=8080
/// (note double underscore to reach into lower struct levels!)
pub const ENV_PREFIX: &str = "SSA_SCRAPER";

/// All configuration, with defaults filled in for anything not provided by
/// the config file or environment.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct CompleteAppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub scraper: ScraperConfig,
}

impl CompleteAppConfig {
    pub fn from_config(mut config: config::Config) -> Result<Self> {
        // `Config::default()` has no root table until its cache is rebuilt.
        config.refresh()?;
        Ok(config.try_into()?)
    }
}

/// HTTP function endpoint settings.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Keys accepted via `x-functions-key` header or `code` query parameter.
    /// Leave empty to disable authorization (local development only).
    pub function_keys: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 7071,
            function_keys: Vec::new(),
        }
    }
}

/// Longevity calculator client settings.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct ScraperConfig {
    pub calculator_url: Url,
    pub timeout_secs: u64,
    /// Upper bound on calculator lookups in flight at once.
    pub max_concurrent: usize,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            calculator_url: Url::parse(DEFAULT_CALCULATOR_URL)
                .expect("default calculator url is valid"),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_concurrent: 4,
        }
    }
}
