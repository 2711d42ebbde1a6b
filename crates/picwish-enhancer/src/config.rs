/*
[INPUT]:  Optional YAML/TOML/JSON config file, PICWISH_* environment variables
[OUTPUT]: Validated EnhancerConfig and the HTTP client it describes
[POS]:    Configuration layer - service endpoint, credential and cadence
[UPDATE]: When adding new configuration options
*/

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context as _, Result, bail};
use picwish_enhancer_adapter::{ClientConfig, Credentials, PicwishClient, http::DEFAULT_BASE_URL};
use serde::{Deserialize, Serialize};

/// Prefix for environment overrides, e.g. `PICWISH_API_KEY`
pub const ENV_PREFIX: &str = "PICWISH";

/// Settings for talking to the enhancement service
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EnhancerConfig {
    /// Service base URL; endpoints are appended to it
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Static API key sent with every request
    pub api_key: String,
    /// Delay between a status response and the next query
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_api_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

impl EnhancerConfig {
    /// Load from an optional file, then the process environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    /// Load with an explicit environment map instead of the process environment
    pub fn load_with_env(
        path: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let environment = config::Environment::with_prefix(ENV_PREFIX)
            .try_parsing(true)
            .source(env.map(|vars| vars.into_iter().collect()));

        let config: Self = builder
            .add_source(environment)
            .build()
            .context("read configuration sources")?
            .try_deserialize()
            .context("parse configuration (is PICWISH_API_KEY set?)")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            bail!("api_key must not be empty");
        }
        if self.poll_interval_ms == 0 {
            bail!("poll_interval_ms must be greater than zero");
        }
        url::Url::parse(&self.api_url)
            .with_context(|| format!("api_url {:?} is not a valid URL", self.api_url))?;
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            timeout: Duration::from_secs(self.request_timeout_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
        }
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.api_key.clone())
    }

    pub fn build_client(&self) -> Result<PicwishClient> {
        PicwishClient::with_config_and_base_url(
            self.client_config(),
            &self.api_url,
            self.credentials(),
        )
        .context("build PicWish HTTP client")
    }
}
