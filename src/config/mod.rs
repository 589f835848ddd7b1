mod types;

pub use types::*;

use crate::{Error, Result};
use std::{env, path::Path};
use tracing::debug;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Loads the configuration named by `CONFIG_PATH` (default `config.yaml`).
///
/// A missing default file falls back to built-in defaults; a missing file
/// named explicitly through `CONFIG_PATH` is an error.
pub async fn load() -> Result<Config> {
    let explicit_path = env::var("CONFIG_PATH").ok();
    let config_path = explicit_path
        .clone()
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    let mut config = if explicit_path.is_none() && !Path::new(&config_path).exists() {
        debug!("No {} found, using default configuration", config_path);
        Config::default()
    } else {
        debug!("Loading configuration from: {}", config_path);
        load_from_path(&config_path).await?
    };

    if let Ok(model_path) = env::var("MODEL_PATH") {
        config.model.model_path = model_path;
    }

    config.validate()?;
    Ok(config)
}

pub async fn load_from_path(path: impl AsRef<Path>) -> Result<Config> {
    let config_str = tokio::fs::read_to_string(path).await?;
    parse(&config_str)
}

pub fn parse(yaml: &str) -> Result<Config> {
    // An empty document deserializes to unit, not to an all-default map.
    if yaml.trim().is_empty() {
        return Ok(Config::default());
    }
    let config: Config = serde_yaml::from_str(yaml)?;
    Ok(config)
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.model.model_path.trim().is_empty() {
            return Err(Error::config("model.model_path must not be empty"));
        }
        if self.model.max_input_tokens == 0 {
            return Err(Error::config("model.max_input_tokens must be greater than 0"));
        }
        if self.model.max_output_tokens == 0 {
            return Err(Error::config(
                "model.max_output_tokens must be greater than 0",
            ));
        }
        Ok(())
    }
}
