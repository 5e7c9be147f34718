//! Layered configuration loading.
//!
//! Sources, lowest precedence first:
//! 1. Built-in defaults
//! 2. An optional TOML/YAML/JSON file
//! 3. `SGDIS_*` environment variables, `__` separating nested keys
//!    (e.g. `SGDIS_INACTIVITY__WARNING_SECS=30`)

use std::collections::HashMap;
use std::path::Path;

use config::{Config, Environment, File};
use sgdis_domain::{DomainError, SessionConfig};
use thiserror::Error;
use tracing::debug;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "SGDIS";

/// Configuration could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or deserialized.
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// The merged configuration is not usable.
    #[error("invalid configuration: {0}")]
    Invalid(#[from] DomainError),
}

/// Loads settings from defaults, `file` and the process environment.
///
/// # Errors
///
/// Returns an error if the file cannot be parsed, a value has the wrong
/// type, or the result fails validation.
pub fn load_config(file: Option<&Path>) -> Result<SessionConfig, ConfigError> {
    load_config_from(file, None)
}

/// Like [`load_config`], reading variables from `env` instead of the
/// process environment when given.
///
/// # Errors
///
/// See [`load_config`].
pub fn load_config_from(
    file: Option<&Path>,
    env: Option<HashMap<String, String>>,
) -> Result<SessionConfig, ConfigError> {
    let mut builder = Config::builder().add_source(Config::try_from(&SessionConfig::default())?);

    if let Some(path) = file {
        debug!(path = %path.display(), "Reading configuration file");
        builder = builder.add_source(File::from(path));
    }

    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("public_routes")
            .try_parsing(true)
            .source(env),
    );

    let config: SessionConfig = builder.build()?.try_deserialize()?;
    config.validate()?;
    Ok(config)
}
