//! Configuration loading for SMS channels
//!
//! Settings come from a TOML file, overridden by `SMS_*` environment
//! variables (`SMS_LOGGING__LEVEL=debug`).

use std::path::Path;

use serde::{Deserialize, Serialize};
use sms_core::SmsChannelProperties;
use sms_shared::{Environment, LoggingConfig};

use crate::InfrastructureError;

/// Settings needed to bring up the SMS client registry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SmsSettings {
    #[serde(default)]
    pub environment: Environment,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Channels to register at startup
    #[serde(default)]
    pub channels: Vec<SmsChannelProperties>,
}

impl SmsSettings {
    /// Load settings from a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, InfrastructureError> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::from(path.as_ref()).required(true))
            .add_source(env_overrides())
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }

    /// Load settings for the current environment
    ///
    /// Reads `.env` if present, then defers to [`Self::for_environment`].
    pub fn from_env() -> Result<Self, InfrastructureError> {
        dotenvy::dotenv().ok();
        Self::for_environment(Environment::from_env())
    }

    /// Load settings for `environment`
    ///
    /// Logging starts from the environment's defaults; the environment
    /// specific config file (`config.<environment>.toml`, optional) and
    /// `SMS_*` variables override individual keys.
    pub fn for_environment(environment: Environment) -> Result<Self, InfrastructureError> {
        let defaults = EnvironmentDefaults {
            environment,
            logging: LoggingConfig::for_environment(environment),
        };

        let mut settings: SmsSettings = ::config::Config::builder()
            .add_source(::config::Config::try_from(&defaults)?)
            .add_source(::config::File::with_name(environment.config_file()).required(false))
            .add_source(env_overrides())
            .build()?
            .try_deserialize()?;

        settings.environment = environment;
        Ok(settings)
    }
}

/// Lowest priority layer of [`SmsSettings::for_environment`]
#[derive(Serialize)]
struct EnvironmentDefaults {
    environment: Environment,
    logging: LoggingConfig,
}

fn env_overrides() -> ::config::Environment {
    ::config::Environment::with_prefix("SMS")
        .prefix_separator("_")
        .separator("__")
}
