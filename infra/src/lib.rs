//! # Infrastructure Layer
//!
//! This crate implements the infrastructure side of SMS channels: the vendor
//! clients that talk to the SMS providers and the registry that creates,
//! caches and refreshes them per channel.
//!
//! ## Architecture
//!
//! The infrastructure layer contains:
//! - **SMS**: Aliyun and Yunpian clients plus `SmsClientFactoryImpl`
//! - **Config**: channel list and logging settings loaded with the `config` crate
//!
//! The registry is an ordinary value. Build it once at startup with
//! [`bootstrap`] and hand the `Arc` to whatever needs to resolve clients.

use std::sync::Arc;

use sms_core::{SmsClientFactory, SmsError};

pub mod config;
pub mod sms;

pub use config::SmsSettings;
pub use sms::{AliyunSmsClient, SmsClientFactoryImpl, YunpianSmsClient};

/// Build the client registry for the configured channels
///
/// Seeds one placeholder client per channel type, then creates a client for
/// every configured channel. The first channel that cannot be created aborts
/// startup.
pub fn bootstrap(settings: &SmsSettings) -> Result<Arc<SmsClientFactoryImpl>, InfrastructureError> {
    tracing::info!(
        environment = %settings.environment,
        channels = settings.channels.len(),
        "Initializing SMS client registry..."
    );

    let factory = SmsClientFactoryImpl::bootstrapped()?;
    for channel in &settings.channels {
        factory.create_or_update_client(channel.clone())?;
    }

    tracing::info!("SMS client registry initialized successfully");
    Ok(Arc::new(factory))
}

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    /// SMS client error
    #[error("SMS error: {0}")]
    Sms(#[from] SmsError),
}
