//! State shared by every vendor client
//!
//! Holds the channel properties and the HTTP client built by `init`. The
//! properties sit behind a lock so a refresh can race a send safely; a send
//! works on the snapshot it took when it started.

use std::time::Duration;

use parking_lot::RwLock;
use sms_core::{SmsChannelProperties, SmsChannelType, SmsError, SmsResult};
use sms_shared::phone::{is_valid_mobile, mask_phone_number, normalize_mobile};
use tracing::{debug, info};

/// Timeout for one vendor API request
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub(crate) struct ClientCore {
    channel_type: SmsChannelType,
    properties: RwLock<SmsChannelProperties>,
    http: RwLock<Option<reqwest::Client>>,
}

fn build_http_client() -> SmsResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| SmsError::Transport(e.to_string()))
}

impl ClientCore {
    pub(crate) fn new(channel_type: SmsChannelType, properties: SmsChannelProperties) -> Self {
        Self {
            channel_type,
            properties: RwLock::new(properties),
            http: RwLock::new(None),
        }
    }

    pub(crate) fn channel_type(&self) -> SmsChannelType {
        self.channel_type
    }

    pub(crate) fn id(&self) -> Option<i64> {
        self.properties.read().id
    }

    pub(crate) fn properties(&self) -> SmsChannelProperties {
        self.properties.read().clone()
    }

    #[cfg(test)]
    pub(crate) fn is_initialized(&self) -> bool {
        self.http.read().is_some()
    }

    /// Build the HTTP client; rebuilding replaces the previous one
    pub(crate) fn init(&self) -> SmsResult<()> {
        let client = build_http_client()?;
        *self.http.write() = Some(client);

        info!(
            channel = %self.channel_type,
            vendor = self.channel_type.display_name(),
            channel_id = ?self.id(),
            "SMS client initialized"
        );
        Ok(())
    }

    /// Replace the properties and re-init, unless nothing changed
    ///
    /// Returns whether the properties were replaced.
    pub(crate) fn refresh(&self, properties: SmsChannelProperties) -> SmsResult<bool> {
        self.refresh_with(properties, build_http_client)
    }

    /// Refresh using `build` for the new HTTP client
    ///
    /// The client is built before anything is swapped, so a failed build
    /// leaves both the old properties and the old HTTP client in place.
    pub(crate) fn refresh_with<F>(&self, properties: SmsChannelProperties, build: F) -> SmsResult<bool>
    where
        F: FnOnce() -> SmsResult<reqwest::Client>,
    {
        if *self.properties.read() == properties {
            debug!(
                channel = %self.channel_type,
                channel_id = ?properties.id,
                "SMS client properties unchanged, skipping refresh"
            );
            return Ok(false);
        }

        let client = build()?;
        {
            // Lock order: properties, then http
            let mut current = self.properties.write();
            let mut http = self.http.write();
            *current = properties;
            *http = Some(client);
        }

        info!(
            channel = %self.channel_type,
            vendor = self.channel_type.display_name(),
            channel_id = ?self.id(),
            "SMS client refreshed"
        );
        Ok(true)
    }

    pub(crate) fn http_client(&self) -> SmsResult<reqwest::Client> {
        self.http.read().clone().ok_or_else(|| SmsError::NotInitialized {
            code: self.channel_type.code().to_string(),
        })
    }

    /// Normalize a recipient number, rejecting ones no vendor accepts
    pub(crate) fn checked_mobile(&self, mobile: &str) -> SmsResult<String> {
        if !is_valid_mobile(mobile) {
            return Err(SmsError::InvalidMobile {
                mobile: mask_phone_number(mobile),
            });
        }
        Ok(normalize_mobile(mobile))
    }
}
