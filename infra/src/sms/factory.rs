//! SMS client registry
//!
//! Clients are cached twice:
//! - per channel id, one client per configured channel, created on first
//!   submission and refreshed in place afterwards
//! - per channel code, one placeholder client per vendor, for work that
//!   needs a vendor but no particular channel (receipt parsing)
//!
//! `create_or_update_client` is a lookup followed by an insert. Two
//! concurrent submissions for a brand-new id can both build and init a
//! client; the last insert wins and the other client is dropped.
//!
//! The `Arc` returned for an id stays the same across refreshes only while
//! the vendor stays the same; a change of vendor replaces the client.

use std::sync::Arc;

use dashmap::DashMap;
use sms_core::{SmsChannelProperties, SmsChannelType, SmsClient, SmsClientFactory, SmsError, SmsResult};
use tracing::{error, info, warn};

use super::aliyun::AliyunSmsClient;
use super::yunpian::YunpianSmsClient;

type ClientConstructor = fn(SmsChannelProperties) -> Arc<dyn SmsClient>;

/// Channel type to client constructor
static CLIENT_CONSTRUCTORS: [(SmsChannelType, ClientConstructor); 2] = [
    (SmsChannelType::Aliyun, aliyun_client),
    (SmsChannelType::YunPian, yunpian_client),
];

fn aliyun_client(properties: SmsChannelProperties) -> Arc<dyn SmsClient> {
    Arc::new(AliyunSmsClient::new(properties))
}

fn yunpian_client(properties: SmsChannelProperties) -> Arc<dyn SmsClient> {
    Arc::new(YunpianSmsClient::new(properties))
}

fn constructor_for(channel: SmsChannelType) -> Option<ClientConstructor> {
    CLIENT_CONSTRUCTORS
        .iter()
        .find(|(candidate, _)| *candidate == channel)
        .map(|(_, constructor)| *constructor)
}

/// Registry of SMS clients keyed by channel id and channel code
#[derive(Default)]
pub struct SmsClientFactoryImpl {
    channel_id_clients: DashMap<i64, Arc<dyn SmsClient>>,
    channel_code_clients: DashMap<String, Arc<dyn SmsClient>>,
}

impl SmsClientFactoryImpl {
    /// Create an empty registry; see [`Self::bootstrap_defaults`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the placeholder clients already seeded
    pub fn bootstrapped() -> SmsResult<Self> {
        let factory = Self::new();
        factory.bootstrap_defaults()?;
        Ok(factory)
    }

    /// Seed one placeholder client per known channel type
    ///
    /// Placeholder clients carry dummy credentials and are never initialized.
    /// Run once at startup.
    pub fn bootstrap_defaults(&self) -> SmsResult<()> {
        for channel in SmsChannelType::ALL {
            let client = self.create_client(SmsChannelProperties::placeholder(channel))?;
            self.channel_code_clients
                .insert(channel.code().to_string(), client);
        }
        info!(
            channels = SmsChannelType::ALL.len(),
            "Seeded default SMS clients"
        );
        Ok(())
    }

    /// Build a client for the channel type named by `properties.code`
    ///
    /// Fails with [`SmsError::UnknownChannel`] when the code matches no
    /// known vendor.
    pub fn create_client(&self, properties: SmsChannelProperties) -> SmsResult<Arc<dyn SmsClient>> {
        let constructor = properties
            .channel_type()
            .and_then(constructor_for)
            .ok_or_else(|| unknown_channel(&properties))?;
        Ok(constructor(properties))
    }

    /// Ids of every channel with a registered client, ascending
    pub fn channel_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self
            .channel_id_clients
            .iter()
            .map(|entry| *entry.key())
            .collect();
        ids.sort_unstable();
        ids
    }
}

fn unknown_channel(properties: &SmsChannelProperties) -> SmsError {
    error!(
        properties = ?properties,
        "[create_client] no SMS client implementation for channel properties"
    );
    SmsError::UnknownChannel {
        code: properties.code.clone(),
    }
}

impl SmsClientFactory for SmsClientFactoryImpl {
    fn get_client(&self, channel_id: i64) -> Option<Arc<dyn SmsClient>> {
        self.channel_id_clients
            .get(&channel_id)
            .map(|entry| Arc::clone(entry.value()))
    }

    fn get_client_by_code(&self, channel_code: &str) -> Option<Arc<dyn SmsClient>> {
        self.channel_code_clients
            .get(channel_code)
            .map(|entry| Arc::clone(entry.value()))
    }

    fn create_or_update_client(&self, properties: SmsChannelProperties) -> SmsResult<()> {
        let channel_id = properties.id.ok_or_else(|| SmsError::MissingChannelId {
            code: properties.code.clone(),
        })?;
        // Resolve before touching the maps so a bad code never mutates them
        let channel = properties
            .channel_type()
            .ok_or_else(|| unknown_channel(&properties))?;

        match self.get_client(channel_id) {
            Some(client) if client.channel_type() == channel => client.refresh(properties),
            existing => {
                if let Some(previous) = existing {
                    warn!(
                        channel_id,
                        from = %previous.channel_type(),
                        to = %channel,
                        "SMS channel type changed, replacing client"
                    );
                }
                let client = self.create_client(properties)?;
                client.init()?;
                self.channel_id_clients.insert(channel_id, client);
                info!(channel_id, channel = %channel, "Registered SMS client");
                Ok(())
            }
        }
    }
}
