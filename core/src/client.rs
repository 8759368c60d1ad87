//! Client contracts
//!
//! `SmsClient` is the polymorphic handle for one channel. `SmsClientFactory`
//! is the registry the rest of the application resolves clients through.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{
    SmsChannelProperties, SmsChannelType, SmsReceiveStatus, SmsSendOutcome, SmsTemplateParam,
};
use crate::errors::SmsResult;

/// Vendor specific SMS client bound to one channel
#[async_trait]
pub trait SmsClient: Send + Sync {
    /// Channel id this client was created for; `None` for placeholder clients
    fn id(&self) -> Option<i64>;

    /// Vendor this client talks to
    fn channel_type(&self) -> SmsChannelType;

    /// Snapshot of the current channel properties
    fn properties(&self) -> SmsChannelProperties;

    /// Prepare the client for sending; safe to call more than once
    fn init(&self) -> SmsResult<()>;

    /// Apply new channel properties in place
    ///
    /// Identical properties are a no-op. Otherwise the properties are
    /// replaced and the client re-initialised.
    fn refresh(&self, properties: SmsChannelProperties) -> SmsResult<()>;

    /// Send a templated message
    ///
    /// # Arguments
    ///
    /// * `log_id` - Send log id, echoed back by the vendor in receipts
    /// * `mobile` - Recipient mobile number
    /// * `api_template_id` - Vendor side template id
    /// * `params` - Template variables in order
    async fn send_sms(
        &self,
        log_id: i64,
        mobile: &str,
        api_template_id: &str,
        params: &[SmsTemplateParam],
    ) -> SmsResult<SmsSendOutcome>;

    /// Parse a delivery receipt callback body sent by the vendor
    fn parse_receive_status(&self, body: &str) -> SmsResult<Vec<SmsReceiveStatus>>;
}

/// Registry of SMS clients keyed by channel id and by channel code
pub trait SmsClientFactory: Send + Sync {
    /// Client registered for a channel id
    fn get_client(&self, channel_id: i64) -> Option<Arc<dyn SmsClient>>;

    /// Default client for a channel code
    ///
    /// Used where any client of the vendor will do, such as parsing
    /// delivery receipts.
    fn get_client_by_code(&self, channel_code: &str) -> Option<Arc<dyn SmsClient>>;

    /// Create the client for a channel, or refresh the existing one
    fn create_or_update_client(&self, properties: SmsChannelProperties) -> SmsResult<()>;
}
