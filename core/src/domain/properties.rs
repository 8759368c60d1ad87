//! SMS channel properties

use serde::{Deserialize, Serialize};
use sms_shared::phone::mask_secret;

use super::channel::SmsChannelType;

/// Credential placeholder used by the code-keyed default clients
pub const PLACEHOLDER_CREDENTIAL: &str = "default";

/// Configuration of one SMS channel
///
/// Supplied by the channel management side and treated as immutable for one
/// update cycle. Two properties values are equal when every field matches,
/// which is what lets a client skip re-initialisation on a no-op refresh.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsChannelProperties {
    /// Channel id; absent for the placeholder clients
    #[serde(default)]
    pub id: Option<i64>,
    /// Channel type code, see [`SmsChannelType::code`]
    pub code: String,
    /// SMS sign name shown to recipients
    #[serde(default)]
    pub signature: String,
    /// Vendor API key (Aliyun AccessKey id, Yunpian apikey)
    pub api_key: String,
    /// Vendor API secret (Aliyun AccessKey secret)
    #[serde(default)]
    pub api_secret: String,
    /// Delivery receipt callback URL
    #[serde(default)]
    pub callback_url: Option<String>,
}

impl SmsChannelProperties {
    pub fn new(id: i64, code: impl Into<String>, api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            code: code.into(),
            signature: String::new(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            callback_url: None,
        }
    }

    /// Placeholder properties for the default client of a channel type
    pub fn placeholder(channel: SmsChannelType) -> Self {
        Self {
            id: None,
            code: channel.code().to_string(),
            signature: String::new(),
            api_key: PLACEHOLDER_CREDENTIAL.to_string(),
            api_secret: PLACEHOLDER_CREDENTIAL.to_string(),
            callback_url: None,
        }
    }

    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = signature.into();
        self
    }

    pub fn with_callback_url(mut self, callback_url: impl Into<String>) -> Self {
        self.callback_url = Some(callback_url.into());
        self
    }

    /// Resolve the channel code into a known channel type
    pub fn channel_type(&self) -> Option<SmsChannelType> {
        SmsChannelType::from_code(&self.code)
    }
}

// Secrets must never reach the logs
impl std::fmt::Debug for SmsChannelProperties {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmsChannelProperties")
            .field("id", &self.id)
            .field("code", &self.code)
            .field("signature", &self.signature)
            .field("api_key", &mask_secret(&self.api_key))
            .field("api_secret", &"****")
            .field("callback_url", &self.callback_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder() {
        let properties = SmsChannelProperties::placeholder(SmsChannelType::YunPian);
        assert_eq!(properties.id, None);
        assert_eq!(properties.code, "YUN_PIAN");
        assert_eq!(properties.api_key, PLACEHOLDER_CREDENTIAL);
        assert_eq!(properties.channel_type(), Some(SmsChannelType::YunPian));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let properties = SmsChannelProperties::new(1, "ALIYUN", "LTAI5tKey", "very-secret");
        let rendered = format!("{:?}", properties);
        assert!(!rendered.contains("very-secret"));
        assert!(!rendered.contains("LTAI5tKey"));
        assert!(rendered.contains("ALIYUN"));
    }

    #[test]
    fn test_deserialize_minimal() {
        let properties: SmsChannelProperties =
            serde_json::from_str(r#"{"id": 7, "code": "YUN_PIAN", "api_key": "k"}"#).unwrap();
        assert_eq!(properties.id, Some(7));
        assert!(properties.api_secret.is_empty());
        assert!(properties.callback_url.is_none());
    }
}
