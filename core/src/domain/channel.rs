//! SMS channel type enumeration

use serde::{Deserialize, Serialize};

/// Vendors an SMS channel can be bound to
///
/// The set is closed: a channel code that does not map to one of these
/// variants cannot produce a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SmsChannelType {
    /// Aliyun Short Message Service
    #[serde(rename = "ALIYUN")]
    Aliyun,
    /// Yunpian SMS
    #[serde(rename = "YUN_PIAN")]
    YunPian,
}

impl SmsChannelType {
    /// Every known channel type, in declaration order
    pub const ALL: [SmsChannelType; 2] = [SmsChannelType::Aliyun, SmsChannelType::YunPian];

    /// Channel code used in channel configuration
    pub fn code(&self) -> &'static str {
        match self {
            SmsChannelType::Aliyun => "ALIYUN",
            SmsChannelType::YunPian => "YUN_PIAN",
        }
    }

    /// Human readable vendor name
    pub fn display_name(&self) -> &'static str {
        match self {
            SmsChannelType::Aliyun => "Aliyun",
            SmsChannelType::YunPian => "Yunpian",
        }
    }

    /// Resolve a channel code; codes are matched exactly
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|channel| channel.code() == code)
    }
}

impl std::fmt::Display for SmsChannelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}
