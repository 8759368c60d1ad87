//! Send results and delivery receipts

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Timestamp layout used by both vendors in delivery receipts
pub const VENDOR_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One template variable, kept in caller order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsTemplateParam {
    pub key: String,
    pub value: String,
}

impl SmsTemplateParam {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Outcome of one send request as reported by the vendor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsSendOutcome {
    /// Whether the vendor accepted the message
    pub success: bool,
    /// Vendor status code ("OK" for Aliyun, "0" for Yunpian on success)
    pub api_code: String,
    /// Vendor status message
    pub api_msg: String,
    /// Vendor request id, when the vendor returns one
    pub api_request_id: Option<String>,
    /// Vendor message serial number used to correlate receipts
    pub serial_no: Option<String>,
}

/// Delivery receipt for one message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsReceiveStatus {
    pub success: bool,
    pub error_code: Option<String>,
    pub error_msg: Option<String>,
    pub mobile: String,
    /// When the handset received the message (vendor local time)
    pub receive_time: Option<NaiveDateTime>,
    pub serial_no: String,
    /// Send log id echoed back by the vendor
    pub log_id: Option<i64>,
}

/// Parse a vendor timestamp, ignoring malformed values
pub fn parse_vendor_time(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), VENDOR_TIME_FORMAT).ok()
}
