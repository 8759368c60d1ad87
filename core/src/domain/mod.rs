//! Domain types for SMS channels

pub mod channel;
pub mod message;
pub mod properties;

pub use channel::SmsChannelType;
pub use message::{SmsReceiveStatus, SmsSendOutcome, SmsTemplateParam};
pub use properties::SmsChannelProperties;
