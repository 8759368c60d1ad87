//! # SMS Core
//!
//! Domain layer for SMS channels. It defines what a channel is, how vendor
//! clients are addressed and what the registry of clients promises to its
//! callers. Vendor implementations and the registry itself live in
//! `sms_infra`.
//!
//! ## Modules
//!
//! - **domain**: channel types, channel properties, send and receipt DTOs
//! - **client**: the `SmsClient` and `SmsClientFactory` contracts
//! - **errors**: `SmsError` and `SmsResult`

pub mod client;
pub mod domain;
pub mod errors;

pub use client::{SmsClient, SmsClientFactory};
pub use domain::{
    SmsChannelProperties, SmsChannelType, SmsReceiveStatus, SmsSendOutcome, SmsTemplateParam,
};
pub use errors::{SmsError, SmsResult};
