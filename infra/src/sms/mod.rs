//! SMS Client Module
//!
//! Vendor clients and the registry that hands them out.
//!
//! ## Features
//!
//! - **Aliyun**: `SendSms` with ACS3-HMAC-SHA256 request signing
//! - **Yunpian**: template sends through the v2 REST API
//! - **Registry**: clients cached per channel id and per channel code
//! - **Receipts**: delivery receipt callback parsing for both vendors
//! - **Security**: phone numbers masked and secrets redacted in logs

mod client_core;

pub mod aliyun;
pub mod factory;
pub mod yunpian;

pub use aliyun::AliyunSmsClient;
pub use factory::SmsClientFactoryImpl;
pub use yunpian::YunpianSmsClient;

#[cfg(test)]
mod tests;
