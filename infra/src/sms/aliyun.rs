//! Aliyun SMS Client
//!
//! Sends templated messages through the Aliyun Short Message Service
//! `SendSms` API and parses its delivery receipt callbacks.
//!
//! Requests are signed with ACS3-HMAC-SHA256: the canonical request covers
//! the method, path, query string, the `host` and `x-acs-*` headers and the
//! hash of the (empty) body. The query string is built once and used both
//! for signing and for the request URL, so both see the same encoding.

use std::collections::BTreeMap;

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use sms_core::domain::message::parse_vendor_time;
use sms_core::{
    SmsChannelProperties, SmsChannelType, SmsClient, SmsError, SmsReceiveStatus, SmsResult,
    SmsSendOutcome, SmsTemplateParam,
};
use sms_shared::phone::mask_phone_number;
use tracing::{debug, error, info, warn};

use super::client_core::ClientCore;

type HmacSha256 = Hmac<Sha256>;

const HOST: &str = "dysmsapi.aliyuncs.com";
const API_VERSION: &str = "2017-05-25";
const SEND_SMS_ACTION: &str = "SendSms";
const SIGNATURE_ALGORITHM: &str = "ACS3-HMAC-SHA256";
const SUCCESS_CODE: &str = "OK";

/// Aliyun SMS client for one channel
pub struct AliyunSmsClient {
    core: ClientCore,
}

impl AliyunSmsClient {
    pub fn new(properties: SmsChannelProperties) -> Self {
        Self {
            core: ClientCore::new(SmsChannelType::Aliyun, properties),
        }
    }

    fn send_query(
        properties: &SmsChannelProperties,
        log_id: i64,
        mobile: &str,
        api_template_id: &str,
        params: &[SmsTemplateParam],
    ) -> SmsResult<BTreeMap<String, String>> {
        let template_param: serde_json::Map<String, serde_json::Value> = params
            .iter()
            .map(|p| (p.key.clone(), serde_json::Value::String(p.value.clone())))
            .collect();

        let mut query = BTreeMap::new();
        query.insert("PhoneNumbers".to_string(), mobile.to_string());
        query.insert("SignName".to_string(), properties.signature.clone());
        query.insert("TemplateCode".to_string(), api_template_id.to_string());
        query.insert(
            "TemplateParam".to_string(),
            serde_json::to_string(&template_param)?,
        );
        query.insert("OutId".to_string(), log_id.to_string());
        Ok(query)
    }
}

#[async_trait]
impl SmsClient for AliyunSmsClient {
    fn id(&self) -> Option<i64> {
        self.core.id()
    }

    fn channel_type(&self) -> SmsChannelType {
        self.core.channel_type()
    }

    fn properties(&self) -> SmsChannelProperties {
        self.core.properties()
    }

    fn init(&self) -> SmsResult<()> {
        self.core.init()
    }

    fn refresh(&self, properties: SmsChannelProperties) -> SmsResult<()> {
        self.core.refresh(properties).map(|_| ())
    }

    async fn send_sms(
        &self,
        log_id: i64,
        mobile: &str,
        api_template_id: &str,
        params: &[SmsTemplateParam],
    ) -> SmsResult<SmsSendOutcome> {
        let http = self.core.http_client()?;
        let mobile = self.core.checked_mobile(mobile)?;
        let properties = self.core.properties();

        let query = Self::send_query(&properties, log_id, &mobile, api_template_id, params)?;
        let date = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
        let nonce = uuid::Uuid::new_v4().simple().to_string();
        let signed = sign_request(
            &properties.api_key,
            &properties.api_secret,
            SEND_SMS_ACTION,
            &query,
            &date,
            &nonce,
        )?;

        debug!(
            log_id,
            mobile = %mask_phone_number(&mobile),
            template = api_template_id,
            "Sending SMS via Aliyun"
        );

        let mut request = http.post(format!("https://{}/?{}", HOST, signed.canonical_query));
        for (name, value) in &signed.headers {
            if name != "host" {
                request = request.header(name.as_str(), value.as_str());
            }
        }
        let response = request
            .header("authorization", signed.authorization)
            .send()
            .await
            .map_err(|e| {
                error!(log_id, "Aliyun SendSms request failed: {}", e);
                SmsError::Transport(e.to_string())
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SmsError::Transport(e.to_string()))?;
        let outcome = parse_send_response(&body)?;

        if outcome.success {
            info!(
                log_id,
                mobile = %mask_phone_number(&mobile),
                biz_id = ?outcome.serial_no,
                "SMS sent successfully via Aliyun"
            );
        } else {
            warn!(
                log_id,
                http_status = status.as_u16(),
                code = %outcome.api_code,
                message = %outcome.api_msg,
                "Aliyun rejected SMS"
            );
        }
        Ok(outcome)
    }

    fn parse_receive_status(&self, body: &str) -> SmsResult<Vec<SmsReceiveStatus>> {
        let receipts: Vec<AliyunReceipt> = serde_json::from_str(body)?;
        Ok(receipts.into_iter().map(SmsReceiveStatus::from).collect())
    }
}

/// A request ready to be sent, carrying everything the signature covers
#[derive(Debug, Clone)]
pub(crate) struct SignedRequest {
    pub(crate) canonical_query: String,
    pub(crate) headers: BTreeMap<String, String>,
    pub(crate) authorization: String,
}

/// Sign a body-less POST to the SMS endpoint with ACS3-HMAC-SHA256
pub(crate) fn sign_request(
    access_key_id: &str,
    access_key_secret: &str,
    action: &str,
    query: &BTreeMap<String, String>,
    date: &str,
    nonce: &str,
) -> SmsResult<SignedRequest> {
    let hashed_payload = hex::encode(Sha256::digest(b""));

    let mut headers = BTreeMap::new();
    headers.insert("host".to_string(), HOST.to_string());
    headers.insert("x-acs-action".to_string(), action.to_string());
    headers.insert("x-acs-content-sha256".to_string(), hashed_payload.clone());
    headers.insert("x-acs-date".to_string(), date.to_string());
    headers.insert("x-acs-signature-nonce".to_string(), nonce.to_string());
    headers.insert("x-acs-version".to_string(), API_VERSION.to_string());

    let canonical_query = query
        .iter()
        .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
        .collect::<Vec<_>>()
        .join("&");
    let canonical_headers: String = headers
        .iter()
        .map(|(k, v)| format!("{}:{}\n", k, v.trim()))
        .collect();
    let signed_headers = headers.keys().cloned().collect::<Vec<_>>().join(";");

    let canonical_request = format!(
        "POST\n/\n{}\n{}\n{}\n{}",
        canonical_query, canonical_headers, signed_headers, hashed_payload
    );
    let string_to_sign = format!(
        "{}\n{}",
        SIGNATURE_ALGORITHM,
        hex::encode(Sha256::digest(canonical_request.as_bytes()))
    );

    let mut mac = HmacSha256::new_from_slice(access_key_secret.as_bytes())
        .map_err(|e| SmsError::Signing(e.to_string()))?;
    mac.update(string_to_sign.as_bytes());
    let signature = hex::encode(mac.finalize().into_bytes());

    let authorization = format!(
        "{} Credential={},SignedHeaders={},Signature={}",
        SIGNATURE_ALGORITHM, access_key_id, signed_headers, signature
    );

    Ok(SignedRequest {
        canonical_query,
        headers,
        authorization,
    })
}

/// RFC 3986 encoding; only unreserved characters stay literal
fn percent_encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AliyunSendResponse {
    code: String,
    #[serde(default)]
    message: String,
    biz_id: Option<String>,
    request_id: Option<String>,
}

pub(crate) fn parse_send_response(body: &str) -> SmsResult<SmsSendOutcome> {
    let response: AliyunSendResponse = serde_json::from_str(body)?;
    Ok(SmsSendOutcome {
        success: response.code == SUCCESS_CODE,
        api_code: response.code,
        api_msg: response.message,
        api_request_id: response.request_id,
        serial_no: response.biz_id,
    })
}

#[derive(Debug, Deserialize)]
struct AliyunReceipt {
    phone_number: String,
    #[serde(default)]
    report_time: Option<String>,
    success: bool,
    #[serde(default)]
    err_code: Option<String>,
    #[serde(default)]
    err_msg: Option<String>,
    biz_id: String,
    #[serde(default)]
    out_id: Option<String>,
}

impl From<AliyunReceipt> for SmsReceiveStatus {
    fn from(receipt: AliyunReceipt) -> Self {
        SmsReceiveStatus {
            success: receipt.success,
            error_code: receipt.err_code,
            error_msg: receipt.err_msg,
            mobile: receipt.phone_number,
            receive_time: receipt.report_time.as_deref().and_then(parse_vendor_time),
            serial_no: receipt.biz_id,
            log_id: receipt.out_id.and_then(|id| id.parse().ok()),
        }
    }
}
