//! Yunpian SMS Client
//!
//! Sends templated messages through the Yunpian v2 `tpl_single_send` API and
//! parses its delivery receipt callbacks.

use async_trait::async_trait;
use serde::Deserialize;
use sms_core::domain::message::parse_vendor_time;
use sms_core::{
    SmsChannelProperties, SmsChannelType, SmsClient, SmsError, SmsReceiveStatus, SmsResult,
    SmsSendOutcome, SmsTemplateParam,
};
use sms_shared::phone::mask_phone_number;
use tracing::{debug, error, info, warn};

use super::client_core::ClientCore;

const TPL_SINGLE_SEND_URL: &str = "https://sms.yunpian.com/v2/sms/tpl_single_send.json";
const SUCCESS_CODE: i64 = 0;
const RECEIPT_SUCCESS: &str = "SUCCESS";
const RECEIPT_FIELD: &str = "sms_status";

/// Yunpian SMS client for one channel
pub struct YunpianSmsClient {
    core: ClientCore,
}

impl YunpianSmsClient {
    pub fn new(properties: SmsChannelProperties) -> Self {
        Self {
            core: ClientCore::new(SmsChannelType::YunPian, properties),
        }
    }
}

#[async_trait]
impl SmsClient for YunpianSmsClient {
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
        let form = send_form(&properties, log_id, &mobile, api_template_id, params);

        debug!(
            log_id,
            mobile = %mask_phone_number(&mobile),
            template = api_template_id,
            "Sending SMS via Yunpian"
        );

        let response = http
            .post(TPL_SINGLE_SEND_URL)
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                error!(log_id, "Yunpian send request failed: {}", e);
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
                sid = ?outcome.serial_no,
                "SMS sent successfully via Yunpian"
            );
        } else {
            warn!(
                log_id,
                http_status = status.as_u16(),
                code = %outcome.api_code,
                message = %outcome.api_msg,
                "Yunpian rejected SMS"
            );
        }
        Ok(outcome)
    }

    fn parse_receive_status(&self, body: &str) -> SmsResult<Vec<SmsReceiveStatus>> {
        let payload = receipt_payload(body)?;
        let receipts: Vec<YunpianReceipt> = serde_json::from_str(&payload)?;
        Ok(receipts.into_iter().map(SmsReceiveStatus::from).collect())
    }
}

/// Form fields for `tpl_single_send`
pub(crate) fn send_form(
    properties: &SmsChannelProperties,
    log_id: i64,
    mobile: &str,
    api_template_id: &str,
    params: &[SmsTemplateParam],
) -> Vec<(&'static str, String)> {
    let mut form = vec![
        ("apikey", properties.api_key.clone()),
        ("mobile", mobile.to_string()),
        ("tpl_id", api_template_id.to_string()),
        ("tpl_value", tpl_value(params)),
        ("uid", log_id.to_string()),
    ];
    if let Some(callback_url) = &properties.callback_url {
        form.push(("callback_url", callback_url.clone()));
    }
    form
}

/// Encode template variables as `#key#=value` pairs
///
/// Yunpian expects each name and value URL-encoded on its own; the form
/// encoding of the request body is applied on top.
pub(crate) fn tpl_value(params: &[SmsTemplateParam]) -> String {
    params
        .iter()
        .map(|p| {
            format!(
                "{}={}",
                urlencoding::encode(&format!("#{}#", p.key)),
                urlencoding::encode(&p.value)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Extract the JSON receipt array from a callback body
///
/// Yunpian posts `sms_status=<url-encoded JSON>`; a bare JSON array is
/// accepted too.
fn receipt_payload(body: &str) -> SmsResult<String> {
    let body = body.trim();
    if body.starts_with('[') {
        return Ok(body.to_string());
    }

    let encoded = body
        .split('&')
        .find_map(|pair| pair.strip_prefix(RECEIPT_FIELD).and_then(|rest| rest.strip_prefix('=')))
        .ok_or_else(|| {
            SmsError::InvalidResponse(format!("receipt body has no '{}' field", RECEIPT_FIELD))
        })?;

    urlencoding::decode(&encoded.replace('+', " "))
        .map(|decoded| decoded.into_owned())
        .map_err(|e| SmsError::InvalidResponse(e.to_string()))
}

#[derive(Debug, Deserialize)]
struct YunpianSendResponse {
    code: i64,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    sid: Option<i64>,
}

pub(crate) fn parse_send_response(body: &str) -> SmsResult<SmsSendOutcome> {
    let response: YunpianSendResponse = serde_json::from_str(body)?;
    let api_msg = match response.detail {
        Some(detail) if !detail.is_empty() => format!("{}: {}", response.msg, detail),
        _ => response.msg,
    };
    Ok(SmsSendOutcome {
        success: response.code == SUCCESS_CODE,
        api_code: response.code.to_string(),
        api_msg,
        api_request_id: None,
        serial_no: response.sid.map(|sid| sid.to_string()),
    })
}

#[derive(Debug, Deserialize)]
struct YunpianReceipt {
    sid: i64,
    #[serde(default)]
    uid: Option<String>,
    #[serde(default)]
    user_receive_time: Option<String>,
    #[serde(default)]
    error_msg: Option<String>,
    mobile: String,
    report_status: String,
    #[serde(default)]
    error_detail: Option<String>,
}

impl From<YunpianReceipt> for SmsReceiveStatus {
    fn from(receipt: YunpianReceipt) -> Self {
        SmsReceiveStatus {
            success: receipt.report_status == RECEIPT_SUCCESS,
            error_code: receipt.error_msg.filter(|code| !code.is_empty()),
            error_msg: receipt.error_detail.filter(|msg| !msg.is_empty()),
            mobile: receipt.mobile,
            receive_time: receipt.user_receive_time.as_deref().and_then(parse_vendor_time),
            serial_no: receipt.sid.to_string(),
            log_id: receipt.uid.and_then(|uid| uid.parse().ok()),
        }
    }
}
