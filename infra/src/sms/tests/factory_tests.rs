//! Unit tests for the SMS client registry

use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;

use sms_core::domain::properties::PLACEHOLDER_CREDENTIAL;
use sms_core::{SmsChannelProperties, SmsChannelType, SmsClientFactory, SmsError};

use crate::sms::SmsClientFactoryImpl;

fn factory() -> SmsClientFactoryImpl {
    SmsClientFactoryImpl::bootstrapped().unwrap()
}

#[test]
fn test_bootstrap_seeds_every_channel_type() {
    let factory = factory();
    for channel in SmsChannelType::ALL {
        let client = factory
            .get_client_by_code(channel.code())
            .expect("placeholder client for every channel type");
        assert_eq!(client.channel_type(), channel);
        assert_eq!(client.id(), None);
        assert_eq!(client.properties().api_key, PLACEHOLDER_CREDENTIAL);
    }
    assert!(factory.get_client_by_code("TENCENT").is_none());
}

#[test]
fn test_new_factory_is_empty() {
    let factory = SmsClientFactoryImpl::new();
    assert!(factory.get_client_by_code("ALIYUN").is_none());
    assert!(factory.channel_ids().is_empty());
}

#[test]
fn test_unknown_id_is_absent() {
    let factory = factory();
    assert!(factory.get_client(999).is_none());
}

#[test]
fn test_create_registers_and_reuses_instance() {
    let factory = factory();
    factory
        .create_or_update_client(SmsChannelProperties::new(5, "ALIYUN", "k", "s"))
        .unwrap();

    let first = factory.get_client(5).unwrap();
    let second = factory.get_client(5).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.id(), Some(5));
    assert_eq!(first.channel_type(), SmsChannelType::Aliyun);
    assert_eq!(factory.channel_ids(), vec![5]);
}

#[test]
fn test_update_refreshes_in_place() {
    let factory = factory();
    factory
        .create_or_update_client(SmsChannelProperties::new(5, "YUN_PIAN", "k", "s"))
        .unwrap();
    let before = factory.get_client(5).unwrap();

    let updated = SmsChannelProperties::new(5, "YUN_PIAN", "k2", "s2").with_signature("Acme");
    factory.create_or_update_client(updated.clone()).unwrap();

    let after = factory.get_client(5).unwrap();
    assert!(Arc::ptr_eq(&before, &after));
    assert_eq!(after.properties(), updated);
}

#[test]
fn test_update_with_identical_properties() {
    let factory = factory();
    let properties = SmsChannelProperties::new(6, "ALIYUN", "k", "s");
    factory.create_or_update_client(properties.clone()).unwrap();
    let before = factory.get_client(6).unwrap();

    factory.create_or_update_client(properties.clone()).unwrap();
    let after = factory.get_client(6).unwrap();
    assert!(Arc::ptr_eq(&before, &after));
    assert_eq!(after.properties(), properties);
}

#[test]
fn test_unknown_code_is_rejected_without_mutation() {
    let factory = factory();
    let result = factory.create_or_update_client(SmsChannelProperties::new(7, "TENCENT", "k", "s"));

    assert_eq!(
        result.unwrap_err(),
        SmsError::UnknownChannel {
            code: "TENCENT".to_string()
        }
    );
    assert!(factory.get_client(7).is_none());
    assert!(factory.get_client_by_code("TENCENT").is_none());
    assert!(factory.channel_ids().is_empty());
}

/// Log sink shared between the subscriber and the test
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_unknown_code_is_logged_at_error_level() {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::ERROR)
        .finish();

    let factory = factory();
    let result = tracing::subscriber::with_default(subscriber, || {
        factory.create_or_update_client(SmsChannelProperties::new(
            7,
            "TENCENT",
            "AKIDexample",
            "s3cret-value",
        ))
    });
    assert!(matches!(result, Err(SmsError::UnknownChannel { .. })));

    let output = logs.contents();
    assert!(output.contains("ERROR"), "no error line in: {}", output);
    assert!(output.contains("TENCENT"));
    assert!(output.contains("AKID****"));
    assert!(!output.contains("s3cret-value"));
    assert!(!output.contains("AKIDexample"));
}

#[test]
fn test_unknown_code_for_existing_id_keeps_client() {
    let factory = factory();
    let original = SmsChannelProperties::new(8, "ALIYUN", "k", "s");
    factory.create_or_update_client(original.clone()).unwrap();
    let before = factory.get_client(8).unwrap();

    let result = factory.create_or_update_client(SmsChannelProperties::new(8, "TENCENT", "k", "s"));
    assert!(matches!(result, Err(SmsError::UnknownChannel { .. })));

    let after = factory.get_client(8).unwrap();
    assert!(Arc::ptr_eq(&before, &after));
    assert_eq!(after.properties(), original);
}

#[test]
fn test_channel_type_change_replaces_client() {
    let factory = factory();
    factory
        .create_or_update_client(SmsChannelProperties::new(10, "ALIYUN", "k", "s"))
        .unwrap();
    let before = factory.get_client(10).unwrap();

    factory
        .create_or_update_client(SmsChannelProperties::new(10, "YUN_PIAN", "k", ""))
        .unwrap();
    let after = factory.get_client(10).unwrap();

    assert!(!Arc::ptr_eq(&before, &after));
    assert_eq!(after.channel_type(), SmsChannelType::YunPian);
}

#[test]
fn test_missing_id_is_rejected() {
    let factory = factory();
    let result = factory.create_or_update_client(SmsChannelProperties::placeholder(SmsChannelType::Aliyun));
    assert_eq!(
        result.unwrap_err(),
        SmsError::MissingChannelId {
            code: "ALIYUN".to_string()
        }
    );
    assert!(factory.channel_ids().is_empty());
}

#[test]
fn test_create_client_does_not_register() {
    let factory = factory();
    let client = factory
        .create_client(SmsChannelProperties::new(11, "YUN_PIAN", "k", ""))
        .unwrap();
    assert_eq!(client.id(), Some(11));
    assert!(factory.get_client(11).is_none());
}

#[test]
fn test_id_and_code_maps_are_independent() {
    let factory = factory();
    let placeholder = factory.get_client_by_code("ALIYUN").unwrap();
    factory
        .create_or_update_client(SmsChannelProperties::new(12, "ALIYUN", "k", "s"))
        .unwrap();

    let by_code = factory.get_client_by_code("ALIYUN").unwrap();
    assert!(Arc::ptr_eq(&placeholder, &by_code));
    assert!(!Arc::ptr_eq(&by_code, &factory.get_client(12).unwrap()));
}
