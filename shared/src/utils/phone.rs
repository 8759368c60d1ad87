//! Phone number utilities
//!
//! Both supported vendors accept mainland mobile numbers without a country
//! prefix and international numbers in E.164 form.

use once_cell::sync::Lazy;
use regex::Regex;

// Mainland China mobile number
static CHINA_MOBILE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\+?86)?1[3-9]\d{9}$").unwrap()
});

// International phone number (E.164)
static INTERNATIONAL_PHONE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\+[1-9]\d{6,14}$").unwrap()
});

/// Strip formatting characters, keeping digits and a leading '+'
pub fn normalize_mobile(phone: &str) -> String {
    phone
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect()
}

/// Check whether a mobile number can be handed to an SMS vendor
pub fn is_valid_mobile(phone: &str) -> bool {
    let normalized = normalize_mobile(phone);
    CHINA_MOBILE_REGEX.is_match(&normalized) || INTERNATIONAL_PHONE_REGEX.is_match(&normalized)
}

/// Mask a phone number for logs (e.g. 138****5678)
pub fn mask_phone_number(phone: &str) -> String {
    let normalized = normalize_mobile(phone);
    if normalized.len() >= 7 {
        format!(
            "{}****{}",
            &normalized[0..3],
            &normalized[normalized.len() - 4..]
        )
    } else {
        "****".to_string()
    }
}

/// Mask a credential for logs, keeping at most the first four characters
pub fn mask_secret(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("{}****", visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_mobile() {
        assert_eq!(normalize_mobile("138-1234-5678"), "13812345678");
        assert_eq!(normalize_mobile("+86 138 1234 5678"), "+8613812345678");
        assert_eq!(normalize_mobile("(138) 1234-5678"), "13812345678");
    }

    #[test]
    fn test_is_valid_mobile() {
        assert!(is_valid_mobile("13812345678"));
        assert!(is_valid_mobile("+8613812345678"));
        assert!(is_valid_mobile("+14155552671"));
        assert!(is_valid_mobile("158 1234 5678"));

        assert!(!is_valid_mobile("12812345678")); // Invalid prefix
        assert!(!is_valid_mobile("1381234567")); // Too short
        assert!(!is_valid_mobile("+0123456789")); // Invalid country code
        assert!(!is_valid_mobile(""));
    }

    #[test]
    fn test_mask_phone_number() {
        assert_eq!(mask_phone_number("13812345678"), "138****5678");
        assert_eq!(mask_phone_number("+8613812345678"), "+86****5678");
        assert_eq!(mask_phone_number("12345"), "****");
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("LTAI5tAbCdEf"), "LTAI****");
        assert_eq!(mask_secret("abcd"), "****");
        assert_eq!(mask_secret(""), "****");
    }
}
