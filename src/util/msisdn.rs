//! Subscriber number checks.

const COUNTRY_PREFIX: &str = "62";
const MIN_LEN: usize = 11;
const MAX_LEN: usize = 13;

/// True when `msisdn` is an all-digit Indonesian number (`62...`) of
/// 11 to 13 digits.
pub fn validate_msisdn(msisdn: &str) -> bool {
    !msisdn.is_empty()
        && msisdn.bytes().all(|b| b.is_ascii_digit())
        && msisdn.starts_with(COUNTRY_PREFIX)
        && (MIN_LEN..=MAX_LEN).contains(&msisdn.len())
}
