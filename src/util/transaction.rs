//! Transaction id generation.
//!
//! Generated ids have the shape
//! `<appId><yyMMddHHmmssSSS><msisdn suffix><internal code digit>`.

use chrono::{DateTime, Local, TimeZone};
use rand::Rng;

pub const DEFAULT_APP_ID: &str = "N001";
const SUFFIX_LEN: usize = 5;
const TIMESTAMP_FORMAT: &str = "%y%m%d%H%M%S%3f";

/// Return `trx_id` when the caller already has one, otherwise generate a
/// fresh id from the current local time.
pub fn generate_transaction_id(
    trx_id: &str,
    msisdn: &str,
    internal_code: &str,
    api_id: &str,
) -> String {
    generate_transaction_id_at(&Local::now(), trx_id, msisdn, internal_code, api_id)
}

/// [`generate_transaction_id`] with an explicit clock reading.
pub fn generate_transaction_id_at<Tz>(
    now: &DateTime<Tz>,
    trx_id: &str,
    msisdn: &str,
    internal_code: &str,
    api_id: &str,
) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    if !trx_id.is_empty() {
        return trx_id.to_owned();
    }

    let app_id = if api_id.is_empty() { DEFAULT_APP_ID } else { api_id };
    let code = internal_code.chars().last().unwrap_or('0');

    format!(
        "{}{}{}{}",
        app_id,
        now.format(TIMESTAMP_FORMAT),
        msisdn_suffix(msisdn),
        code
    )
}

fn msisdn_suffix(msisdn: &str) -> String {
    if msisdn.is_empty() {
        return random_digits(SUFFIX_LEN);
    }
    let chars: Vec<char> = msisdn.chars().collect();
    if chars.len() >= SUFFIX_LEN {
        chars[chars.len() - SUFFIX_LEN..].iter().collect()
    } else {
        format!("{:0>width$}", msisdn, width = SUFFIX_LEN)
    }
}

fn random_digits(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}
