use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{NaiveDate, Utc};
use rand::{rngs::OsRng, RngCore};

const INVITE_TOKEN_BYTES: usize = 24;

/// 192 bits from the OS generator, URL-safe so it can travel in an invite link.
pub fn generate_invite_token() -> String {
    let mut bytes = [0u8; INVITE_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// The calendar date deadlines are compared against. Deadlines are stored as UTC dates.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub fn split_text_into_title_desc(text: &str) -> Option<(String, Option<String>)> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut iter = trimmed.splitn(2, '\n');
    let title = iter.next().map(|s| s.trim().to_string()).unwrap_or_default();
    let description = iter
        .next()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    Some((title, description))
}
