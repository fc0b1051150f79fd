use crate::shortcode::ShortCode;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Namespace shared by every key the mapping store writes.
pub const KEY_PREFIX: &str = "url_mapping:";

/// Retention window applied to both key slots on creation (one year).
pub const MAPPING_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// The record linking an original URL to its short code.
///
/// The same serialized payload is stored under the URL key and the code key.
/// Only the code-key copy is authoritative for `access_count`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mapping {
    /// The URL that was shortened, stored byte-exact.
    pub original_url: String,
    /// The generated short code.
    pub short_code: ShortCode,
    /// Number of successful decodes.
    pub access_count: u64,
    /// Creation time in unix seconds.
    pub created_at: i64,
}

impl Mapping {
    /// Creates a fresh mapping with a zero access count, stamped now.
    pub fn new(original_url: impl Into<String>, short_code: ShortCode) -> Self {
        Self {
            original_url: original_url.into(),
            short_code,
            access_count: 0,
            created_at: Timestamp::now().as_second(),
        }
    }

    /// Key slot addressed by the original URL.
    pub fn url_key(url: &str) -> String {
        format!("{KEY_PREFIX}url:{url}")
    }

    /// Key slot addressed by the short code.
    pub fn code_key(code: &ShortCode) -> String {
        format!("{KEY_PREFIX}code:{}", code.as_str())
    }

    /// Time left before a slot written at creation with [`MAPPING_TTL`]
    /// expires, or `None` once that window has passed.
    pub fn remaining_ttl(&self) -> Option<Duration> {
        let expires_at = self.created_at.saturating_add(MAPPING_TTL.as_secs() as i64);
        let left = expires_at.saturating_sub(Timestamp::now().as_second());
        (left > 0).then(|| Duration::from_secs(left as u64))
    }

    /// Returns a copy with the access counter bumped by one.
    pub fn accessed(&self) -> Self {
        Self {
            access_count: self.access_count.saturating_add(1),
            ..self.clone()
        }
    }
}
