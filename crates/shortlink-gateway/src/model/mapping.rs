use crate::error::AppError;
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Deserialize)]
pub struct EncodeRequest {
    pub url: Option<String>,
}

impl EncodeRequest {
    /// Returns the URL if it is present, non-empty and an absolute http(s)
    /// URL with a host. The original string is returned untouched.
    pub fn validated_url(self) -> Result<String, AppError> {
        let url = match self.url {
            Some(url) if !url.is_empty() => url,
            _ => return Err(AppError::MissingUrl),
        };

        let parsed = Url::parse(&url).map_err(|_| AppError::InvalidUrl)?;
        let has_host = parsed.host_str().is_some_and(|host| !host.is_empty());
        if !matches!(parsed.scheme(), "http" | "https") || !has_host {
            return Err(AppError::InvalidUrl);
        }

        Ok(url)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EncodeResponse {
    pub original_url: String,
    pub short_url: String,
    pub short_code: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DecodeResponse {
    pub short_code: String,
    pub original_url: String,
    pub short_url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
