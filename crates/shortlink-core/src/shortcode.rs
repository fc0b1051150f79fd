use crate::error::CodeError;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Length of every generated short code.
pub const SHORT_CODE_LENGTH: usize = 6;

/// The identifier used in place of an original URL.
///
/// Generated codes are exactly [`SHORT_CODE_LENGTH`] characters drawn from
/// `[A-Z0-9]`. Codes arriving from clients are wrapped verbatim with
/// [`ShortCode::new_unchecked`]: lookups are case-sensitive and a code of the
/// wrong shape simply resolves to nothing.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShortCode(String);

impl ShortCode {
    /// Creates a new `ShortCode` after validating it has the generated shape.
    pub fn new(code: impl Into<String>) -> Result<Self, CodeError> {
        let code = code.into();
        Self::validate(&code)?;
        Ok(Self(code))
    }

    /// Creates a `ShortCode` without validation.
    ///
    /// Use this for lookup input, which is matched byte-for-byte.
    pub fn new_unchecked(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Generates the full shortened URL based on the provided base URL.
    pub fn to_url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self)
    }

    /// Returns the short code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(code: &str) -> Result<(), CodeError> {
        if code.len() != SHORT_CODE_LENGTH {
            return Err(CodeError::Length {
                expected: SHORT_CODE_LENGTH,
                actual: code.len(),
            });
        }

        if !code
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        {
            return Err(CodeError::Alphabet(code.to_string()));
        }

        Ok(())
    }
}

impl Display for ShortCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
