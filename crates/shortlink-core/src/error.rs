use thiserror::Error;

/// Errors raised by a [`MappingRepository`](crate::MappingRepository) backend.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("storage operation timed out: {0}")]
    Timeout(String),
    #[error("stored data is invalid: {0}")]
    InvalidData(String),
    #[error("storage operation failed: {0}")]
    Operation(String),
}

impl StorageError {
    /// Whether the failure means the store could not be reached at all.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Timeout(_))
    }
}

/// Errors raised while constructing a [`ShortCode`](crate::ShortCode).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodeError {
    #[error("short code must be {expected} characters long, got {actual}")]
    Length { expected: usize, actual: usize },
    #[error("short code must contain only uppercase letters and digits: '{0}'")]
    Alphabet(String),
}

/// Errors surfaced by the mapping store to its callers.
#[derive(Debug, Clone, Error)]
pub enum ShortenerError {
    /// The key-value store could not be reached. Clients may retry.
    #[error("mapping store unavailable: {0}")]
    StoreUnavailable(String),
    /// No free short code was found within the attempt budget.
    #[error("no free short code after {attempts} attempts")]
    CodeSpaceExhausted { attempts: usize },
    /// Any other store failure (corrupt payload, protocol error).
    #[error("unexpected storage failure: {0}")]
    Unexpected(String),
}

impl From<StorageError> for ShortenerError {
    fn from(value: StorageError) -> Self {
        if value.is_unavailable() {
            Self::StoreUnavailable(value.to_string())
        } else {
            Self::Unexpected(value.to_string())
        }
    }
}
