use crate::error::ShortenerError;
use crate::mapping::Mapping;
use crate::shortcode::ShortCode;
use async_trait::async_trait;

type Result<T> = std::result::Result<T, ShortenerError>;

/// Upper bound on short code draws for a single encode.
pub const MAX_GENERATION_ATTEMPTS: usize = 100;

#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Returns the mapping for `url`, creating it if the URL is new.
    ///
    /// The URL must already be validated by the caller. Encoding the same URL
    /// twice yields the same mapping.
    async fn encode(&self, url: &str) -> Result<Mapping>;

    /// Resolves a short code, counting the access.
    ///
    /// Returns `None` if the code is unknown or has expired.
    async fn decode(&self, code: &ShortCode) -> Result<Option<Mapping>>;

    /// Checks that the backing store is reachable.
    async fn ping(&self) -> Result<()>;
}
