use crate::error::StorageError;
use crate::mapping::Mapping;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use std::time::Duration;

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// The key-value seam behind the mapping store.
///
/// Every mapping lives under two key slots: one addressed by the original URL
/// and one by the short code (see [`Mapping::url_key`] and
/// [`Mapping::code_key`]). The shortener service is the only writer.
#[async_trait]
pub trait MappingRepository: Send + Sync + 'static {
    /// Looks up the mapping stored under the URL slot.
    async fn find_by_url(&self, url: &str) -> Result<Option<Mapping>>;

    /// Looks up the mapping stored under the code slot.
    async fn find_by_code(&self, code: &ShortCode) -> Result<Option<Mapping>>;

    /// Checks whether the code slot is occupied.
    async fn code_exists(&self, code: &ShortCode) -> Result<bool>;

    /// Writes the URL slot only if it is empty, with the given TTL.
    ///
    /// Returns `false` when another writer already owns the URL. This is the
    /// commit point for a new mapping.
    async fn insert_url_if_absent(&self, mapping: &Mapping, ttl: Duration) -> Result<bool>;

    /// Writes the code slot only if it is empty, with the given TTL.
    ///
    /// Returns `false` when the code already belongs to a live mapping.
    async fn insert_code_if_absent(&self, mapping: &Mapping, ttl: Duration) -> Result<bool>;

    /// Deletes the URL slot of `mapping`, but only while it still points at
    /// `mapping.short_code`.
    ///
    /// Returns `true` if a slot was deleted.
    async fn release_url(&self, mapping: &Mapping) -> Result<bool>;

    /// Overwrites the code slot while keeping its remaining TTL.
    async fn update_code(&self, mapping: &Mapping) -> Result<()>;

    /// Checks that the backing store is reachable.
    async fn ping(&self) -> Result<()>;

    /// Removes every key under the mapping namespace.
    ///
    /// Returns the number of keys deleted.
    async fn clear(&self) -> Result<u64>;
}
