use async_trait::async_trait;
use dashmap::mapref::entry::Entry as MapEntry;
use dashmap::DashMap;
use jiff::{SignedDuration, Timestamp};
use shortlink_core::repository::Result;
use shortlink_core::{Mapping, MappingRepository, ShortCode, StorageError, KEY_PREFIX};
use std::time::Duration;

/// A stored key slot: the serialized mapping and its expiry.
#[derive(Debug, Clone)]
struct Slot {
    payload: String,
    expire_at: Option<Timestamp>,
}

impl Slot {
    fn is_expired(&self) -> bool {
        self.expire_at
            .is_some_and(|expire_at| Timestamp::now() >= expire_at)
    }
}

fn expiry(ttl: Duration) -> Result<Timestamp> {
    let ttl = SignedDuration::try_from(ttl)
        .map_err(|e| StorageError::Operation(format!("invalid ttl: {e}")))?;
    Timestamp::now()
        .checked_add(ttl)
        .map_err(|e| StorageError::Operation(format!("invalid ttl: {e}")))
}

fn encode(mapping: &Mapping) -> Result<String> {
    serde_json::to_string(mapping)
        .map_err(|e| StorageError::Operation(format!("failed to serialize mapping: {e}")))
}

fn decode(key: &str, payload: &str) -> Result<Mapping> {
    serde_json::from_str(payload)
        .map_err(|e| StorageError::InvalidData(format!("invalid value for key '{key}': {e}")))
}

/// In-memory key-value emulation of the Redis layout.
///
/// Keys and JSON payloads are identical to what [`RedisRepository`] writes,
/// and TTLs are honoured lazily on access. DashMap shards its locks, so
/// concurrent requests touching different keys do not block each other.
///
/// [`RedisRepository`]: crate::RedisRepository
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    storage: DashMap<String, Slot>,
}

impl InMemoryRepository {
    /// Creates a new in-memory repository.
    pub fn new() -> Self {
        Self {
            storage: DashMap::new(),
        }
    }

    /// Returns the expiry of a live key, if it has one.
    pub fn expires_at(&self, key: &str) -> Option<Timestamp> {
        self.live(key).and_then(|slot| slot.expire_at)
    }

    /// Returns the raw payload stored under a live key.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.live(key).map(|slot| slot.payload)
    }

    /// Number of live keys.
    pub fn len(&self) -> usize {
        self.storage.iter().filter(|slot| !slot.is_expired()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn live(&self, key: &str) -> Option<Slot> {
        let slot = self.storage.get(key)?;
        if slot.is_expired() {
            drop(slot);
            self.storage.remove_if(key, |_, slot| slot.is_expired());
            return None;
        }
        Some(slot.value().clone())
    }

    /// Like SET NX EX: an expired slot counts as empty.
    fn insert_if_absent(&self, key: String, mapping: &Mapping, ttl: Duration) -> Result<bool> {
        let slot = Slot {
            payload: encode(mapping)?,
            expire_at: Some(expiry(ttl)?),
        };

        match self.storage.entry(key) {
            MapEntry::Occupied(existing) if !existing.get().is_expired() => Ok(false),
            MapEntry::Occupied(mut expired) => {
                expired.insert(slot);
                Ok(true)
            }
            MapEntry::Vacant(vacant) => {
                vacant.insert(slot);
                Ok(true)
            }
        }
    }

    fn read(&self, key: &str) -> Result<Option<Mapping>> {
        self.live(key)
            .map(|slot| decode(key, &slot.payload))
            .transpose()
    }
}

#[async_trait]
impl MappingRepository for InMemoryRepository {
    async fn find_by_url(&self, url: &str) -> Result<Option<Mapping>> {
        self.read(&Mapping::url_key(url))
    }

    async fn find_by_code(&self, code: &ShortCode) -> Result<Option<Mapping>> {
        self.read(&Mapping::code_key(code))
    }

    async fn code_exists(&self, code: &ShortCode) -> Result<bool> {
        Ok(self.live(&Mapping::code_key(code)).is_some())
    }

    async fn insert_url_if_absent(&self, mapping: &Mapping, ttl: Duration) -> Result<bool> {
        self.insert_if_absent(Mapping::url_key(&mapping.original_url), mapping, ttl)
    }

    async fn insert_code_if_absent(&self, mapping: &Mapping, ttl: Duration) -> Result<bool> {
        self.insert_if_absent(Mapping::code_key(&mapping.short_code), mapping, ttl)
    }

    async fn release_url(&self, mapping: &Mapping) -> Result<bool> {
        let key = Mapping::url_key(&mapping.original_url);
        let released = self.storage.remove_if(&key, |stored_key, slot| {
            decode(stored_key, &slot.payload).is_ok_and(|stored| stored.short_code == mapping.short_code)
        });
        Ok(released.is_some_and(|(_, slot)| !slot.is_expired()))
    }

    async fn update_code(&self, mapping: &Mapping) -> Result<()> {
        let payload = encode(mapping)?;
        let key = Mapping::code_key(&mapping.short_code);

        // Like SET XX KEEPTTL: an expired or missing slot is not resurrected.
        if let MapEntry::Occupied(mut slot) = self.storage.entry(key) {
            if slot.get().is_expired() {
                slot.remove();
            } else {
                slot.get_mut().payload = payload;
            }
        }
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn clear(&self) -> Result<u64> {
        let before = self.storage.len();
        self.storage.retain(|key, _| !key.starts_with(KEY_PREFIX));
        Ok(before.saturating_sub(self.storage.len()) as u64)
    }
}
