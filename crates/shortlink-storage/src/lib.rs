//! Key-value backends for the mapping store.
//!
//! [`RedisRepository`] is the production backend. [`InMemoryRepository`]
//! emulates the same key layout and TTL behaviour for tests and local runs.

pub mod memory;
pub mod redis;

pub use memory::InMemoryRepository;
pub use redis::RedisRepository;
pub use shortlink_core::{MappingRepository, StorageError};
