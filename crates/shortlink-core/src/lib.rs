//! Core types and traits for the ShortLink URL shortener.
//!
//! This crate provides the mapping record, the short code type, the error
//! taxonomy and the seams (repository and shortener traits) shared by the
//! storage backends, the shortener service and the HTTP gateway.

pub mod error;
pub mod mapping;
pub mod repository;
pub mod shortcode;
pub mod shortener;

pub use error::{CodeError, ShortenerError, StorageError};
pub use mapping::{Mapping, KEY_PREFIX, MAPPING_TTL};
pub use repository::MappingRepository;
pub use shortcode::{ShortCode, SHORT_CODE_LENGTH};
pub use shortener::{Shortener, MAX_GENERATION_ATTEMPTS};
