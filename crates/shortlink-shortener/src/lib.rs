//! URL shortener service implementation.
//!
//! This crate provides [`ShortenerService`], the mapping store behind the
//! HTTP gateway. Core types are re-exported from `shortlink_core`.

pub mod service;

pub use service::ShortenerService;
pub use shortlink_core::{Mapping, ShortCode, Shortener, ShortenerError};
