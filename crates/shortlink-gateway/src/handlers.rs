mod health;
mod mapping;

pub use health::health_handler;
pub use mapping::{decode_handler, encode_handler, not_found_handler, redirect_handler};
