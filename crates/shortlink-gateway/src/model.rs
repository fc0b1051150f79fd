mod health;
mod mapping;

pub use health::HealthResponse;
pub use mapping::{DecodeResponse, EncodeRequest, EncodeResponse, ErrorResponse};
