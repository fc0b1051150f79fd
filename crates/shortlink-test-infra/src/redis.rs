mod config;
mod server;

pub use {config::RedisConfig, server::RedisServer};
