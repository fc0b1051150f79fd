use typed_builder::TypedBuilder;

/// Configuration for a disposable Redis server.
///
/// # Example
///
/// ```rust
/// use shortlink_test_infra::redis::RedisConfig;
///
/// let config = RedisConfig::builder().build();
/// assert_eq!(config.tag, "7.4");
///
/// let config = RedisConfig::builder().database(1).build();
/// assert_eq!(config.database, 1);
/// ```
#[derive(Debug, Clone, TypedBuilder)]
pub struct RedisConfig {
    /// Image tag of the `redis` image. `SET ... KEEPTTL` needs 6.0 or newer.
    #[builder(default = "7.4".to_string())]
    pub tag: String,

    /// Logical database used in the connection URL.
    #[builder(default = 0)]
    pub database: u8,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RedisConfig::default();
        assert_eq!(config.tag, "7.4");
        assert_eq!(config.database, 0);
    }

    #[test]
    fn test_custom_config() {
        let config = RedisConfig::builder()
            .tag("6.2".to_string())
            .database(1)
            .build();
        assert_eq!(config.tag, "6.2");
        assert_eq!(config.database, 1);
    }
}
