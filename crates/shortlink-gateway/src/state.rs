use crate::cli::Environment;
use shortlink_core::Shortener;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    shortener: Arc<dyn Shortener>,
    base_url: String,
    environment: Environment,
    port: u16,
}

impl AppState {
    pub fn new(
        shortener: Arc<dyn Shortener>,
        public_base_url: impl Into<String>,
        environment: Environment,
        port: u16,
    ) -> Self {
        Self {
            shortener,
            base_url: public_base_url.into().trim_end_matches('/').to_string(),
            environment,
            port,
        }
    }

    pub fn shortener(&self) -> &dyn Shortener {
        self.shortener.as_ref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }
}
