use clap::{Parser, ValueEnum};
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;

pub const LISTEN_ADDR_ENV: &str = "SHORTLINK_LISTEN_ADDR";
pub const PORT_ENV: &str = "PORT";
pub const ENVIRONMENT_ENV: &str = "SHORTLINK_ENV";
pub const BASE_URL_ENV: &str = "BASE_URL";
pub const HOSTNAME_ENV: &str = "HOSTNAME";
pub const STORAGE_BACKEND_ENV: &str = "SHORTLINK_STORAGE_BACKEND";
pub const REDIS_URL_ENV: &str = "REDIS_URL";
pub const REDIS_POOL_SIZE_ENV: &str = "SHORTLINK_REDIS_POOL_SIZE";
pub const LOG_FORMAT_ENV: &str = "SHORTLINK_LOG_FORMAT";

pub const DEFAULT_REDIS_URL: &str = "redis://localhost:6379";
pub const DEFAULT_REDIS_POOL_SIZE: usize = 16;
pub const DEVELOPMENT_PORT: u16 = 4567;
pub const PRODUCTION_PORT: u16 = 8080;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Environment {
    #[value(name = "development")]
    Development,
    #[value(name = "production")]
    Production,
}

impl Display for Environment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "redis")]
    Redis,
    #[value(name = "in-memory")]
    InMemory,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::Redis => write!(f, "redis"),
            StorageBackendArg::InMemory => write!(f, "in-memory"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[value(name = "text")]
    Text,
    #[value(name = "json")]
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "shortlink-gateway")]
pub struct Cli {
    /// Deployment mode. Only networking defaults depend on it.
    #[arg(
        long,
        env = ENVIRONMENT_ENV,
        value_enum,
        default_value_t = Environment::Development
    )]
    pub environment: Environment,

    /// Explicit listen address. Overrides `--port`.
    #[arg(long, env = LISTEN_ADDR_ENV)]
    pub listen_addr: Option<SocketAddr>,

    /// Port to bind on all interfaces; honoured in production mode.
    #[arg(long, env = PORT_ENV)]
    pub port: Option<u16>,

    /// Public base URL used to build short links.
    #[arg(long, env = BASE_URL_ENV)]
    pub base_url: Option<String>,

    /// Host name used for the production base URL when none is given.
    #[arg(long, env = HOSTNAME_ENV)]
    pub hostname: Option<String>,

    #[arg(
        long,
        env = STORAGE_BACKEND_ENV,
        value_enum,
        default_value_t = StorageBackendArg::Redis
    )]
    pub storage: StorageBackendArg,

    #[arg(long, env = REDIS_URL_ENV, default_value = DEFAULT_REDIS_URL)]
    pub redis_url: String,

    #[arg(long, env = REDIS_POOL_SIZE_ENV, default_value_t = DEFAULT_REDIS_POOL_SIZE)]
    pub redis_pool_size: usize,

    #[arg(long, env = LOG_FORMAT_ENV, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl Cli {
    /// Address the HTTP server binds to.
    pub fn listen_addr(&self) -> SocketAddr {
        if let Some(addr) = self.listen_addr {
            return addr;
        }

        let port = match self.environment {
            Environment::Production => self.port.unwrap_or(PRODUCTION_PORT),
            Environment::Development => DEVELOPMENT_PORT,
        };
        SocketAddr::from(([0, 0, 0, 0], port))
    }

    /// Base URL prefixed to short codes.
    pub fn base_url(&self) -> String {
        match (&self.base_url, self.environment) {
            (Some(base_url), _) => base_url.clone(),
            (None, Environment::Production) => format!(
                "https://{}",
                self.hostname.as_deref().unwrap_or("localhost")
            ),
            (None, Environment::Development) => format!("http://localhost:{DEVELOPMENT_PORT}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["shortlink-gateway"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn development_defaults() {
        let cli = parse(&["--environment", "development", "--redis-url", "redis://r:6379"]);

        assert_eq!(cli.listen_addr(), "0.0.0.0:4567".parse().unwrap());
        assert_eq!(cli.redis_url, "redis://r:6379");
        assert_eq!(cli.storage, StorageBackendArg::Redis);
    }

    #[test]
    fn development_ignores_port() {
        let cli = parse(&["--environment", "development", "--port", "9000"]);

        assert_eq!(cli.listen_addr().port(), 4567);
    }

    #[test]
    fn production_uses_port() {
        let cli = parse(&["--environment", "production", "--port", "9000"]);
        assert_eq!(cli.listen_addr(), "0.0.0.0:9000".parse().unwrap());

        let cli = parse(&["--environment", "production"]);
        if std::env::var(PORT_ENV).is_err() {
            assert_eq!(cli.listen_addr().port(), 8080);
        }
    }

    #[test]
    fn explicit_listen_addr_wins() {
        let cli = parse(&[
            "--environment",
            "production",
            "--port",
            "9000",
            "--listen-addr",
            "127.0.0.1:3000",
        ]);

        assert_eq!(cli.listen_addr(), "127.0.0.1:3000".parse().unwrap());
    }

    #[test]
    fn explicit_base_url_wins() {
        let cli = parse(&["--environment", "production", "--base-url", "https://sho.rt/"]);

        assert_eq!(cli.base_url(), "https://sho.rt/");
    }

    #[test]
    fn production_base_url_from_hostname() {
        let cli = parse(&[
            "--environment",
            "production",
            "--hostname",
            "links.example.com",
        ]);

        if std::env::var(BASE_URL_ENV).is_err() {
            assert_eq!(cli.base_url(), "https://links.example.com");
        }
    }

    #[test]
    fn storage_backend_values() {
        let cli = parse(&["--storage", "in-memory"]);
        assert_eq!(cli.storage, StorageBackendArg::InMemory);
        assert_eq!(cli.storage.to_string(), "in-memory");
    }

    #[test]
    fn rejects_unknown_environment() {
        assert!(Cli::try_parse_from(["shortlink-gateway", "--environment", "staging"]).is_err());
    }
}
