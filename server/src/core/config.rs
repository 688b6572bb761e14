//! Server Configuration
//!
//! All settings come from environment variables with sensible defaults:
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | WORK_DIR | /var/lib/bakery | working directory (database, logs) |
//! | HTTP_PORT | 3000 | HTTP API port |
//! | ENVIRONMENT | development | development \| staging \| production |
//! | REQUEST_TIMEOUT_MS | 30000 | bound on any single storage call |
//! | JWT_SECRET / JWT_EXPIRATION_MINUTES / JWT_ISSUER / JWT_AUDIENCE | (see auth) | token settings |

use std::path::PathBuf;
use std::time::Duration;

use crate::auth::JwtConfig;

#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory holding the database
    pub work_dir: String,
    /// HTTP API port
    pub http_port: u16,
    /// JWT settings
    pub jwt: JwtConfig,
    /// Running environment: development | staging | production
    pub environment: String,
    /// Upper bound on any single storage call (milliseconds)
    pub request_timeout_ms: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/bakery".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            jwt: JwtConfig::default(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            request_timeout_ms: std::env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(30_000),
        }
    }

    /// Override work dir and port, typically for tests
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    /// Database directory under the work dir
    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    /// Full path of the SQLite database file
    pub fn database_path(&self) -> PathBuf {
        self.database_dir().join("bakery.db")
    }

    /// Storage call timeout as a [`Duration`]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Create the work directory layout if missing
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())
    }
}
