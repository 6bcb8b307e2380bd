/// Configuration management for the API server
///
/// Settings are layered: built-in defaults, then `TASKBOARD_`-prefixed
/// environment variables (nested with `__`), then the conventional
/// `DATABASE_URL` and `JWT_SECRET` overrides. A `.env` file is loaded first
/// when present.
///
/// # Environment Variables
///
/// - `DATABASE_URL` / `TASKBOARD_DATABASE__URL`: PostgreSQL connection string,
///   or `memory://` for the in-memory store (default)
/// - `JWT_SECRET` / `TASKBOARD_JWT__SECRET`: token signing key, at least 32 chars (required)
/// - `TASKBOARD_JWT__TTL_MINUTES`: access token lifetime (default: 30)
/// - `TASKBOARD_API__HOST`, `TASKBOARD_API__PORT`: bind address (default: 0.0.0.0:8080)
/// - `TASKBOARD_API__CORS_ORIGINS`: comma separated, `*` for any (default: *)
/// - `TASKBOARD_API__SEED_SAMPLE_DATA`: insert demo users and tasks at startup
/// - `TASKBOARD_HASHING__MEMORY_KIB`, `__ITERATIONS`, `__PARALLELISM`: Argon2 cost
/// - `TASKBOARD_LOG__FORMAT`: `pretty` or `json`
/// - `RUST_LOG`: log filter
///
/// # Example
///
/// ```no_run
/// use taskboard_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use std::env;
use std::fmt;

use anyhow::Context;
use config::Environment;
use serde::Deserialize;
use taskboard_shared::auth::password::HashingParams;
use taskboard_shared::db::pool::DatabaseConfig;

const MIN_SECRET_LEN: usize = 32;

/// Complete application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseSettings,
    pub jwt: JwtConfig,
    pub hashing: HashingParams,
    pub log: LogConfig,
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,

    /// Allowed CORS origins; `*` means permissive
    pub cors_origins: Vec<String>,

    /// Insert the demo data set at startup
    pub seed_sample_data: bool,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// PostgreSQL URL, or `memory://` for the in-memory store
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_seconds: u64,
}

impl DatabaseSettings {
    pub fn is_memory(&self) -> bool {
        self.url.starts_with("memory:")
    }

    /// Pool settings for [`taskboard_shared::db::pool::create_pool`]
    pub fn pool_config(&self) -> DatabaseConfig {
        DatabaseConfig {
            url: self.url.clone(),
            max_connections: self.max_connections,
            min_connections: self.min_connections,
            connect_timeout_seconds: self.connect_timeout_seconds,
            ..Default::default()
        }
    }
}

/// JWT configuration
#[derive(Clone, Deserialize)]
pub struct JwtConfig {
    /// HS256 signing key
    ///
    /// Generate with: `openssl rand -hex 32`
    pub secret: String,

    pub ttl_minutes: i64,
}

impl JwtConfig {
    pub fn ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.ttl_minutes)
    }
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("ttl_minutes", &self.ttl_minutes)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    pub format: LogFormat,
}

impl Config {
    /// Loads configuration from `.env` and the process environment
    ///
    /// # Errors
    ///
    /// Returns an error if a variable can't be parsed or the result fails
    /// validation (e.g. a missing or short JWT secret).
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::load(
            Environment::with_prefix("TASKBOARD"),
            env::var("DATABASE_URL").ok(),
            env::var("JWT_SECRET").ok(),
        )
    }

    fn load(
        environment: Environment,
        database_url: Option<String>,
        jwt_secret: Option<String>,
    ) -> anyhow::Result<Self> {
        let defaults = HashingParams::default();

        let config: Config = config::Config::builder()
            .set_default("api.host", "0.0.0.0")?
            .set_default("api.port", 8080)?
            .set_default("api.cors_origins", vec!["*"])?
            .set_default("api.seed_sample_data", false)?
            .set_default("database.url", "memory://")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 1)?
            .set_default("database.connect_timeout_seconds", 30)?
            .set_default("jwt.secret", "")?
            .set_default("jwt.ttl_minutes", 30)?
            .set_default("hashing.memory_kib", i64::from(defaults.memory_kib))?
            .set_default("hashing.iterations", i64::from(defaults.iterations))?
            .set_default("hashing.parallelism", i64::from(defaults.parallelism))?
            .set_default("log.format", "pretty")?
            .add_source(
                environment
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("api.cors_origins"),
            )
            .set_override_option("database.url", database_url)?
            .set_override_option("jwt.secret", jwt_secret)?
            .build()?
            .try_deserialize()
            .context("invalid configuration")?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.jwt.secret.is_empty() {
            anyhow::bail!("JWT_SECRET environment variable is required");
        }
        if self.jwt.secret.len() < MIN_SECRET_LEN {
            anyhow::bail!("JWT_SECRET must be at least {MIN_SECRET_LEN} characters long");
        }
        if self.jwt.ttl_minutes <= 0 {
            anyhow::bail!("jwt.ttl_minutes must be positive");
        }
        if self.database.min_connections > self.database.max_connections {
            anyhow::bail!("database.min_connections exceeds database.max_connections");
        }
        Ok(())
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}
