use std::fmt;
use std::str::FromStr;

use bb8_redis::redis::{ConnectionInfo, IntoConnectionInfo};
use sqlx::postgres::PgConnectOptions;

use crate::auth::jwt::JwtConfig;
use crate::auth::password::{
    PasswordConfig, DEFAULT_ITERATIONS, DEFAULT_MEMORY_KIB, DEFAULT_PARALLELISM,
};

/// A configuration value that is missing or does not parse.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set in the environment")]
    Missing(&'static str),

    #[error("{name} must be a valid {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

/// Connection settings for the credential store.
///
/// Held as parsed options rather than a URL so that a password with
/// reserved URL characters needs no escaping.
#[derive(Clone)]
pub struct DatabaseConfig {
    pub connect: PgConnectOptions,
    pub max_connections: u32,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.connect.get_host())
            .field("port", &self.connect.get_port())
            .field("database", &self.connect.get_database())
            .field("password", &"<redacted>")
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

/// Connection settings for the session cache.
#[derive(Clone)]
pub struct RedisConfig {
    pub connection: ConnectionInfo,
}

impl fmt::Debug for RedisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisConfig")
            .field("addr", &self.connection.addr)
            .field("db", &self.connection.redis.db)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Server configuration loaded from environment variables.
///
/// Built once at startup and passed down; nothing else reads the
/// environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8080`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    pub log_format: LogFormat,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    /// Token signing secret.
    pub jwt: JwtConfig,
    /// Password hashing work factor.
    pub password: PasswordConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default                      |
    /// |-----------------------------|------------------------------|
    /// | `HOST`                      | `0.0.0.0`                    |
    /// | `PORT`                      | `8080`                       |
    /// | `CORS_ORIGINS`              | `http://localhost:3000`      |
    /// | `REQUEST_TIMEOUT_SECS`      | `30`                         |
    /// | `LOG_FORMAT`                | `json` (`json` or `pretty`)  |
    /// | `DATABASE_URL`              | built from `DB_*`            |
    /// | `DB_HOST`                   | `postgresql-service`         |
    /// | `DB_PORT`                   | `5432`                       |
    /// | `DB_NAME`                   | `sre_db`                     |
    /// | `DB_USER`                   | `postgres`                   |
    /// | `DB_PASSWORD`               | `password`                   |
    /// | `DB_MAX_CONNECTIONS`        | `20`                         |
    /// | `REDIS_URL`                 | built from `REDIS_*`         |
    /// | `REDIS_HOST`                | `redis-service`              |
    /// | `REDIS_PORT`                | `6379`                       |
    /// | `JWT_SECRET`                | **required**                 |
    /// | `PASSWORD_HASH_MEMORY_KIB`  | `19456`                      |
    /// | `PASSWORD_HASH_ITERATIONS`  | `2`                          |
    /// | `PASSWORD_HASH_PARALLELISM` | `1`                          |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source. Empty
    /// values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let host = env.string("HOST", "0.0.0.0");
        let port = env.parse("PORT", "8080", "u16")?;

        let cors_origins: Vec<String> = env
            .string("CORS_ORIGINS", "http://localhost:3000")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs = env.parse("REQUEST_TIMEOUT_SECS", "30", "u64")?;

        let log_format = match env.string("LOG_FORMAT", "json").as_str() {
            "json" => LogFormat::Json,
            "pretty" => LogFormat::Pretty,
            other => {
                return Err(ConfigError::Invalid {
                    name: "LOG_FORMAT",
                    expected: "log format (json or pretty)",
                    value: other.to_string(),
                })
            }
        };

        let connect = match env.get("DATABASE_URL") {
            Some(url) => PgConnectOptions::from_str(&url).map_err(|_| ConfigError::Invalid {
                name: "DATABASE_URL",
                expected: "PostgreSQL connection URL",
                value: "<redacted>".to_string(),
            })?,
            None => PgConnectOptions::new()
                .host(&env.string("DB_HOST", "postgresql-service"))
                .port(env.parse("DB_PORT", "5432", "u16")?)
                .username(&env.string("DB_USER", "postgres"))
                .password(&env.string("DB_PASSWORD", "password"))
                .database(&env.string("DB_NAME", "sre_db")),
        };
        let database = DatabaseConfig {
            connect,
            max_connections: env.parse("DB_MAX_CONNECTIONS", "20", "u32")?,
        };

        let connection = match env.get("REDIS_URL") {
            Some(url) => url
                .as_str()
                .into_connection_info()
                .map_err(|_| ConfigError::Invalid {
                    name: "REDIS_URL",
                    expected: "Redis connection URL",
                    value: "<redacted>".to_string(),
                })?,
            None => {
                let host = env.string("REDIS_HOST", "redis-service");
                let port: u16 = env.parse("REDIS_PORT", "6379", "u16")?;
                (host.clone(), port)
                    .into_connection_info()
                    .map_err(|_| ConfigError::Invalid {
                        name: "REDIS_HOST",
                        expected: "Redis host name",
                        value: host,
                    })?
            }
        };
        let redis = RedisConfig { connection };

        let jwt = JwtConfig {
            secret: env.get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?,
        };

        let password = PasswordConfig {
            memory_kib: env.parse(
                "PASSWORD_HASH_MEMORY_KIB",
                &DEFAULT_MEMORY_KIB.to_string(),
                "u32",
            )?,
            iterations: env.parse(
                "PASSWORD_HASH_ITERATIONS",
                &DEFAULT_ITERATIONS.to_string(),
                "u32",
            )?,
            parallelism: env.parse(
                "PASSWORD_HASH_PARALLELISM",
                &DEFAULT_PARALLELISM.to_string(),
                "u32",
            )?,
        };

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            log_format,
            database,
            redis,
            jwt,
            password,
        })
    }
}

struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, name: &str) -> Option<String> {
        (self.0)(name).filter(|v| !v.is_empty())
    }

    fn string(&self, name: &str, default: &str) -> String {
        self.get(name).unwrap_or_else(|| default.to_string())
    }

    fn parse<T: std::str::FromStr>(
        &self,
        name: &'static str,
        default: &str,
        expected: &'static str,
    ) -> Result<T, ConfigError> {
        let value = self.string(name, default);
        value.parse().map_err(|_| ConfigError::Invalid {
            name,
            expected,
            value,
        })
    }
}
