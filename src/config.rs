use std::env;

/// ConfigError
///
/// A required variable is missing or a value does not parse. `main` reports it
/// and exits before anything binds.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set in production")]
    Missing(&'static str),

    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Env
///
/// Runtime context. Local turns on the development conveniences (`x-user-id`
/// bypass, in-memory store, MinIO defaults); Production requires every secret.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Env {
    Local,
    Production,
}

/// AppConfig
///
/// Immutable configuration loaded once at startup and shared through the app
/// state via `FromRef`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub env: Env,
    pub bind_addr: String,
    /// Postgres connection string. `None` selects the in-memory store (local only).
    pub db_url: Option<String>,
    /// HS256 secret used to verify bearer tokens.
    pub jwt_secret: String,
    /// Identity provider base URL and API key, used by registration.
    pub auth_url: Option<String>,
    pub auth_api_key: Option<String>,
    pub s3_endpoint: String,
    pub s3_region: String,
    pub s3_key: String,
    pub s3_secret: String,
    pub s3_bucket: String,
    pub locales: Vec<String>,
    pub default_locale: String,
    /// Seed for the mock generator; unset means a fresh random data set per start.
    pub mock_seed: Option<u64>,
    /// Base record count for the in-memory demo store.
    pub mock_count: usize,
}

const LOCAL_JWT_SECRET: &str = "living-stones-local-secret";

impl Default for AppConfig {
    /// Test-safe values; nothing here reads the environment.
    fn default() -> Self {
        Self {
            env: Env::Local,
            bind_addr: "0.0.0.0:3000".to_string(),
            db_url: None,
            jwt_secret: LOCAL_JWT_SECRET.to_string(),
            auth_url: None,
            auth_api_key: None,
            s3_endpoint: "http://localhost:9000".to_string(),
            s3_region: "us-east-1".to_string(),
            s3_key: "admin".to_string(),
            s3_secret: "password".to_string(),
            s3_bucket: "living-stones-documents".to_string(),
            locales: vec!["en".to_string(), "es".to_string()],
            default_locale: "en".to_string(),
            mock_seed: None,
            mock_count: 25,
        }
    }
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    optional(name).ok_or(ConfigError::Missing(name))
}

fn parsed<T: std::str::FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match optional(name) {
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(None),
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from the environment. In production every secret
    /// must be present; locally each has a development default.
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let env = match optional("APP_ENV").as_deref() {
            Some("production") => Env::Production,
            Some("local") | None => Env::Local,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "APP_ENV",
                    value: other.to_string(),
                });
            }
        };

        let locales: Vec<String> = match optional("LOCALES") {
            Some(list) => list
                .split(',')
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty())
                .collect(),
            None => defaults.locales.clone(),
        };
        let default_locale = optional("DEFAULT_LOCALE").unwrap_or(defaults.default_locale.clone());
        if !locales.contains(&default_locale) {
            return Err(ConfigError::Invalid {
                name: "DEFAULT_LOCALE",
                value: default_locale,
            });
        }

        let bind_addr = optional("BIND_ADDR").unwrap_or(defaults.bind_addr.clone());
        let mock_seed = parsed::<u64>("MOCK_SEED")?;
        let mock_count = parsed::<usize>("MOCK_COUNT")?.unwrap_or(defaults.mock_count);

        match env {
            Env::Local => Ok(Self {
                env,
                bind_addr,
                db_url: optional("DATABASE_URL"),
                jwt_secret: optional("JWT_SECRET").unwrap_or(defaults.jwt_secret.clone()),
                auth_url: optional("AUTH_URL"),
                auth_api_key: optional("AUTH_API_KEY"),
                locales,
                default_locale,
                mock_seed,
                mock_count,
                ..defaults
            }),
            Env::Production => Ok(Self {
                env,
                bind_addr,
                db_url: Some(required("DATABASE_URL")?),
                jwt_secret: required("JWT_SECRET")?,
                auth_url: Some(required("AUTH_URL")?),
                auth_api_key: Some(required("AUTH_API_KEY")?),
                s3_endpoint: required("S3_ENDPOINT")?,
                s3_region: optional("S3_REGION").unwrap_or(defaults.s3_region.clone()),
                s3_key: required("S3_ACCESS_KEY")?,
                s3_secret: required("S3_SECRET_KEY")?,
                s3_bucket: optional("S3_BUCKET_NAME").unwrap_or(defaults.s3_bucket.clone()),
                locales,
                default_locale,
                mock_seed,
                mock_count,
            }),
        }
    }
}
