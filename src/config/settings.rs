//! Connection settings read from the environment.

use crate::error::ConfigError;

pub const DATABASE_URL: &str = "DATABASE_URL";
pub const MAX_CONNECTIONS: &str = "ENTITY_MAX_CONNECTIONS";
pub const TABLE_PREFIX: &str = "ENTITY_TABLE_PREFIX";

/// One connection per worker unless configured otherwise.
const DEFAULT_MAX_CONNECTIONS: u32 = 1;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub database_url: String,
    pub max_connections: u32,
    pub table_prefix: Option<String>,
}

impl Settings {
    pub fn new(database_url: impl Into<String>) -> Self {
        Settings {
            database_url: database_url.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            table_prefix: None,
        }
    }

    /// `.env` (if present) then the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
            Err(e) if e.not_found() => {}
            Err(e) => return Err(ConfigError::Load(e.to_string())),
        }
        Self::from_env()
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup(DATABASE_URL)
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::Missing(DATABASE_URL))?;

        let max_connections = match lookup(MAX_CONNECTIONS) {
            None => DEFAULT_MAX_CONNECTIONS,
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(0) => {
                    return Err(ConfigError::Invalid {
                        key: MAX_CONNECTIONS,
                        message: "must be at least 1".into(),
                    })
                }
                Ok(n) => n,
                Err(e) => {
                    return Err(ConfigError::Invalid {
                        key: MAX_CONNECTIONS,
                        message: format!("{}: {}", raw, e),
                    })
                }
            },
        };

        let table_prefix = lookup(TABLE_PREFIX).map(|s| s.trim().to_string()).filter(|s| !s.is_empty());

        Ok(Settings {
            database_url,
            max_connections,
            table_prefix,
        })
    }

    pub fn with_table_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.table_prefix = Some(prefix.into());
        self
    }

    /// Physical table name for a logical one.
    pub fn table_name(&self, table: &str) -> String {
        match &self.table_prefix {
            Some(prefix) => format!("{}{}", prefix, table),
            None => table.to_string(),
        }
    }
}
