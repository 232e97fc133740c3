//! Typed errors for schema, persistence and configuration failures.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing setting: {0}")]
    Missing(&'static str),
    #[error("invalid setting {key}: {message}")]
    Invalid { key: &'static str, message: String },
    #[error("duplicate property: {0}")]
    DuplicateProperty(String),
    #[error("config load: {0}")]
    Load(String),
    #[error("validation: {0}")]
    Validation(String),
}

/// Failure reported by a storage adapter. Surfaced verbatim, never retried.
#[derive(Error, Debug)]
pub enum StorageError {
    #[cfg(feature = "mysql")]
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("execution: {0}")]
    Execution(String),
}

#[derive(Error, Debug)]
pub enum EntityError {
    #[error("cannot reload or delete entity: no primary or unique property declared")]
    MissingIdentity,
    #[error("cannot reload or delete entity: unique property '{0}' is null, several rows may match")]
    AmbiguousIdentity(String),
    #[error("adapter not configured: {0}")]
    AdapterNotConfigured(String),
    #[error("gateway already bound to this entity")]
    GatewayAlreadyBound,
    #[error("invalid schema: {0}")]
    InvalidSchema(String),
    #[error("unknown accessor: {0}")]
    UnknownAccessor(String),
    #[error("unknown property: {0}")]
    UnknownProperty(String),
    #[error("cannot read property '{property}' as {expected}: {message}")]
    Coercion {
        property: String,
        expected: &'static str,
        message: String,
    },
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),
    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
