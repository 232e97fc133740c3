//! Entity gateway: declared-schema entities persisted through a table gateway
//! (MySQL upsert, identity-addressed reload and delete) and lazy row hydration.

pub mod case;
pub mod config;
pub mod entity;
pub mod error;
pub mod gateway;
pub mod hydrator;
#[cfg(feature = "mysql")]
pub mod mysql;
pub mod property;
pub mod sql;

pub use config::{EntityConfig, PropertyConfig, Settings};
pub use entity::{DynamicEntity, Entity, IdentityClause, IdentitySource, Record, Schema};
pub use error::{ConfigError, EntityError, StorageError};
pub use gateway::{Adapter, Bound, PersistenceGateway, RelationalGateway, Row, WritePayload};
pub use hydrator::RowHydrator;
#[cfg(feature = "mysql")]
pub use mysql::MySqlAdapter;
pub use property::{Field, PropertyDescriptor, PropertyKind, PropertyType, TypedValue};
pub use sql::QueryBuf;
