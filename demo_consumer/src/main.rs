//! Demo consumer: declares a `users` entity and runs it through save, reload and delete.
//!
//! Expects a table like:
//! `CREATE TABLE users (id INT AUTO_INCREMENT PRIMARY KEY, email VARCHAR(191) UNIQUE,
//!  name VARCHAR(100), meta JSON, created_at DATETIME DEFAULT CURRENT_TIMESTAMP)`
//!
//! Run from repo root: `cargo run -p demo-consumer`

use entity_gateway::{Entity, EntityConfig, Field, MySqlAdapter, Record, RelationalGateway, Settings};
use serde_json::json;
use std::rc::Rc;

struct User {
    record: Record,
}

impl User {
    const ID: Field<i64> = Field::new("id");
    const EMAIL: Field<String> = Field::new("email");
    const NAME: Field<String> = Field::new("name");
}

impl Default for User {
    fn default() -> Self {
        User {
            record: Record::declare(|s| {
                s.property("id").int().primary().generated();
                s.property("email").string().unique();
                s.property("name").string().default("anonymous");
                s.property("meta").json();
                s.property("created_at").date().generated();
            }),
        }
    }
}

impl Entity for User {
    fn record(&self) -> &Record {
        &self.record
    }

    fn record_mut(&mut self) -> &mut Record {
        &mut self.record
    }

    fn before_save(&mut self) {
        tracing::info!(email = ?self.record.get(User::EMAIL).ok().flatten(), "saving user");
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("entity_gateway=debug,demo_consumer=info")),
        )
        .init();

    let settings = Settings::load()?;
    let adapter = MySqlAdapter::connect(&settings)?;
    let users = Rc::new(RelationalGateway::new(&settings.table_name("users"))?.with_adapter(adapter));

    let mut user = User::default();
    user.record().bind_gateway(users.clone())?;
    user.record_mut().set(User::EMAIL, "ada@example.com".to_string())?;
    user.record_mut().assign("meta", json!({"roles": ["admin"]}))?;
    user.save()?;
    tracing::info!(id = ?user.record().get(User::ID)?, "saved");

    user.reload()?;
    tracing::info!(user = %user.to_json(), "reloaded");

    let rows = users
        .select(&["*"])
        .map(|s| s.order_by("id", false).limit(10))
        .hydrate()?
        .with_gateway(users.clone());
    for found in rows.entities::<User>()? {
        let found = found?;
        tracing::info!(name = ?found.record().get(User::NAME)?, "listed");
    }

    // same table, schema from config, addressed by its unique key
    let config = EntityConfig::from_json(
        r#"{"table": "users", "properties": [
            {"name": "email", "type": "string", "unique": true},
            {"name": "name", "type": "string"}
        ]}"#,
    )?;
    let mut by_email = config.instantiate(&settings)?;
    by_email.record().bind_gateway(users.clone())?;
    by_email.record_mut().assign("email", "ada@example.com")?;
    tracing::info!(found = by_email.reload()?, name = ?by_email.record().value("name")?, "reloaded by email");

    let deleted = user.delete()?;
    tracing::info!(deleted, "deleted");
    Ok(())
}
