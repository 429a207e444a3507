//! Schema management driven by the table mapping.

use crate::mapping::{quote, Mapping};
use crate::{DatabasePool, SessionFactory};
use flix_core::FlixResult;
use tracing::{debug, info};

/// Creates, empties and inspects the mapped tables.
#[derive(Debug, Clone)]
pub struct SchemaManager {
    sessions: SessionFactory,
    mapping: &'static Mapping,
}

impl SchemaManager {
    #[must_use]
    pub fn new(pool: &DatabasePool, mapping: &'static Mapping) -> Self {
        Self {
            sessions: SessionFactory::new(pool),
            mapping,
        }
    }

    /// Creates every mapped table that does not exist yet, in dependency order.
    pub async fn create_all(&self) -> FlixResult<()> {
        let mut session = self.sessions.begin();
        let conn = session.connection().await?;
        for statement in self.mapping.create_statements() {
            debug!("{}", statement);
            sqlx::query(&statement).execute(&mut *conn).await?;
        }
        session.commit().await?;

        info!("Created {} tables", self.mapping.tables.len());
        Ok(())
    }

    /// Deletes every row from every mapped table, in reverse dependency order.
    pub async fn delete_all(&self) -> FlixResult<()> {
        let mut session = self.sessions.begin();
        let conn = session.connection().await?;
        for name in self.mapping.table_names().collect::<Vec<_>>().into_iter().rev() {
            sqlx::query(&format!("DELETE FROM {}", quote(name)))
                .execute(&mut *conn)
                .await?;
        }
        session.commit().await?;

        info!("Deleted all catalogue rows");
        Ok(())
    }

    /// Names of the tables currently present in the database, sorted.
    pub async fn table_names(&self) -> FlixResult<Vec<String>> {
        let mut session = self.sessions.begin();
        let names: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(session.connection().await?)
        .await?;
        session.rollback().await?;

        Ok(names.into_iter().map(|(name,)| name).collect())
    }

    /// Returns true if no table of the mapping exists yet.
    pub async fn is_empty(&self) -> FlixResult<bool> {
        let existing = self.table_names().await?;
        Ok(!self
            .mapping
            .table_names()
            .any(|name| existing.iter().any(|e| e == name)))
    }
}
