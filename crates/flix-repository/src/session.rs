//! Unit-of-work sessions over the SQLite pool.
//!
//! A [`Session`] owns at most one transaction. The transaction begins on the
//! first call to [`Session::connection`], is made durable only by
//! [`Session::commit`], and is rolled back when the session is dropped
//! without a commit. Sessions are never shared: every repository operation
//! asks the [`SessionFactory`] for its own.

use crate::DatabasePool;
use flix_core::FlixResult;
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use tracing::debug;
use uuid::Uuid;

/// Hands out sessions bound to one pool.
#[derive(Clone, Debug)]
pub struct SessionFactory {
    pool: SqlitePool,
}

impl SessionFactory {
    /// Creates a factory over an existing pool.
    #[must_use]
    pub fn new(pool: &DatabasePool) -> Self {
        Self {
            pool: pool.inner().clone(),
        }
    }

    /// Opens a new session. No connection is acquired until it is used.
    #[must_use]
    pub fn begin(&self) -> Session {
        let session = Session {
            id: Uuid::new_v4(),
            pool: self.pool.clone(),
            tx: None,
        };
        debug!(session = %session.id, "Session opened");
        session
    }
}

/// A request-scoped unit of work.
pub struct Session {
    id: Uuid,
    pool: SqlitePool,
    tx: Option<Transaction<'static, Sqlite>>,
}

impl Session {
    /// Returns the session identifier used in log events.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Returns true once a transaction has been started.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.tx.is_some()
    }

    /// Returns the transactional connection, beginning the transaction if needed.
    pub async fn connection(&mut self) -> FlixResult<&mut SqliteConnection> {
        let tx = match self.tx.take() {
            Some(tx) => tx,
            None => {
                debug!(session = %self.id, "Beginning transaction");
                self.pool.begin().await?
            }
        };
        Ok(&mut **self.tx.insert(tx))
    }

    /// Commits the transaction, if one was started.
    pub async fn commit(mut self) -> FlixResult<()> {
        if let Some(tx) = self.tx.take() {
            tx.commit().await?;
            debug!(session = %self.id, "Session committed");
        }
        Ok(())
    }

    /// Rolls back the transaction, if one was started.
    pub async fn rollback(mut self) -> FlixResult<()> {
        if let Some(tx) = self.tx.take() {
            tx.rollback().await?;
            debug!(session = %self.id, "Session rolled back");
        }
        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.tx.is_some() {
            debug!(session = %self.id, "Session dropped without commit; rolling back");
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flix_config::DatabaseConfig;

    async fn factory() -> SessionFactory {
        let pool = DatabasePool::new(&DatabaseConfig::in_memory()).await.unwrap();
        sqlx::query("CREATE TABLE scratch (id INTEGER PRIMARY KEY)")
            .execute(pool.inner())
            .await
            .unwrap();
        SessionFactory::new(&pool)
    }

    async fn count(factory: &SessionFactory) -> i64 {
        let mut session = factory.begin();
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM scratch")
            .fetch_one(session.connection().await.unwrap())
            .await
            .unwrap();
        session.rollback().await.unwrap();
        count
    }

    #[tokio::test]
    async fn test_transaction_starts_lazily() {
        let factory = factory().await;
        let mut session = factory.begin();
        assert!(!session.is_active());

        session.connection().await.unwrap();
        assert!(session.is_active());
        session.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_commit_persists_rows() {
        let factory = factory().await;
        let mut session = factory.begin();
        sqlx::query("INSERT INTO scratch (id) VALUES (1)")
            .execute(session.connection().await.unwrap())
            .await
            .unwrap();
        session.commit().await.unwrap();

        assert_eq!(count(&factory).await, 1);
    }

    #[tokio::test]
    async fn test_drop_without_commit_rolls_back() {
        let factory = factory().await;
        {
            let mut session = factory.begin();
            sqlx::query("INSERT INTO scratch (id) VALUES (1)")
                .execute(session.connection().await.unwrap())
                .await
                .unwrap();
        }

        assert_eq!(count(&factory).await, 0);
    }

    #[tokio::test]
    async fn test_sessions_have_distinct_ids() {
        let factory = factory().await;
        assert_ne!(factory.begin().id(), factory.begin().id());
    }
}
