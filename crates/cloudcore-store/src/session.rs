use async_trait::async_trait;

use crate::error::StoreError;

/// A transaction handle from [`Session::begin_tx`] (§4.1: "An enclosing
/// Session supplies `BeginTx(opts) → Tx`"). Two backends exist, so this is a
/// concrete enum rather than a trait object, mirroring the `Dao` split.
/// Dropped without [`Tx::commit`], the Postgres arm rolls back and releases
/// any row lock it was holding; the in-memory arm is just a marker.
pub enum Tx {
    Postgres(sqlx::Transaction<'static, sqlx::Postgres>),
    InMemory,
}

impl Tx {
    pub async fn commit(self) -> Result<(), StoreError> {
        match self {
            Tx::Postgres(tx) => tx.commit().await.map_err(|e| StoreError::Internal(e.to_string())),
            Tx::InMemory => Ok(()),
        }
    }
}

/// Opens transactions against the backing store. Call [`Dao::get_by_id_in_tx`]
/// with the returned `Tx` to reload a row under a lock that is held until the
/// `Tx` is committed (§4.2 step 6 stale guard).
///
/// [`Dao::get_by_id_in_tx`]: crate::dao::Dao::get_by_id_in_tx
#[async_trait]
pub trait Session: Send + Sync {
    async fn begin_tx(&self) -> Result<Tx, StoreError>;
}

/// In-memory backend: every `Dao` call already serializes behind its own
/// `RwLock`, so there is nothing to open a connection for — `Tx::InMemory`
/// is a no-op marker threaded through purely to keep the call shape uniform
/// with Postgres.
#[derive(Debug, Default)]
pub struct InMemorySession;

impl InMemorySession {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Session for InMemorySession {
    async fn begin_tx(&self) -> Result<Tx, StoreError> {
        Ok(Tx::InMemory)
    }
}

/// Postgres backend: `begin_tx` opens a real `sqlx` transaction; the caller
/// reloads rows through it via `Dao::get_by_id_in_tx`/`update_in_tx` and
/// commits once it has decided the row was not stale.
pub struct PostgresSession {
    pool: sqlx::PgPool,
}

impl PostgresSession {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Session for PostgresSession {
    async fn begin_tx(&self) -> Result<Tx, StoreError> {
        let tx = self.pool.begin().await.map_err(|e| StoreError::Internal(e.to_string()))?;
        Ok(Tx::Postgres(tx))
    }
}
