use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::dao::Dao;
use crate::entity::{Entity, ListFilter, Page, PageRequest};
use crate::error::StoreError;
use crate::lock::AdvisoryLocks;
use crate::session::Tx;

fn internal(e: sqlx::Error) -> StoreError {
    StoreError::Internal(e.to_string())
}

/// JSONB-backed [`Dao`] for one entity kind, generic over any [`Entity`].
///
/// Schema is assumed to already exist (no migration runner — see Non-goals);
/// each table is expected to have the shape:
/// ```sql
/// CREATE TABLE <table> (
///     id         UUID PRIMARY KEY,
///     scope_id   UUID NOT NULL,
///     deleted_at TIMESTAMPTZ,
///     data       JSONB NOT NULL,
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
/// mirroring the JSONB-blob-per-row pattern used for `enclaves`/`audit_events`
/// in the reference this crate is grounded on. `table` is a fixed identifier
/// supplied at construction time by this crate's own code, never user input.
pub struct PostgresDao<E: Entity> {
    pool: PgPool,
    table: &'static str,
    _marker: std::marker::PhantomData<E>,
}

impl<E: Entity> PostgresDao<E> {
    pub fn new(pool: PgPool, table: &'static str) -> Self {
        Self { pool, table, _marker: std::marker::PhantomData }
    }
}

#[async_trait]
impl<E: Entity> Dao<E> for PostgresDao<E> {
    async fn create(&self, entity: &E) -> Result<(), StoreError> {
        let data = serde_json::to_value(entity)?;
        let query = format!(
            "INSERT INTO {} (id, scope_id, deleted_at, data, updated_at) VALUES ($1, $2, $3, $4::jsonb, NOW())",
            self.table
        );
        sqlx::query(&query)
            .bind(entity.id())
            .bind(entity.scope_id())
            .bind(entity.deleted_at())
            .bind(&data)
            .execute(&self.pool)
            .await
            .map_err(internal)?;
        Ok(())
    }

    async fn update(&self, entity: &E) -> Result<(), StoreError> {
        let data = serde_json::to_value(entity)?;
        let query = format!(
            "UPDATE {} SET scope_id = $2, deleted_at = $3, data = $4::jsonb, updated_at = NOW() WHERE id = $1",
            self.table
        );
        let result = sqlx::query(&query)
            .bind(entity.id())
            .bind(entity.scope_id())
            .bind(entity.deleted_at())
            .bind(&data)
            .execute(&self.pool)
            .await
            .map_err(internal)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { entity: E::entity_name(), id: entity.id().to_string() });
        }
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid, lock_for_update: bool) -> Result<Option<E>, StoreError> {
        let query = if lock_for_update {
            format!("SELECT data FROM {} WHERE id = $1 FOR UPDATE", self.table)
        } else {
            format!("SELECT data FROM {} WHERE id = $1", self.table)
        };
        let row: Option<(serde_json::Value,)> =
            sqlx::query_as(&query).bind(id).fetch_optional(&self.pool).await.map_err(internal)?;
        row.map(|(v,)| serde_json::from_value(v).map_err(StoreError::Serialization)).transpose()
    }

    async fn get_all(&self, filter: ListFilter, page: PageRequest) -> Result<Page<E>, StoreError> {
        let unpaged = page.page_size == 0;
        let limit = if unpaged { cloudcore_domain::constants::TOTAL_LIMIT + 1 } else { page.page_size as i64 };
        let after: Option<Uuid> = page
            .page_token
            .as_deref()
            .map(|t| t.parse())
            .transpose()
            .map_err(|_| StoreError::Internal("invalid page token".to_string()))?;

        let query = format!(
            "SELECT id, data FROM {table}
             WHERE ($1::uuid IS NULL OR scope_id = $1)
               AND ($2::bool OR deleted_at IS NULL)
               AND ($3::uuid IS NULL OR id > $3)
             ORDER BY id
             LIMIT $4",
            table = self.table
        );
        let rows: Vec<(Uuid, serde_json::Value)> = sqlx::query_as(&query)
            .bind(filter.scope_id)
            .bind(filter.include_deleted)
            .bind(after)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(internal)?;

        if unpaged && rows.len() as i64 > cloudcore_domain::constants::TOTAL_LIMIT {
            return Err(StoreError::Transient(format!(
                "{} unpaged listing exceeds TotalLimit ({}); paginate the caller",
                E::entity_name(),
                cloudcore_domain::constants::TOTAL_LIMIT
            )));
        }

        let next_page_token = if page.page_size != 0 && rows.len() as u32 == page.page_size {
            rows.last().map(|(id, _)| id.to_string())
        } else {
            None
        };
        let items = rows
            .into_iter()
            .map(|(_, v)| serde_json::from_value(v).map_err(StoreError::Serialization))
            .collect::<Result<Vec<E>, _>>()?;

        Ok(Page { items, next_page_token })
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<(), StoreError> {
        let query = format!("UPDATE {} SET deleted_at = NOW() WHERE id = $1", self.table);
        let result = sqlx::query(&query).bind(id).execute(&self.pool).await.map_err(internal)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { entity: E::entity_name(), id: id.to_string() });
        }
        Ok(())
    }

    async fn get_by_id_in_tx(&self, tx: &mut Tx, id: Uuid) -> Result<Option<E>, StoreError> {
        let Tx::Postgres(pg_tx) = tx else {
            return Err(StoreError::Internal("postgres dao used with a non-postgres transaction".to_string()));
        };
        let query = format!("SELECT data FROM {} WHERE id = $1 FOR UPDATE", self.table);
        let row: Option<(serde_json::Value,)> =
            sqlx::query_as(&query).bind(id).fetch_optional(&mut *pg_tx).await.map_err(internal)?;
        row.map(|(v,)| serde_json::from_value(v).map_err(StoreError::Serialization)).transpose()
    }

    async fn update_in_tx(&self, tx: &mut Tx, entity: &E) -> Result<(), StoreError> {
        let Tx::Postgres(pg_tx) = tx else {
            return Err(StoreError::Internal("postgres dao used with a non-postgres transaction".to_string()));
        };
        let data = serde_json::to_value(entity)?;
        let query = format!(
            "UPDATE {} SET scope_id = $2, deleted_at = $3, data = $4::jsonb, updated_at = NOW() WHERE id = $1",
            self.table
        );
        let result = sqlx::query(&query)
            .bind(entity.id())
            .bind(entity.scope_id())
            .bind(entity.deleted_at())
            .bind(&data)
            .execute(&mut *pg_tx)
            .await
            .map_err(internal)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { entity: E::entity_name(), id: entity.id().to_string() });
        }
        Ok(())
    }
}

/// Postgres-backed advisory lock using `pg_advisory_xact_lock(hashtext($1))` —
/// held for the lifetime of a single transaction wrapping `work` (§4.1, §9).
pub struct PostgresAdvisoryLocks {
    pool: PgPool,
}

impl PostgresAdvisoryLocks {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AdvisoryLocks for PostgresAdvisoryLocks {
    async fn with_lock<'a>(
        &'a self,
        key: Uuid,
        work: std::pin::Pin<Box<dyn std::future::Future<Output = Result<(), StoreError>> + Send + 'a>>,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(internal)?;
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(key.to_string())
            .execute(&mut *tx)
            .await
            .map_err(internal)?;

        let result = work.await;

        match result {
            Ok(()) => tx.commit().await.map_err(internal)?,
            Err(_) => tx.rollback().await.map_err(internal)?,
        }
        result
    }
}
