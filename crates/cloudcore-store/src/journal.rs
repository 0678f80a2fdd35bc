use async_trait::async_trait;
use cloudcore_domain::entities::StatusDetail;
use uuid::Uuid;

use crate::error::StoreError;

/// Append-only status-detail journal (§C2). A row is appended iff status
/// changed or the latest message differs from the current one (§4.2 step 6/7).
#[async_trait]
pub trait StatusJournal: Send + Sync + 'static {
    async fn append(&self, detail: &StatusDetail) -> Result<(), StoreError>;

    async fn latest(&self, entity_id: Uuid) -> Result<Option<StatusDetail>, StoreError>;

    async fn latest_n(&self, entity_id: Uuid, n: u32) -> Result<Vec<StatusDetail>, StoreError>;
}

pub mod memory {
    use std::collections::HashMap;
    use std::sync::Arc;

    use async_trait::async_trait;
    use cloudcore_domain::entities::StatusDetail;
    use tokio::sync::RwLock;
    use uuid::Uuid;

    use super::StatusJournal;
    use crate::error::StoreError;

    #[derive(Debug, Default)]
    pub struct InMemoryStatusJournal {
        rows: RwLock<HashMap<Uuid, Vec<StatusDetail>>>,
    }

    impl InMemoryStatusJournal {
        pub fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }
    }

    #[async_trait]
    impl StatusJournal for InMemoryStatusJournal {
        async fn append(&self, detail: &StatusDetail) -> Result<(), StoreError> {
            let mut guard = self.rows.write().await;
            guard.entry(detail.entity_id).or_default().push(detail.clone());
            Ok(())
        }

        async fn latest(&self, entity_id: Uuid) -> Result<Option<StatusDetail>, StoreError> {
            let guard = self.rows.read().await;
            Ok(guard.get(&entity_id).and_then(|rows| rows.last().cloned()))
        }

        async fn latest_n(&self, entity_id: Uuid, n: u32) -> Result<Vec<StatusDetail>, StoreError> {
            let guard = self.rows.read().await;
            let Some(rows) = guard.get(&entity_id) else {
                return Ok(Vec::new());
            };
            let start = rows.len().saturating_sub(n as usize);
            Ok(rows[start..].to_vec())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn latest_reflects_the_most_recent_append() {
            let journal = InMemoryStatusJournal::new();
            let entity_id = Uuid::new_v4();
            journal
                .append(&StatusDetail::new(entity_id, "provisioning", None))
                .await
                .unwrap();
            journal
                .append(&StatusDetail::new(entity_id, "ready", Some("ready for use".to_string())))
                .await
                .unwrap();

            let latest = journal.latest(entity_id).await.unwrap().unwrap();
            assert_eq!(latest.status, "ready");
        }

        #[tokio::test]
        async fn latest_n_returns_most_recent_in_order() {
            let journal = InMemoryStatusJournal::new();
            let entity_id = Uuid::new_v4();
            for status in ["pending", "provisioning", "ready"] {
                journal.append(&StatusDetail::new(entity_id, status, None)).await.unwrap();
            }

            let last_two = journal.latest_n(entity_id, 2).await.unwrap();
            assert_eq!(last_two.len(), 2);
            assert_eq!(last_two[0].status, "provisioning");
            assert_eq!(last_two[1].status, "ready");
        }
    }
}

pub mod postgres {
    use async_trait::async_trait;
    use cloudcore_domain::entities::StatusDetail;
    use sqlx::PgPool;
    use uuid::Uuid;

    use super::StatusJournal;
    use crate::error::StoreError;

    fn internal(e: sqlx::Error) -> StoreError {
        StoreError::Internal(e.to_string())
    }

    /// Schema assumed to exist:
    /// ```sql
    /// CREATE TABLE status_details (
    ///     id        UUID PRIMARY KEY,
    ///     entity_id UUID NOT NULL,
    ///     status    TEXT NOT NULL,
    ///     message   TEXT,
    ///     created   TIMESTAMPTZ NOT NULL
    /// );
    /// CREATE INDEX ON status_details (entity_id, created DESC);
    /// ```
    pub struct PostgresStatusJournal {
        pool: PgPool,
    }

    impl PostgresStatusJournal {
        pub fn new(pool: PgPool) -> Self {
            Self { pool }
        }
    }

    #[async_trait]
    impl StatusJournal for PostgresStatusJournal {
        async fn append(&self, detail: &StatusDetail) -> Result<(), StoreError> {
            sqlx::query(
                "INSERT INTO status_details (id, entity_id, status, message, created) VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(detail.id)
            .bind(detail.entity_id)
            .bind(&detail.status)
            .bind(&detail.message)
            .bind(detail.created)
            .execute(&self.pool)
            .await
            .map_err(internal)?;
            Ok(())
        }

        async fn latest(&self, entity_id: Uuid) -> Result<Option<StatusDetail>, StoreError> {
            sqlx::query_as::<_, StatusDetailRow>(
                "SELECT id, entity_id, status, message, created FROM status_details
                 WHERE entity_id = $1 ORDER BY created DESC LIMIT 1",
            )
            .bind(entity_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(internal)
            .map(|row| row.map(Into::into))
        }

        async fn latest_n(&self, entity_id: Uuid, n: u32) -> Result<Vec<StatusDetail>, StoreError> {
            let mut rows: Vec<StatusDetailRow> = sqlx::query_as(
                "SELECT id, entity_id, status, message, created FROM status_details
                 WHERE entity_id = $1 ORDER BY created DESC LIMIT $2",
            )
            .bind(entity_id)
            .bind(n as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(internal)?;
            rows.reverse();
            Ok(rows.into_iter().map(Into::into).collect())
        }
    }

    #[derive(sqlx::FromRow)]
    struct StatusDetailRow {
        id: Uuid,
        entity_id: Uuid,
        status: String,
        message: Option<String>,
        created: chrono::DateTime<chrono::Utc>,
    }

    impl From<StatusDetailRow> for StatusDetail {
        fn from(row: StatusDetailRow) -> Self {
            StatusDetail { id: row.id, entity_id: row.entity_id, status: row.status, message: row.message, created: row.created }
        }
    }
}
