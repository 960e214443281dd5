use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use tracing::instrument;

use crate::db::RepoError;
use crate::waters::repo_types::{Water, WaterFilter};

/// Persistence of water entries. Lookups by id do not check ownership;
/// callers scope them to the session user.
#[async_trait]
pub trait WaterRepo: Send + Sync {
    async fn create(&self, owner_id: i64, volume: i64, now: OffsetDateTime)
        -> Result<Water, RepoError>;
    /// Newest first.
    async fn list_by_owner(&self, owner_id: i64, filter: &WaterFilter)
        -> Result<Vec<Water>, RepoError>;
    async fn get_by_id(&self, id: i64) -> Result<Water, RepoError>;
    async fn update_volume(&self, id: i64, volume: i64, now: OffsetDateTime)
        -> Result<Water, RepoError>;
    /// Succeeds whether or not the row still exists.
    async fn delete_by_id(&self, id: i64) -> Result<(), RepoError>;
}

#[derive(Clone)]
pub struct PgWaterRepo {
    db: PgPool,
}

impl PgWaterRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl WaterRepo for PgWaterRepo {
    #[instrument(skip(self), name = "db.waters.create")]
    async fn create(
        &self,
        owner_id: i64,
        volume: i64,
        now: OffsetDateTime,
    ) -> Result<Water, RepoError> {
        let water = sqlx::query_as::<_, Water>(
            r#"
            INSERT INTO waters (user_id, volume, created_at, updated_at)
            VALUES ($1, $2, $3, $3)
            RETURNING id, user_id, volume, created_at, updated_at
            "#,
        )
        .bind(owner_id)
        .bind(volume)
        .bind(now)
        .fetch_one(&self.db)
        .await?;
        Ok(water)
    }

    #[instrument(skip(self), name = "db.waters.list_by_owner")]
    async fn list_by_owner(
        &self,
        owner_id: i64,
        filter: &WaterFilter,
    ) -> Result<Vec<Water>, RepoError> {
        // LIMIT NULL is LIMIT ALL in Postgres
        let rows = sqlx::query_as::<_, Water>(
            r#"
            SELECT id, user_id, volume, created_at, updated_at
            FROM waters
            WHERE user_id = $1
              AND ($2::timestamptz IS NULL OR created_at >= $2)
              AND ($3::timestamptz IS NULL OR created_at < $3)
            ORDER BY created_at DESC, id DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(owner_id)
        .bind(filter.from)
        .bind(filter.to)
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    #[instrument(skip(self), name = "db.waters.get_by_id")]
    async fn get_by_id(&self, id: i64) -> Result<Water, RepoError> {
        let water = sqlx::query_as::<_, Water>(
            r#"
            SELECT id, user_id, volume, created_at, updated_at
            FROM waters
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        water.ok_or(RepoError::NotFound)
    }

    #[instrument(skip(self), name = "db.waters.update_volume")]
    async fn update_volume(
        &self,
        id: i64,
        volume: i64,
        now: OffsetDateTime,
    ) -> Result<Water, RepoError> {
        let water = sqlx::query_as::<_, Water>(
            r#"
            UPDATE waters
            SET volume = $2, updated_at = $3
            WHERE id = $1
            RETURNING id, user_id, volume, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(volume)
        .bind(now)
        .fetch_optional(&self.db)
        .await?;
        water.ok_or(RepoError::NotFound)
    }

    #[instrument(skip(self), name = "db.waters.delete_by_id")]
    async fn delete_by_id(&self, id: i64) -> Result<(), RepoError> {
        sqlx::query("DELETE FROM waters WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod memory {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct Table {
        next_id: i64,
        rows: Vec<Water>,
    }

    /// In-process stand-in for the waters table.
    #[derive(Default)]
    pub(crate) struct InMemoryWaterRepo {
        table: Mutex<Table>,
    }

    fn in_range(filter: &WaterFilter, w: &Water) -> bool {
        filter.from.map_or(true, |from| w.created_at >= from)
            && filter.to.map_or(true, |to| w.created_at < to)
    }

    #[async_trait]
    impl WaterRepo for InMemoryWaterRepo {
        async fn create(
            &self,
            owner_id: i64,
            volume: i64,
            now: OffsetDateTime,
        ) -> Result<Water, RepoError> {
            let mut table = self.table.lock().unwrap();
            table.next_id += 1;
            let water = Water {
                id: table.next_id,
                owner_id,
                volume,
                created_at: now,
                updated_at: now,
            };
            table.rows.push(water.clone());
            Ok(water)
        }

        async fn list_by_owner(
            &self,
            owner_id: i64,
            filter: &WaterFilter,
        ) -> Result<Vec<Water>, RepoError> {
            let table = self.table.lock().unwrap();
            let mut rows: Vec<Water> = table
                .rows
                .iter()
                .filter(|w| w.owner_id == owner_id && in_range(filter, w))
                .cloned()
                .collect();
            rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
            let limit = filter.limit.map_or(usize::MAX, |l| l as usize);
            Ok(rows
                .into_iter()
                .skip(filter.offset as usize)
                .take(limit)
                .collect())
        }

        async fn get_by_id(&self, id: i64) -> Result<Water, RepoError> {
            let table = self.table.lock().unwrap();
            table
                .rows
                .iter()
                .find(|w| w.id == id)
                .cloned()
                .ok_or(RepoError::NotFound)
        }

        async fn update_volume(
            &self,
            id: i64,
            volume: i64,
            now: OffsetDateTime,
        ) -> Result<Water, RepoError> {
            let mut table = self.table.lock().unwrap();
            let water = table
                .rows
                .iter_mut()
                .find(|w| w.id == id)
                .ok_or(RepoError::NotFound)?;
            water.volume = volume;
            water.updated_at = now;
            Ok(water.clone())
        }

        async fn delete_by_id(&self, id: i64) -> Result<(), RepoError> {
            self.table.lock().unwrap().rows.retain(|w| w.id != id);
            Ok(())
        }
    }
}
