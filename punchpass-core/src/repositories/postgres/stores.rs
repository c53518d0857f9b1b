// File: punchpass-core/src/repositories/postgres/stores.rs

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use punchpass_common::error::Error;
use punchpass_common::models::Store;
use punchpass_common::traits::repository_traits::StoreRepository;

pub struct PostgresStoreRepository {
    pub pool: Pool<Postgres>,
}

impl PostgresStoreRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StoreRepository for PostgresStoreRepository {
    async fn get_store(&self, store_id: Uuid) -> Result<Option<Store>, Error> {
        let row_opt = sqlx::query(
            r#"
            SELECT store_id, name, timezone, created_at
            FROM stores
            WHERE store_id = $1
            "#,
        )
        .bind(store_id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(r) = row_opt {
            Ok(Some(Store {
                store_id: r.try_get("store_id")?,
                name: r.try_get("name")?,
                timezone: r.try_get("timezone")?,
                created_at: r.try_get("created_at")?,
            }))
        } else {
            Ok(None)
        }
    }
}
