// File: punchpass-core/src/repositories/memory/stores.rs

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use punchpass_common::error::Error;
use punchpass_common::models::Store;
use punchpass_common::traits::repository_traits::StoreRepository;

#[derive(Default)]
pub struct MemoryStoreRepository {
    stores: DashMap<Uuid, Store>,
}

impl MemoryStoreRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, store: Store) {
        self.stores.insert(store.store_id, store);
    }
}

#[async_trait]
impl StoreRepository for MemoryStoreRepository {
    async fn get_store(&self, store_id: Uuid) -> Result<Option<Store>, Error> {
        Ok(self.stores.get(&store_id).map(|s| s.clone()))
    }
}
