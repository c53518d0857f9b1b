// tests/helpers (shared test fixtures)

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

use punchpass_common::models::{Member, Store, Ticket};
use punchpass_core::repositories::memory::{
    MemoryMemberRepository, MemoryRedemptionStore, MemoryStoreRepository,
};
use punchpass_core::services::RedemptionService;

pub struct TestWorld {
    pub service: Arc<RedemptionService>,
    pub store: Arc<MemoryRedemptionStore>,
    pub member_id: Uuid,
    pub store_id: Uuid,
}

/// Fixed "now" so cooldown math in tests is exact.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 10, 15, 0, 0).unwrap()
}

pub fn build_world(cooldown: Duration) -> TestWorld {
    let store = Arc::new(MemoryRedemptionStore::new());
    let members = Arc::new(MemoryMemberRepository::new());
    let stores = Arc::new(MemoryStoreRepository::new());

    let member_id = Uuid::new_v4();
    members.insert(Member {
        member_id,
        display_name: "Avery Quinn".to_string(),
        card_number: Some("M-1001".to_string()),
        phone: None,
        is_active: true,
        created_at: t0() - Duration::days(90),
    });

    let store_id = Uuid::new_v4();
    stores.insert(Store {
        store_id,
        name: "Downtown".to_string(),
        timezone: "America/Chicago".to_string(),
        created_at: t0() - Duration::days(365),
    });

    let service = Arc::new(RedemptionService::new(
        store.clone(),
        members,
        stores,
        cooldown,
    ));

    TestWorld {
        service,
        store,
        member_id,
        store_id,
    }
}

pub async fn grant(world: &TestWorld, total_uses: i32, expires_in: Duration) -> Ticket {
    world
        .service
        .grant_ticket(
            world.member_id,
            "10-visit pass",
            total_uses,
            t0() + expires_in,
            t0(),
        )
        .await
        .expect("grant should succeed")
}
