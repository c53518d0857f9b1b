// tests/history_tests.rs

mod helpers;

use chrono::{Duration, TimeZone, Utc};
use uuid::Uuid;

use helpers::{build_world, grant, t0};
use punchpass_common::error::Error;
use punchpass_common::models::{Actor, RedemptionEvent};
use punchpass_common::traits::repository_traits::RedemptionLedgerRepository;

async fn redeem_at(
    world: &helpers::TestWorld,
    ticket_id: Uuid,
    at: chrono::DateTime<Utc>,
) -> RedemptionEvent {
    let actor = Actor::Member {
        member_id: world.member_id,
    };
    world
        .service
        .redeem(ticket_id, &actor, world.store_id, at)
        .await
        .expect("redemption should succeed")
        .event
}

#[tokio::test]
async fn member_history_pages_newest_first() -> Result<(), Error> {
    let world = build_world(Duration::zero());
    let ticket = grant(&world, 5, Duration::days(30)).await;

    let e1 = redeem_at(&world, ticket.ticket_id, t0()).await;
    let e2 = redeem_at(&world, ticket.ticket_id, t0() + Duration::minutes(10)).await;
    let e3 = redeem_at(&world, ticket.ticket_id, t0() + Duration::minutes(20)).await;

    let page1 = world.service.member_history(world.member_id, 1, 2).await?;
    assert_eq!(page1.total, 3);
    assert_eq!(page1.per_page, 2);
    assert_eq!(
        page1.items.iter().map(|e| e.event_id).collect::<Vec<_>>(),
        vec![e3.event_id, e2.event_id]
    );

    let page2 = world.service.member_history(world.member_id, 2, 2).await?;
    assert_eq!(page2.items.len(), 1);
    assert_eq!(page2.items[0].event_id, e1.event_id);

    let beyond = world.service.member_history(world.member_id, 3, 2).await?;
    assert!(beyond.items.is_empty());
    assert_eq!(beyond.total, 3);
    Ok(())
}

#[tokio::test]
async fn page_zero_is_treated_as_first_page() -> Result<(), Error> {
    let world = build_world(Duration::zero());
    let ticket = grant(&world, 2, Duration::days(30)).await;
    redeem_at(&world, ticket.ticket_id, t0()).await;

    let page = world.service.member_history(world.member_id, 0, 10).await?;
    assert_eq!(page.items.len(), 1);
    Ok(())
}

#[tokio::test]
async fn store_today_is_scoped_to_the_store_local_day() -> Result<(), Error> {
    // now = 2025-03-10 15:00 UTC = 10:00 CDT; the Chicago day runs
    // 05:00 UTC Mar 10 .. 05:00 UTC Mar 11
    let world = build_world(Duration::zero());
    let ticket = grant(&world, 5, Duration::days(30)).await;

    let yesterday_late = Utc.with_ymd_and_hms(2025, 3, 10, 4, 30, 0).unwrap();
    let today_early = Utc.with_ymd_and_hms(2025, 3, 10, 5, 30, 0).unwrap();

    redeem_at(&world, ticket.ticket_id, yesterday_late).await;
    let e_today_early = redeem_at(&world, ticket.ticket_id, today_early).await;
    let e_now = redeem_at(&world, ticket.ticket_id, t0()).await;

    let today = world.service.store_history_today(world.store_id, t0()).await?;
    assert_eq!(
        today.iter().map(|e| e.event_id).collect::<Vec<_>>(),
        vec![e_now.event_id, e_today_early.event_id]
    );
    Ok(())
}

#[tokio::test]
async fn store_today_ignores_other_stores() -> Result<(), Error> {
    let world = build_world(Duration::zero());
    let ticket = grant(&world, 5, Duration::days(30)).await;
    redeem_at(&world, ticket.ticket_id, t0()).await;

    // a foreign store's event in the same window
    let foreign_event = RedemptionEvent {
        event_id: Uuid::new_v4(),
        ticket_id: ticket.ticket_id,
        member_id: world.member_id,
        redeemed_by: Actor::Member {
            member_id: world.member_id,
        },
        store_id: Uuid::new_v4(),
        redeemed_at: t0(),
    };
    world.store.append_event(&foreign_event).await?;

    let today = world.service.store_history_today(world.store_id, t0()).await?;
    assert_eq!(today.len(), 1);
    assert_ne!(today[0].event_id, foreign_event.event_id);
    Ok(())
}

#[tokio::test]
async fn store_today_for_unknown_store_is_not_found() {
    let world = build_world(Duration::zero());
    let err = world
        .service
        .store_history_today(Uuid::new_v4(), t0())
        .await
        .expect_err("unknown store");
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn member_ticket_summary_groups_by_derived_status() -> Result<(), Error> {
    let world = build_world(Duration::zero());

    let fresh = grant(&world, 5, Duration::days(30)).await;
    let nearly_done = grant(&world, 2, Duration::days(30)).await;
    let expired = grant(&world, 4, Duration::days(1)).await;
    let exhausted = grant(&world, 1, Duration::days(30)).await;
    redeem_at(&world, exhausted.ticket_id, t0()).await;

    let later = t0() + Duration::days(2);
    let summary = world.service.list_member_tickets(world.member_id, later).await?;

    let active_ids: Vec<Uuid> = summary.active.iter().map(|t| t.ticket_id).collect();
    assert!(active_ids.contains(&fresh.ticket_id));
    assert!(active_ids.contains(&nearly_done.ticket_id));
    assert_eq!(summary.active.len(), 2);

    let inactive_ids: Vec<Uuid> = summary.inactive.iter().map(|t| t.ticket_id).collect();
    assert!(inactive_ids.contains(&expired.ticket_id));
    assert!(inactive_ids.contains(&exhausted.ticket_id));

    assert_eq!(summary.total_remaining_uses, 5 + 2);
    Ok(())
}
