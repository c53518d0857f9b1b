// File: punchpass-core/src/repositories/memory/redemptions.rs

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use parking_lot::RwLock;
use uuid::Uuid;

use punchpass_common::error::Error;
use punchpass_common::models::{Page, RedemptionEvent, Ticket};
use punchpass_common::traits::repository_traits::{
    RedemptionLedgerRepository, RedemptionStore, TicketRepository,
};

#[derive(Default)]
pub struct MemoryRedemptionStore {
    tickets: DashMap<Uuid, Ticket>,
    events: RwLock<Vec<RedemptionEvent>>,
}

impl MemoryRedemptionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn eligible(ticket: &Ticket, now: DateTime<Utc>, cooldown: Duration) -> bool {
    ticket.remaining_uses > 0
        && now < ticket.expires_at
        && ticket.last_redeemed_at.is_none_or(|last| now - last >= cooldown)
}

// Mutations run while holding the DashMap entry guard, so concurrent
// callers targeting one ticket serialize exactly like the Postgres
// row-level update. Lock order is always ticket entry, then events.
fn consume(ticket: &mut Ticket, now: DateTime<Utc>) -> Ticket {
    ticket.remaining_uses -= 1;
    ticket.last_redeemed_at = Some(now);
    ticket.clone()
}

#[async_trait]
impl TicketRepository for MemoryRedemptionStore {
    async fn create_ticket(&self, ticket: &Ticket) -> Result<(), Error> {
        self.tickets.insert(ticket.ticket_id, ticket.clone());
        Ok(())
    }

    async fn get_ticket(&self, ticket_id: Uuid) -> Result<Option<Ticket>, Error> {
        Ok(self.tickets.get(&ticket_id).map(|t| t.clone()))
    }

    async fn list_tickets_for_member(&self, member_id: Uuid) -> Result<Vec<Ticket>, Error> {
        let mut list: Vec<Ticket> = self
            .tickets
            .iter()
            .filter(|t| t.member_id == member_id)
            .map(|t| t.clone())
            .collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(list)
    }

    async fn decrement_and_stamp(
        &self,
        ticket_id: Uuid,
        now: DateTime<Utc>,
        cooldown: Duration,
    ) -> Result<Option<Ticket>, Error> {
        let Some(mut entry) = self.tickets.get_mut(&ticket_id) else {
            return Ok(None);
        };
        let ticket = entry.value_mut();
        if !eligible(ticket, now, cooldown) {
            return Ok(None);
        }
        Ok(Some(consume(ticket, now)))
    }
}

#[async_trait]
impl RedemptionLedgerRepository for MemoryRedemptionStore {
    async fn append_event(&self, event: &RedemptionEvent) -> Result<(), Error> {
        self.events.write().push(event.clone());
        Ok(())
    }

    async fn list_for_member(
        &self,
        member_id: Uuid,
        page: u32,
        per_page: u32,
    ) -> Result<Page<RedemptionEvent>, Error> {
        let mut items: Vec<RedemptionEvent> = self
            .events
            .read()
            .iter()
            .filter(|e| e.member_id == member_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| b.redeemed_at.cmp(&a.redeemed_at));

        let total = items.len() as i64;
        let offset = (page.saturating_sub(1) as usize).saturating_mul(per_page as usize);
        let items = items
            .into_iter()
            .skip(offset)
            .take(per_page as usize)
            .collect();
        Ok(Page {
            items,
            page,
            per_page,
            total,
        })
    }

    async fn list_for_store_between(
        &self,
        store_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<RedemptionEvent>, Error> {
        let mut items: Vec<RedemptionEvent> = self
            .events
            .read()
            .iter()
            .filter(|e| e.store_id == store_id && e.redeemed_at >= from && e.redeemed_at < to)
            .cloned()
            .collect();
        items.sort_by(|a, b| b.redeemed_at.cmp(&a.redeemed_at));
        Ok(items)
    }
}

#[async_trait]
impl RedemptionStore for MemoryRedemptionStore {
    async fn redeem_one_use(
        &self,
        ticket_id: Uuid,
        event: &RedemptionEvent,
        cooldown: Duration,
    ) -> Result<Option<Ticket>, Error> {
        let now = event.redeemed_at;
        let Some(mut entry) = self.tickets.get_mut(&ticket_id) else {
            return Ok(None);
        };
        let ticket = entry.value_mut();
        if !eligible(ticket, now, cooldown) {
            return Ok(None);
        }
        let updated = consume(ticket, now);
        // still under the ticket entry guard: the decrement and the
        // ledger row land together or not at all
        self.events.write().push(event.clone());
        Ok(Some(updated))
    }
}
