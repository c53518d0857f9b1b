// File: punchpass-common/src/traits/repository_traits.rs

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::error::Error;
use crate::models::member::Member;
use crate::models::redemption::{Page, RedemptionEvent};
use crate::models::store::Store;
use crate::models::ticket::Ticket;

/// Ticket store: the only component allowed to mutate ticket rows.
#[async_trait]
pub trait TicketRepository: Send + Sync {
    /// Issuance seam called by the (external) purchase/grant flows.
    async fn create_ticket(&self, ticket: &Ticket) -> Result<(), Error>;

    async fn get_ticket(&self, ticket_id: Uuid) -> Result<Option<Ticket>, Error>;

    /// Newest first.
    async fn list_tickets_for_member(&self, member_id: Uuid) -> Result<Vec<Ticket>, Error>;

    /// Consume one use: decrement `remaining_uses` and stamp
    /// `last_redeemed_at = now` in a single conditional update. The
    /// guard (uses left, not expired, cooldown elapsed) is evaluated in
    /// the same atomic step; concurrent callers on one ticket serialize
    /// and `remaining_uses` can never go below zero.
    ///
    /// Returns the updated ticket, or `None` when the guard did not
    /// hold at commit time.
    async fn decrement_and_stamp(
        &self,
        ticket_id: Uuid,
        now: DateTime<Utc>,
        cooldown: Duration,
    ) -> Result<Option<Ticket>, Error>;
}

/// Append-only redemption history.
#[async_trait]
pub trait RedemptionLedgerRepository: Send + Sync {
    async fn append_event(&self, event: &RedemptionEvent) -> Result<(), Error>;

    /// Newest first. `page` is 1-based.
    async fn list_for_member(
        &self,
        member_id: Uuid,
        page: u32,
        per_page: u32,
    ) -> Result<Page<RedemptionEvent>, Error>;

    /// Events with `from <= redeemed_at < to`, newest first. Callers
    /// compute the window (e.g. the store-local calendar day).
    async fn list_for_store_between(
        &self,
        store_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<RedemptionEvent>, Error>;
}

/// Combined seam for the one operation that must touch both sides at
/// once: the ticket mutation and the ledger append commit together or
/// not at all.
#[async_trait]
pub trait RedemptionStore: TicketRepository + RedemptionLedgerRepository {
    /// `decrement_and_stamp` (with `now = event.redeemed_at`) plus
    /// `append_event` as one atomic unit. `None` means the eligibility
    /// guard failed and nothing was written.
    async fn redeem_one_use(
        &self,
        ticket_id: Uuid,
        event: &RedemptionEvent,
        cooldown: Duration,
    ) -> Result<Option<Ticket>, Error>;
}

/// Member lookup, read-only. Writes belong to the back-office CRUD.
#[async_trait]
pub trait MemberRepository: Send + Sync {
    async fn get_member(&self, member_id: Uuid) -> Result<Option<Member>, Error>;

    async fn find_member_by_card(&self, card_number: &str) -> Result<Option<Member>, Error>;
}

/// Store lookup, read-only.
#[async_trait]
pub trait StoreRepository: Send + Sync {
    async fn get_store(&self, store_id: Uuid) -> Result<Option<Store>, Error>;
}
