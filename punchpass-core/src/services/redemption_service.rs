// File: punchpass-core/src/services/redemption_service.rs

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error as ThisError;
use tracing::{debug, info, warn};
use uuid::Uuid;

use punchpass_common::error::Error;
use punchpass_common::models::{
    Actor, Eligibility, MemberTicketSummary, Page, RedemptionEvent, Ticket, TicketStatus,
};
use punchpass_common::traits::repository_traits::{
    MemberRepository, RedemptionLedgerRepository, RedemptionStore, StoreRepository,
    TicketRepository,
};

use crate::utils::time::local_day_bounds;

/// How often a lost conditional-update race is retried before giving
/// up. Every miss means another writer committed, so a fresh read
/// normally classifies the failure on the next pass.
const REDEEM_ATTEMPTS: usize = 3;

pub const MAX_PAGE_SIZE: u32 = 100;

/// Typed redemption failures. The API layer translates these; it never
/// invents reasons of its own.
#[derive(Debug, ThisError)]
pub enum RedeemError {
    /// Unknown ticket, or a member asking about someone else's ticket.
    #[error("ticket not found")]
    NotFound,

    /// Terminal: past `expires_at`, can never be redeemed again.
    #[error("ticket has expired")]
    Expired,

    /// Terminal: no uses remain.
    #[error("no uses remaining on this ticket")]
    Exhausted,

    /// Transient: retryable once the reported window elapses.
    #[error("ticket is cooling down; {remaining_seconds}s remaining")]
    Cooldown { remaining_seconds: i64 },

    /// Underlying storage fault, passed through unchanged. Safe to
    /// retry: the atomic step guarantees no partial commit.
    #[error(transparent)]
    Storage(#[from] Error),
}

/// Updated ticket snapshot plus the history row written for it.
#[derive(Debug, Clone)]
pub struct RedemptionReceipt {
    pub ticket: Ticket,
    pub event: RedemptionEvent,
}

/// The redemption engine: decides whether a redemption may proceed and,
/// if so, performs it exactly once.
pub struct RedemptionService {
    store: Arc<dyn RedemptionStore>,
    members: Arc<dyn MemberRepository>,
    stores: Arc<dyn StoreRepository>,
    cooldown: Duration,
}

impl RedemptionService {
    pub fn new(
        store: Arc<dyn RedemptionStore>,
        members: Arc<dyn MemberRepository>,
        stores: Arc<dyn StoreRepository>,
        cooldown: Duration,
    ) -> Self {
        Self {
            store,
            members,
            stores,
            cooldown,
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Side-effect-free eligibility check, used to decide whether to
    /// show a redemption control before committing to the
    /// transactional call.
    pub async fn prepare_redeem(
        &self,
        ticket_id: Uuid,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<Eligibility, RedeemError> {
        let ticket = self.load_owned(ticket_id, actor).await?;
        Ok(ticket.eligibility(now, self.cooldown))
    }

    /// Redeem one use of a ticket on behalf of `actor` at `store_id`.
    ///
    /// The eligibility predicate and the decrement are one atomic
    /// storage operation, so for N concurrent calls against a ticket
    /// with a single remaining use exactly one succeeds; the others
    /// come back as `Exhausted` or `Cooldown` after a fresh read.
    pub async fn redeem(
        &self,
        ticket_id: Uuid,
        actor: &Actor,
        store_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<RedemptionReceipt, RedeemError> {
        for attempt in 0..REDEEM_ATTEMPTS {
            let ticket = self.load_owned(ticket_id, actor).await?;
            match ticket.eligibility(now, self.cooldown) {
                Eligibility::Expired => return Err(RedeemError::Expired),
                Eligibility::Used => return Err(RedeemError::Exhausted),
                Eligibility::Cooldown { remaining_seconds } => {
                    return Err(RedeemError::Cooldown { remaining_seconds });
                }
                Eligibility::Redeemable => {}
            }

            let event = RedemptionEvent {
                event_id: Uuid::new_v4(),
                ticket_id,
                member_id: ticket.member_id,
                redeemed_by: *actor,
                store_id,
                redeemed_at: now,
            };

            match self.store.redeem_one_use(ticket_id, &event, self.cooldown).await? {
                Some(updated) => {
                    info!(
                        ticket_id = %ticket_id,
                        actor = actor.kind(),
                        remaining = updated.remaining_uses,
                        "redeemed one use"
                    );
                    return Ok(RedemptionReceipt {
                        ticket: updated,
                        event,
                    });
                }
                None => {
                    debug!(ticket_id = %ticket_id, attempt, "conditional redeem missed; re-reading");
                }
            }
        }

        warn!(ticket_id = %ticket_id, "ticket kept changing under the redeem guard");
        Err(RedeemError::Storage(Error::Contention(format!(
            "ticket {ticket_id} is busy, try again"
        ))))
    }

    /// Issuance seam for the (external) purchase/grant flows.
    pub async fn grant_ticket(
        &self,
        member_id: Uuid,
        ticket_type: &str,
        total_uses: i32,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Ticket, Error> {
        if total_uses <= 0 {
            return Err(Error::Validation(format!(
                "total_uses must be positive, got {total_uses}"
            )));
        }
        if expires_at <= now {
            return Err(Error::Validation("expires_at must be in the future".to_string()));
        }
        let member = self
            .members
            .get_member(member_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("member {member_id}")))?;
        if !member.is_active {
            return Err(Error::Validation(format!("member {member_id} is inactive")));
        }

        let ticket = Ticket {
            ticket_id: Uuid::new_v4(),
            member_id,
            ticket_type: ticket_type.to_string(),
            total_uses,
            remaining_uses: total_uses,
            expires_at,
            last_redeemed_at: None,
            created_at: now,
        };
        self.store.create_ticket(&ticket).await?;
        info!(
            ticket_id = %ticket.ticket_id,
            member_id = %member_id,
            ticket_type,
            total_uses,
            "granted ticket"
        );
        Ok(ticket)
    }

    /// Portal view: tickets grouped active/inactive plus the total uses
    /// still available across the active group.
    pub async fn list_member_tickets(
        &self,
        member_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<MemberTicketSummary, Error> {
        let tickets = self.store.list_tickets_for_member(member_id).await?;
        let mut summary = MemberTicketSummary {
            active: Vec::new(),
            inactive: Vec::new(),
            total_remaining_uses: 0,
        };
        for ticket in tickets {
            match ticket.status(now) {
                TicketStatus::Active => {
                    summary.total_remaining_uses += i64::from(ticket.remaining_uses);
                    summary.active.push(ticket);
                }
                TicketStatus::Used | TicketStatus::Expired => summary.inactive.push(ticket),
            }
        }
        Ok(summary)
    }

    /// Paged redemption history for a member, newest first.
    pub async fn member_history(
        &self,
        member_id: Uuid,
        page: u32,
        per_page: u32,
    ) -> Result<Page<RedemptionEvent>, Error> {
        self.store
            .list_for_member(member_id, page.max(1), per_page.clamp(1, MAX_PAGE_SIZE))
            .await
    }

    /// Staff view: every redemption at a store during the current
    /// calendar day in the store's local timezone.
    pub async fn store_history_today(
        &self,
        store_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<RedemptionEvent>, Error> {
        let store = self
            .stores
            .get_store(store_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("store {store_id}")))?;
        let (from, to) = local_day_bounds(&store.timezone, now)?;
        self.store.list_for_store_between(store_id, from, to).await
    }

    /// Members may only see their own tickets; an unknown id and a
    /// foreign id are indistinguishable on purpose.
    async fn load_owned(&self, ticket_id: Uuid, actor: &Actor) -> Result<Ticket, RedeemError> {
        let Some(ticket) = self.store.get_ticket(ticket_id).await? else {
            return Err(RedeemError::NotFound);
        };
        if let Actor::Member { member_id } = actor {
            if ticket.member_id != *member_id {
                return Err(RedeemError::NotFound);
            }
        }
        Ok(ticket)
    }
}
