// File: punchpass-common/src/models/redemption.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::actor::Actor;

/// One consumed use of a ticket. Append-only history row: written
/// exclusively inside a successful redemption transaction, never
/// mutated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedemptionEvent {
    pub event_id: Uuid,
    pub ticket_id: Uuid,
    /// Owner of the ticket (redundant with the ticket row, denormalized
    /// so member history never joins through tickets).
    pub member_id: Uuid,
    pub redeemed_by: Actor,
    pub store_id: Uuid,
    pub redeemed_at: DateTime<Utc>,
}

/// One page of an ordered listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}
