// File: punchpass-common/src/models/ticket.rs

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A redeemable grant of bounded uses held by a member.
///
/// `remaining_uses` only ever decreases, by exactly one per successful
/// redemption, and never drops below zero. Tickets are kept forever for
/// history; there is no delete path.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Ticket {
    pub ticket_id: Uuid,
    pub member_id: Uuid,
    pub ticket_type: String,
    pub total_uses: i32,
    pub remaining_uses: i32,
    pub expires_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_redeemed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Derived lifecycle status. Never stored; always recomputed from the
/// ticket fields and the supplied clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Active,
    Used,
    Expired,
}

/// Read-side classification used to decide whether to show a redeem
/// control before committing to the transactional call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Eligibility {
    Redeemable,
    Cooldown { remaining_seconds: i64 },
    Used,
    Expired,
}

impl Ticket {
    /// Expiry wins over exhaustion: a ticket past `expires_at` is
    /// `Expired` even with uses remaining.
    pub fn status(&self, now: DateTime<Utc>) -> TicketStatus {
        if now >= self.expires_at {
            TicketStatus::Expired
        } else if self.remaining_uses == 0 {
            TicketStatus::Used
        } else {
            TicketStatus::Active
        }
    }

    pub fn eligibility(&self, now: DateTime<Utc>, cooldown: Duration) -> Eligibility {
        match self.status(now) {
            TicketStatus::Expired => Eligibility::Expired,
            TicketStatus::Used => Eligibility::Used,
            TicketStatus::Active => match self.last_redeemed_at {
                Some(last) if now - last < cooldown => {
                    let left = (last + cooldown) - now;
                    // rounded up: a locked ticket never reports 0 seconds
                    let secs = (left.num_milliseconds() + 999) / 1000;
                    Eligibility::Cooldown {
                        remaining_seconds: secs.max(1),
                    }
                }
                _ => Eligibility::Redeemable,
            },
        }
    }
}

/// Grouped portal view of one member's tickets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberTicketSummary {
    pub active: Vec<Ticket>,
    pub inactive: Vec<Ticket>,
    /// Sum of `remaining_uses` across the active group.
    pub total_remaining_uses: i64,
}
