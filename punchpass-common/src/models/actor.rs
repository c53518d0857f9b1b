// File: punchpass-common/src/models/actor.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request-scoped identity of whoever is driving a redemption.
///
/// Supplied per request by the external auth layer and passed into the
/// engine explicitly; there is no ambient session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Actor {
    /// The member themself, e.g. from the member portal.
    Member { member_id: Uuid },
    /// Staff redeeming on behalf of a located member at a store.
    Staff { staff_id: Uuid, store_id: Uuid },
}

impl Actor {
    pub fn kind(&self) -> &'static str {
        match self {
            Actor::Member { .. } => "member",
            Actor::Staff { .. } => "staff",
        }
    }

    /// The id of the acting party (member or staff).
    pub fn actor_id(&self) -> Uuid {
        match self {
            Actor::Member { member_id } => *member_id,
            Actor::Staff { staff_id, .. } => *staff_id,
        }
    }

    pub fn is_staff(&self) -> bool {
        matches!(self, Actor::Staff { .. })
    }
}
