// File: punchpass-common/src/models/member.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Read-side view of a member. Member CRUD lives in the back-office
/// service; the redemption core only looks members up.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Member {
    pub member_id: Uuid,
    pub display_name: String,
    /// Physical membership card, scanned at the POS to locate the member.
    pub card_number: Option<String>,
    pub phone: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
