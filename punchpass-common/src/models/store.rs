// File: punchpass-common/src/models/store.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Read-side view of a store. The timezone is an IANA name and drives
/// the store-local "today" window in the staff history view.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Store {
    pub store_id: Uuid,
    pub name: String,
    pub timezone: String,
    pub created_at: DateTime<Utc>,
}
