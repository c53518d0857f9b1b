// punchpass-server/src/context.rs

use std::sync::Arc;

use punchpass_core::services::{MemberService, RedemptionService};

/// Shared service bundle handed to every route handler.
#[derive(Clone)]
pub struct ServerContext {
    pub redemptions: Arc<RedemptionService>,
    pub members: Arc<MemberService>,
}
