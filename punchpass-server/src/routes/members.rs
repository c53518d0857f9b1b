// File: punchpass-server/src/routes/members.rs

use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;

use punchpass_common::models::Member;

use crate::context::ServerContext;
use crate::routes::{ActorContext, ApiError};

#[derive(Debug, Deserialize)]
pub struct LookupParams {
    pub card: String,
}

/// POS flow: scan a membership card, get the member to redeem for.
pub async fn lookup_member(
    State(ctx): State<ServerContext>,
    ActorContext(actor): ActorContext,
    Query(params): Query<LookupParams>,
) -> Result<Json<Member>, ApiError> {
    if !actor.is_staff() {
        return Err(ApiError::forbidden("only staff may look up members"));
    }
    let member = ctx.members.find_member_by_card(&params.card).await?;
    Ok(Json(member))
}
