// File: punchpass-server/src/routes/tickets.rs

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use punchpass_common::models::{MemberTicketSummary, Ticket};

use crate::context::ServerContext;
use crate::routes::{ActorContext, ApiError, ensure_member_scope};

#[derive(Debug, Deserialize)]
pub struct GrantTicketRequest {
    pub member_id: Uuid,
    pub ticket_type: String,
    pub total_uses: i32,
    pub expires_at: DateTime<Utc>,
}

/// Issuance endpoint for the back-office/POS sale flow.
pub async fn grant(
    State(ctx): State<ServerContext>,
    ActorContext(actor): ActorContext,
    Json(req): Json<GrantTicketRequest>,
) -> Result<(StatusCode, Json<Ticket>), ApiError> {
    if !actor.is_staff() {
        return Err(ApiError::forbidden("only staff may grant tickets"));
    }
    let ticket = ctx
        .redemptions
        .grant_ticket(
            req.member_id,
            &req.ticket_type,
            req.total_uses,
            req.expires_at,
            Utc::now(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(ticket)))
}

/// Portal view: active/inactive groups plus total remaining uses.
pub async fn member_tickets(
    State(ctx): State<ServerContext>,
    Path(member_id): Path<Uuid>,
    ActorContext(actor): ActorContext,
) -> Result<Json<MemberTicketSummary>, ApiError> {
    ensure_member_scope(&actor, member_id)?;
    let summary = ctx
        .redemptions
        .list_member_tickets(member_id, Utc::now())
        .await?;
    Ok(Json(summary))
}
