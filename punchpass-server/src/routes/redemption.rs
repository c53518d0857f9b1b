// File: punchpass-server/src/routes/redemption.rs

use axum::Json;
use axum::extract::{Path, State};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use punchpass_common::models::{Actor, Eligibility, RedemptionEvent, Ticket};

use crate::context::ServerContext;
use crate::routes::{ActorContext, ApiError};

#[derive(Debug, Serialize)]
pub struct EligibilityResponse {
    pub ticket_id: Uuid,
    #[serde(flatten)]
    pub eligibility: Eligibility,
}

/// Read-only check backing the portal/POS redeem button.
pub async fn eligibility(
    State(ctx): State<ServerContext>,
    Path(ticket_id): Path<Uuid>,
    ActorContext(actor): ActorContext,
) -> Result<Json<EligibilityResponse>, ApiError> {
    let eligibility = ctx
        .redemptions
        .prepare_redeem(ticket_id, &actor, Utc::now())
        .await?;
    Ok(Json(EligibilityResponse {
        ticket_id,
        eligibility,
    }))
}

/// Members must say which store they are redeeming at; staff redeem at
/// the store on their credentials and may post an empty object.
#[derive(Debug, Default, Deserialize)]
pub struct RedeemRequest {
    #[serde(default)]
    pub store_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct RedeemResponse {
    pub ticket: Ticket,
    pub event: RedemptionEvent,
}

pub async fn redeem(
    State(ctx): State<ServerContext>,
    Path(ticket_id): Path<Uuid>,
    ActorContext(actor): ActorContext,
    Json(req): Json<RedeemRequest>,
) -> Result<Json<RedeemResponse>, ApiError> {
    let store_id = match actor {
        Actor::Staff { store_id, .. } => store_id,
        Actor::Member { .. } => req.store_id.ok_or_else(|| {
            ApiError::invalid("store_id is required when redeeming from the member portal")
        })?,
    };

    let receipt = ctx
        .redemptions
        .redeem(ticket_id, &actor, store_id, Utc::now())
        .await?;
    Ok(Json(RedeemResponse {
        ticket: receipt.ticket,
        event: receipt.event,
    }))
}
