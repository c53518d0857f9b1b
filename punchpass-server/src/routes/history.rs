// File: punchpass-server/src/routes/history.rs

use axum::Json;
use axum::extract::{Path, Query, State};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use punchpass_common::models::{Page, RedemptionEvent};

use crate::context::ServerContext;
use crate::routes::{ActorContext, ApiError, ensure_member_scope};

const DEFAULT_PAGE_SIZE: u32 = 20;

#[derive(Debug, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Paged redemption history, newest first.
pub async fn member_history(
    State(ctx): State<ServerContext>,
    Path(member_id): Path<Uuid>,
    ActorContext(actor): ActorContext,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<RedemptionEvent>>, ApiError> {
    ensure_member_scope(&actor, member_id)?;
    let page = ctx
        .redemptions
        .member_history(
            member_id,
            params.page.unwrap_or(1),
            params.per_page.unwrap_or(DEFAULT_PAGE_SIZE),
        )
        .await?;
    Ok(Json(page))
}

/// Staff view: everything redeemed at a store today, in the store's
/// local timezone.
pub async fn store_today(
    State(ctx): State<ServerContext>,
    Path(store_id): Path<Uuid>,
    ActorContext(actor): ActorContext,
) -> Result<Json<Vec<RedemptionEvent>>, ApiError> {
    if !actor.is_staff() {
        return Err(ApiError::forbidden("only staff may view store history"));
    }
    let events = ctx
        .redemptions
        .store_history_today(store_id, Utc::now())
        .await?;
    Ok(Json(events))
}
