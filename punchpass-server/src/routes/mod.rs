// punchpass-server/src/routes/mod.rs

pub mod history;
pub mod members;
pub mod redemption;
pub mod tickets;

use std::net::SocketAddr;

use axum::Json;
use axum::Router;
use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum_server::Handle;
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use uuid::Uuid;

use punchpass_common::error::Error;
use punchpass_common::models::Actor;
use punchpass_core::services::RedeemError;

use crate::context::ServerContext;

pub fn router(ctx: ServerContext) -> Router {
    Router::new()
        .route("/tickets", post(tickets::grant))
        .route("/tickets/{ticket_id}/eligibility", get(redemption::eligibility))
        .route("/tickets/{ticket_id}/redeem", post(redemption::redeem))
        .route("/members/{member_id}/tickets", get(tickets::member_tickets))
        .route("/members/{member_id}/redemptions", get(history::member_history))
        .route("/stores/{store_id}/redemptions/today", get(history::store_today))
        .route("/staff/members/lookup", get(members::lookup_member))
        .with_state(ctx)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

pub async fn serve(addr: SocketAddr, ctx: ServerContext) -> Result<(), Error> {
    let app = router(ctx);
    info!("punchpass API listening on http://{}", addr);

    let handle = Handle::new();
    let shutdown_handle = handle.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            shutdown_handle.graceful_shutdown(Some(std::time::Duration::from_secs(5)));
        }
    });

    axum_server::Server::bind(addr)
        .handle(handle)
        .serve(app.into_make_service())
        .await?;
    info!("punchpass API shut down.");
    Ok(())
}

/// Machine-readable failure body shared by every endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_seconds: Option<i64>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    fn new(status: StatusCode, error: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                error,
                message: message.into(),
                remaining_seconds: None,
            },
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "unauthorized", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "forbidden", message)
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, "invalid", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// The API layer only translates engine outcomes; it never invents
/// failure reasons of its own.
impl From<RedeemError> for ApiError {
    fn from(err: RedeemError) -> Self {
        match err {
            RedeemError::NotFound => Self::not_found("This ticket is not available."),
            RedeemError::Expired => {
                Self::new(StatusCode::GONE, "expired", "This ticket has expired.")
            }
            RedeemError::Exhausted => Self::new(
                StatusCode::GONE,
                "exhausted",
                "No uses remain on this ticket.",
            ),
            RedeemError::Cooldown { remaining_seconds } => {
                let mut rejection = Self::new(
                    StatusCode::TOO_MANY_REQUESTS,
                    "cooldown",
                    format!("Redeemed moments ago; try again in {remaining_seconds}s."),
                );
                rejection.body.remaining_seconds = Some(remaining_seconds);
                rejection
            }
            RedeemError::Storage(err) => {
                error!("redemption storage fault: {err}");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "storage",
                    "Something went wrong; please try again.",
                )
            }
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::NotFound(message) => Self::not_found(message),
            Error::Validation(message) => Self::invalid(message),
            other => {
                error!("request failed on storage: {other}");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "storage",
                    "Something went wrong; please try again.",
                )
            }
        }
    }
}

/// Actor identity installed by the upstream auth proxy: members arrive
/// with `x-member-id`, staff with `x-staff-id` + `x-store-id`.
pub struct ActorContext(pub Actor);

fn header_uuid(parts: &Parts, name: &str) -> Result<Option<Uuid>, ApiError> {
    let Some(value) = parts.headers.get(name) else {
        return Ok(None);
    };
    let text = value
        .to_str()
        .map_err(|_| ApiError::unauthorized(format!("malformed {name} header")))?;
    Uuid::parse_str(text)
        .map(Some)
        .map_err(|_| ApiError::unauthorized(format!("malformed {name} header")))
}

impl<S> FromRequestParts<S> for ActorContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(staff_id) = header_uuid(parts, "x-staff-id")? {
            let store_id = header_uuid(parts, "x-store-id")?
                .ok_or_else(|| ApiError::unauthorized("staff identity is missing its store"))?;
            return Ok(Self(Actor::Staff { staff_id, store_id }));
        }
        if let Some(member_id) = header_uuid(parts, "x-member-id")? {
            return Ok(Self(Actor::Member { member_id }));
        }
        Err(ApiError::unauthorized("no actor identity on request"))
    }
}

/// Members may only reach their own resources; staff may reach any.
/// A foreign member id is reported as not-found, not forbidden.
pub(crate) fn ensure_member_scope(actor: &Actor, member_id: Uuid) -> Result<(), ApiError> {
    match actor {
        Actor::Staff { .. } => Ok(()),
        Actor::Member { member_id: caller } if *caller == member_id => Ok(()),
        Actor::Member { .. } => Err(ApiError::not_found("This resource is not available.")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::Request;
    use chrono::{Duration, Utc};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use punchpass_common::models::{Member, Store};
    use punchpass_core::repositories::memory::{
        MemoryMemberRepository, MemoryRedemptionStore, MemoryStoreRepository,
    };
    use punchpass_core::services::{MemberService, RedemptionService};

    struct TestApp {
        router: Router,
        ctx: ServerContext,
        member_id: Uuid,
        store_id: Uuid,
    }

    fn test_app() -> TestApp {
        let store = Arc::new(MemoryRedemptionStore::new());
        let members = Arc::new(MemoryMemberRepository::new());
        let stores = Arc::new(MemoryStoreRepository::new());

        let member_id = Uuid::new_v4();
        members.insert(Member {
            member_id,
            display_name: "Avery Quinn".to_string(),
            card_number: Some("M-1001".to_string()),
            phone: None,
            is_active: true,
            created_at: Utc::now(),
        });

        let store_id = Uuid::new_v4();
        stores.insert(Store {
            store_id,
            name: "Downtown".to_string(),
            timezone: "America/Chicago".to_string(),
            created_at: Utc::now(),
        });

        let ctx = ServerContext {
            redemptions: Arc::new(RedemptionService::new(
                store,
                members.clone(),
                stores,
                Duration::minutes(5),
            )),
            members: Arc::new(MemberService::new(members)),
        };
        TestApp {
            router: router(ctx.clone()),
            ctx,
            member_id,
            store_id,
        }
    }

    async fn grant_ticket(app: &TestApp, total_uses: i32) -> Uuid {
        app.ctx
            .redemptions
            .grant_ticket(
                app.member_id,
                "10-visit pass",
                total_uses,
                Utc::now() + Duration::days(30),
                Utc::now(),
            )
            .await
            .unwrap()
            .ticket_id
    }

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn member_redeem_request(app: &TestApp, ticket_id: Uuid) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(format!("/tickets/{ticket_id}/redeem"))
            .header("x-member-id", app.member_id.to_string())
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::to_vec(&json!({ "store_id": app.store_id })).unwrap(),
            ))
            .unwrap()
    }

    #[tokio::test]
    async fn member_redeems_own_ticket() {
        let app = test_app();
        let ticket_id = grant_ticket(&app, 3).await;

        let response = app
            .router
            .clone()
            .oneshot(member_redeem_request(&app, ticket_id))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["ticket"]["remaining_uses"], 2);
        assert_eq!(body["event"]["store_id"], json!(app.store_id));
    }

    #[tokio::test]
    async fn cooldown_maps_to_429_with_countdown() {
        let app = test_app();
        let ticket_id = grant_ticket(&app, 3).await;

        let ok = app
            .router
            .clone()
            .oneshot(member_redeem_request(&app, ticket_id))
            .await
            .unwrap();
        assert_eq!(ok.status(), StatusCode::OK);

        let blocked = app
            .router
            .clone()
            .oneshot(member_redeem_request(&app, ticket_id))
            .await
            .unwrap();
        assert_eq!(blocked.status(), StatusCode::TOO_MANY_REQUESTS);

        let body = json_body(blocked).await;
        assert_eq!(body["error"], "cooldown");
        assert!(body["remaining_seconds"].as_i64().unwrap() > 0);
    }

    #[tokio::test]
    async fn foreign_members_see_not_found() {
        let app = test_app();
        let ticket_id = grant_ticket(&app, 3).await;

        let response = app
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/tickets/{ticket_id}/eligibility"))
                    .header("x-member-id", Uuid::new_v4().to_string())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = json_body(response).await;
        assert_eq!(body["error"], "not_found");
    }

    #[tokio::test]
    async fn requests_without_identity_are_unauthorized() {
        let app = test_app();
        let response = app
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/members/{}/tickets", app.member_id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn staff_grant_and_lookup_flow() {
        let app = test_app();
        let staff_id = Uuid::new_v4();

        let response = app
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/tickets")
                    .header("x-staff-id", staff_id.to_string())
                    .header("x-store-id", app.store_id.to_string())
                    .header("content-type", "application/json")
                    .body(Body::from(
                        serde_json::to_vec(&json!({
                            "member_id": app.member_id,
                            "ticket_type": "day pass",
                            "total_uses": 1,
                            "expires_at": Utc::now() + Duration::days(7),
                        }))
                        .unwrap(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/staff/members/lookup?card=M-1001")
                    .header("x-staff-id", staff_id.to_string())
                    .header("x-store-id", app.store_id.to_string())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["member_id"], json!(app.member_id));
    }

    #[tokio::test]
    async fn members_cannot_grant_tickets() {
        let app = test_app();
        let response = app
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/tickets")
                    .header("x-member-id", app.member_id.to_string())
                    .header("content-type", "application/json")
                    .body(Body::from(
                        serde_json::to_vec(&json!({
                            "member_id": app.member_id,
                            "ticket_type": "day pass",
                            "total_uses": 1,
                            "expires_at": Utc::now() + Duration::days(7),
                        }))
                        .unwrap(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
