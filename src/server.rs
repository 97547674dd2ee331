//! Admin surface: preview, tier split and subscriber feed over JSON.

use crate::config::today_at;
use crate::error::{PreviewError, ServerError};
use crate::event::Pick;
use crate::preview::{PreviewResponse, PreviewService};
use crate::tier_verifier::TierVerifier;
use crate::tiers::{Tier, TieredPicks};
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, warn};

pub struct AppContext {
    pub preview: PreviewService,
    pub verifier: Arc<dyn TierVerifier>,
    pub admin_secret: String,
    pub utc_offset_hours: i32,
}

pub type AppState = Arc<AppContext>;

#[derive(Debug, Default, Deserialize)]
pub struct PreviewRequest {
    #[serde(default)]
    pub secret: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DateQuery {
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TiersResponse {
    pub success: bool,
    pub date: NaiveDate,
    #[serde(flatten)]
    pub tiers: TieredPicks,
}

#[derive(Debug, Serialize)]
pub struct SubscriberResponse {
    pub success: bool,
    pub date: NaiveDate,
    pub subscriber: String,
    pub has_access: bool,
    pub tier: Tier,
    pub picks: Vec<Pick>,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServerError::Unauthorized => StatusCode::UNAUTHORIZED,
            ServerError::BadDate(_) => StatusCode::BAD_REQUEST,
            ServerError::Preview(PreviewError::NoPicks { .. }) => StatusCode::NOT_FOUND,
            ServerError::Preview(PreviewError::PickStore(_)) | ServerError::TierVerifier(_) => {
                error!("{:#}", self);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = serde_json::json!({ "success": false, "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}

/// Bearer token, else `x-admin-secret`, plus an optional body secret. An
/// unset configured secret authorizes nothing.
pub fn is_authorized(headers: &HeaderMap, body_secret: Option<&str>, configured: &str) -> bool {
    if configured.is_empty() {
        return false;
    }

    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string()
    };
    let auth = header("authorization");
    let token = match auth.strip_prefix("Bearer ") {
        Some(t) => t.trim().to_string(),
        None => header("x-admin-secret"),
    };

    let authorized = [Some(token.as_str()), body_secret]
        .into_iter()
        .flatten()
        .filter(|t| !t.is_empty())
        .any(|t| t == configured);
    authorized
}

fn resolve_date(state: &AppContext, requested: Option<&str>) -> Result<NaiveDate, ServerError> {
    match requested.filter(|d| !d.is_empty()) {
        Some(d) => NaiveDate::parse_from_str(d, "%Y-%m-%d").map_err(|_| ServerError::BadDate(d.to_string())),
        None => Ok(today_at(state.utc_offset_hours)),
    }
}

fn authorize(state: &AppContext, headers: &HeaderMap, body_secret: Option<&str>) -> Result<(), ServerError> {
    if is_authorized(headers, body_secret, &state.admin_secret) {
        Ok(())
    } else {
        warn!("Rejected admin request");
        Err(ServerError::Unauthorized)
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/admin/trading/preview", post(preview))
        .route("/api/picks/tiers", get(tiers))
        .route("/api/picks/subscriber/:id", get(subscriber_picks))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn preview(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<PreviewResponse>, ServerError> {
    // A missing or malformed body is treated as empty.
    let request: PreviewRequest = serde_json::from_slice(&body).unwrap_or_default();
    authorize(&state, &headers, request.secret.as_deref())?;

    let date = resolve_date(&state, request.date.as_deref())?;
    Ok(Json(state.preview.preview(date).await?))
}

async fn tiers(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<DateQuery>,
) -> Result<Json<TiersResponse>, ServerError> {
    authorize(&state, &headers, None)?;

    let date = resolve_date(&state, query.date.as_deref())?;
    let tiers = state.preview.tiered_picks(date).await?;
    Ok(Json(TiersResponse {
        success: true,
        date,
        tiers,
    }))
}

async fn subscriber_picks(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Query(query): Query<DateQuery>,
) -> Result<Json<SubscriberResponse>, ServerError> {
    authorize(&state, &headers, None)?;

    let date = resolve_date(&state, query.date.as_deref())?;
    let access = state
        .verifier
        .verify(&id)
        .await
        .map_err(ServerError::TierVerifier)?;
    let tiers = state.preview.tiered_picks(date).await?;

    Ok(Json(SubscriberResponse {
        success: true,
        date,
        has_access: access.has_access,
        tier: access.effective_tier(),
        picks: tiers.visible_to(&access),
        subscriber: id,
    }))
}
