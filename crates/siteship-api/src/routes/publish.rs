//! Publish API routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use siteship_core::ResourceId;
use siteship_db::StatusRepo;

use crate::AppState;
use crate::error::ApiError;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/publish", post(publish))
        .route("/publish/{id}/status", get(publish_status))
}

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PublishRequest {
    #[serde(default)]
    pub subscription_id: String,
}

#[derive(Debug, Serialize)]
pub struct PublishResponse {
    pub success: bool,
    pub subdomain: String,
    pub full_domain: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub subscription_id: Uuid,
    pub subdomain: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Trigger a publish. Answers as soon as the subdomain is provisioned and
/// the background work is scheduled.
async fn publish(
    State(state): State<AppState>,
    Json(request): Json<PublishRequest>,
) -> Result<Json<PublishResponse>, ApiError> {
    let raw = request.subscription_id.trim();
    if raw.is_empty() {
        return Err(ApiError::BadRequest("subscription_id is required".to_string()));
    }
    let subscription_id: ResourceId = raw
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid subscription_id: {}", raw)))?;

    // Lookup and allocation failures both answer 500; the caller cannot
    // fix them by changing the request.
    let receipt = state
        .publish
        .publish(subscription_id)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(PublishResponse {
        success: true,
        subdomain: receipt.subdomain,
        full_domain: receipt.full_domain,
        message: receipt.message,
    }))
}

/// Latest publish status for a subscription.
async fn publish_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<StatusResponse>, ApiError> {
    let status = state
        .statuses
        .latest_for_subscription(ResourceId::from_uuid(id))
        .await?;

    Ok(Json(StatusResponse {
        subscription_id: status.subscription_id,
        subdomain: status.subdomain,
        status: status.status,
        error: status.error,
        updated_at: status.updated_at,
    }))
}
