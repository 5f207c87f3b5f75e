//! Deploy API routes.

use axum::{Json, Router, extract::State, routing::post};
use serde::Deserialize;
use uuid::Uuid;

use siteship_core::ResourceId;
use siteship_core::deploy::{DeployResult, GeneratedFile};
use siteship_db::DeployConfigRepo;

use crate::AppState;
use crate::error::ApiError;

pub fn router() -> Router<AppState> {
    Router::new().route("/deploy", post(deploy))
}

#[derive(Debug, Deserialize)]
pub struct DeployRequest {
    pub deploy_config_id: Uuid,
    #[serde(default)]
    pub files: Vec<GeneratedFile>,
}

/// Run a deploy synchronously.
///
/// Always answers 200 with the normalized [`DeployResult`]; whether the
/// deploy worked lives in the body's `success` flag. Only an unknown
/// config id is an HTTP-level error.
async fn deploy(
    State(state): State<AppState>,
    Json(request): Json<DeployRequest>,
) -> Result<Json<DeployResult>, ApiError> {
    let config = state
        .configs
        .get(ResourceId::from_uuid(request.deploy_config_id))
        .await?;
    let result = state.deployer.deploy(&config, &request.files).await;
    Ok(Json(result))
}
