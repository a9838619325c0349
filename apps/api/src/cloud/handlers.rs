//! Axum route handlers for live word clouds.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::cloud::live::{CloudSettings, CloudSnapshot, LiveCloud, UpdateOutcome};
use crate::errors::AppError;
use crate::layout::handlers::{validate_container, MAX_LAYOUT_TERMS};
use crate::models::stats::StatsUpdate;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateCloudRequest {
    pub container_width: f32,
    pub container_height: f32,
    /// Slide whose stats this cloud renders.
    #[serde(default)]
    pub slide_index: usize,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct StatsUpdateResponse {
    pub outcome: UpdateOutcome,
    pub snapshot: CloudSnapshot,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/clouds
pub async fn handle_create_cloud(
    State(state): State<AppState>,
    Json(request): Json<CreateCloudRequest>,
) -> Result<(StatusCode, Json<CloudSnapshot>), AppError> {
    let container = validate_container(request.container_width, request.container_height)?;
    let settings = CloudSettings {
        container,
        gaps: state.config.gaps(),
        scale: state.config.type_scale(),
        settle_delay: state.config.settle_delay(),
        max_term_chars: state.config.max_term_chars,
        max_terms: MAX_LAYOUT_TERMS,
    };

    let cloud = state
        .clouds
        .create(request.slide_index, settings, state.packer)
        .await;
    Ok((StatusCode::CREATED, Json(cloud.snapshot())))
}

/// GET /api/v1/clouds/:id
pub async fn handle_get_cloud(
    State(state): State<AppState>,
    Path(cloud_id): Path<Uuid>,
) -> Result<Json<CloudSnapshot>, AppError> {
    let cloud = find_cloud(&state, cloud_id).await?;
    Ok(Json(cloud.snapshot()))
}

/// DELETE /api/v1/clouds/:id
pub async fn handle_delete_cloud(
    State(state): State<AppState>,
    Path(cloud_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.clouds.remove(cloud_id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(cloud_id))
    }
}

/// POST /api/v1/clouds/:id/answers
///
/// Tallies one free-text answer and returns the cloud after the immediate pass.
pub async fn handle_submit_answer(
    State(state): State<AppState>,
    Path(cloud_id): Path<Uuid>,
    Json(request): Json<AnswerRequest>,
) -> Result<Json<CloudSnapshot>, AppError> {
    let cloud = find_cloud(&state, cloud_id).await?;
    cloud.submit_answer(&request.text).await?;
    Ok(Json(cloud.snapshot()))
}

/// PUT /api/v1/clouds/:id/stats
///
/// Inbound stats event from the live transport.
pub async fn handle_stats_update(
    State(state): State<AppState>,
    Path(cloud_id): Path<Uuid>,
    Json(update): Json<StatsUpdate>,
) -> Result<Json<StatsUpdateResponse>, AppError> {
    if update.terms.len() > MAX_LAYOUT_TERMS {
        return Err(AppError::Validation(format!(
            "at most {MAX_LAYOUT_TERMS} terms can be laid out at once"
        )));
    }
    let cloud = find_cloud(&state, cloud_id).await?;
    let outcome = cloud.apply_update(update).await?;
    Ok(Json(StatsUpdateResponse {
        outcome,
        snapshot: cloud.snapshot(),
    }))
}

async fn find_cloud(state: &AppState, cloud_id: Uuid) -> Result<Arc<LiveCloud>, AppError> {
    state
        .clouds
        .get(cloud_id)
        .await
        .ok_or_else(|| not_found(cloud_id))
}

fn not_found(cloud_id: Uuid) -> AppError {
    AppError::NotFound(format!("Cloud {cloud_id} not found"))
}
