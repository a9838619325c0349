//! Axum route handler for one-shot word-cloud layout.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::layout::{Container, FontFamily, Gaps, LayoutOutcome, RenderedTerm, TextBoxPool};
use crate::models::stats::{Stats, Term};
use crate::state::AppState;

/// Upper bound on terms in one layout pass, stateless or live.
pub(crate) const MAX_LAYOUT_TERMS: usize = 1000;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LayoutRequest {
    pub container_width: f32,
    pub container_height: f32,
    /// `[text, count]` pairs in slot order.
    pub terms: Vec<(String, u64)>,
    #[serde(default)]
    pub max_count: Option<u64>,
    /// Falls back to the configured gaps.
    #[serde(default)]
    pub gap_h: Option<f32>,
    #[serde(default)]
    pub gap_v: Option<f32>,
    #[serde(default)]
    pub font: Option<FontFamily>,
}

#[derive(Debug, Serialize)]
pub struct LayoutResponse {
    pub outcome: LayoutOutcome,
    pub terms: Vec<RenderedTerm>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/layout
///
/// Styles, measures and packs a stats payload with a fresh box pool.
/// Nothing is retained between requests.
pub async fn handle_layout(
    State(state): State<AppState>,
    Json(request): Json<LayoutRequest>,
) -> Result<Json<LayoutResponse>, AppError> {
    let container = validate_container(request.container_width, request.container_height)?;
    if request.terms.len() > MAX_LAYOUT_TERMS {
        return Err(AppError::Validation(format!(
            "at most {MAX_LAYOUT_TERMS} terms can be laid out at once"
        )));
    }

    let defaults = state.config.gaps();
    let gaps = Gaps {
        horizontal: validate_gap("gap_h", request.gap_h.unwrap_or(defaults.horizontal))?,
        vertical: validate_gap("gap_v", request.gap_v.unwrap_or(defaults.vertical))?,
    };

    let mut scale = state.config.type_scale();
    if let Some(font) = request.font {
        scale.font = font;
    }

    let stats = Stats {
        terms: request
            .terms
            .into_iter()
            .map(|(text, count)| Term { text, count })
            .collect(),
        max_count: request.max_count,
    };

    let packer = state.packer;
    let response = tokio::task::spawn_blocking(move || {
        let mut pool = TextBoxPool::new(scale);
        let outcome = packer.layout(container, &stats, gaps, &mut pool);
        LayoutResponse {
            outcome,
            terms: pool.rendered(),
        }
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in layout: {e}")))?;

    Ok(Json(response))
}

// ────────────────────────────────────────────────────────────────────────────
// Validation
// ────────────────────────────────────────────────────────────────────────────

/// Zero-sized containers are accepted; layout is skipped until they grow.
pub(crate) fn validate_container(width: f32, height: f32) -> Result<Container, AppError> {
    if !width.is_finite() || !height.is_finite() || width < 0.0 || height < 0.0 {
        return Err(AppError::Validation(
            "container dimensions must be finite and non-negative".to_string(),
        ));
    }
    Ok(Container::new(width, height))
}

fn validate_gap(name: &str, value: f32) -> Result<f32, AppError> {
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::Validation(format!(
            "{name} must be finite and non-negative"
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_container_accepts_zero() {
        assert!(validate_container(0.0, 0.0).is_ok());
        assert!(validate_container(400.0, 200.0).is_ok());
    }

    #[test]
    fn test_validate_container_rejects_negative_and_nan() {
        assert!(matches!(
            validate_container(-1.0, 10.0),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            validate_container(10.0, f32::NAN),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_gap() {
        assert_eq!(validate_gap("gap_h", 0.0).ok(), Some(0.0));
        assert!(validate_gap("gap_h", -2.0).is_err());
        assert!(validate_gap("gap_v", f32::INFINITY).is_err());
    }
}
