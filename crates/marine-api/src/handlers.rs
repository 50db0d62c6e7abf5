//! Request handlers.

use axum::extract::State;
use axum::Json;
use marine_cache::{CacheStore, HealthReport, StalenessPolicy};
use marine_core::types::now_epoch;
use std::sync::Arc;
use tracing::debug;

use crate::error::ApiError;
use crate::response::ConditionsResponse;

/// Shared handler state.
#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<CacheStore>,
    pub policy: StalenessPolicy,
}

/// `GET /api/conditions`
pub async fn get_conditions(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<ConditionsResponse>, ApiError> {
    let view = state.store.view(now_epoch())?;
    debug!(age = view.age_seconds, "Serving conditions");
    Ok(Json(ConditionsResponse::from_snapshot(
        &view.snapshot,
        view.age_seconds,
    )))
}

/// `GET /api/health`
pub async fn get_health(State(state): State<Arc<ApiState>>) -> Json<HealthReport> {
    let snapshot = state.store.read();
    Json(state.policy.health(snapshot.as_deref(), now_epoch()))
}
