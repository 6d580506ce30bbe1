use axum::{extract::State, http::HeaderMap, Json};

use crate::{
    error::Result,
    models::{LevelUpRequest, LevelUpResponse},
};

use super::{require_internal_caller, AppState};

/// POST /api/v1/users/level-up
pub async fn level_up_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<LevelUpRequest>,
) -> Result<Json<LevelUpResponse>> {
    require_internal_caller(&headers, &state)?;

    tracing::debug!(
        "Level-up request for {}: exp={} level={} delta={}",
        req.user.id,
        req.user.exp,
        req.user.level,
        req.exp
    );

    let response = state.level_up_service().level_up(&req).await?;
    Ok(Json(response))
}
