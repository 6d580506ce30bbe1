use axum::{extract::State, http::HeaderMap, Json};

use crate::{
    error::Result,
    models::{ApiResponse, GameStateResponse},
};

use super::{require_cache_reader, AppState};

/// GET /api/v1/game/state
pub async fn get_game_state(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<GameStateResponse>>> {
    let claims = require_cache_reader(&headers, &state)?;
    tracing::trace!("Game state read by {}", claims.sub);

    if let Err(e) = state.cache.touch_player(&claims.sub).await {
        tracing::warn!("Roster refresh skipped for {}: {}", claims.sub, e);
    }

    let squirrel = state.cache.squirrel_position().await?.unwrap_or_default();
    let players = state.cache.players().await?;

    Ok(Json(ApiResponse::success(GameStateResponse { squirrel, players })))
}
