use axum::{
    extract::{ConnectInfo, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Duration;
use serde::Serialize;
use std::net::SocketAddr;

use crate::{
    constants::GENERIC_FAILURE_MESSAGE,
    error::{AppError, Result},
    render::render_game_page,
    services::Permission,
    utils::client_ip,
};

use super::AppState;

#[derive(Debug, Serialize)]
pub struct FailureBody {
    pub message: String,
}

/// GET /
pub async fn play_game(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Response {
    let player_id = client_ip(&headers, peer, state.config.trust_forwarded_for).to_string();

    match build_page(&state, &player_id).await {
        Ok(html) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/html")],
            html,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to render game for {}: {}", player_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(FailureBody {
                    message: GENERIC_FAILURE_MESSAGE.to_string(),
                }),
            )
                .into_response()
        }
    }
}

async fn build_page(state: &AppState, player_id: &str) -> Result<String> {
    let user = state.user_loader().load_user(player_id).await?;

    let expires_in = i64::try_from(state.config.token_expiry_minutes)
        .ok()
        .and_then(Duration::try_minutes)
        .ok_or_else(|| AppError::Token("Token expiry out of range".to_string()))?;
    let token = state
        .tokens
        .generate_disposable_token(
            &user.id,
            vec![Permission::read_only(&state.config.cache_name)],
            expires_in,
        )
        .await?;
    tracing::debug!("Token for {} valid until {}", user.id, token.expires_at);

    if let Err(e) = state.cache.join_player(&user).await {
        tracing::warn!("Roster update skipped for {}: {}", user.id, e);
    }

    Ok(render_game_page(&user, &token.auth_token, state.page_settings()))
}
