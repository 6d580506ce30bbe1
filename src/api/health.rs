use axum::{extract::State, Json};
use serde::Serialize;

use super::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
    pub cache: String,
}

fn connection_label(ok: bool) -> String {
    if ok { "connected" } else { "disconnected" }.to_string()
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = connection_label(state.store.is_healthy().await);
    let cache = connection_label(state.cache.is_healthy().await);

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database,
        cache,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::test_app;

    #[tokio::test]
    async fn reports_each_backend() {
        let app = test_app();
        app.cache.set_failing(true);

        let Json(body) = health_check(State(app.state)).await;
        assert_eq!(body.status, "ok");
        assert_eq!(body.database, "connected");
        assert_eq!(body.cache, "disconnected");
    }
}
