use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ==================== USER ====================
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: String, // player identifier (source IP)
    pub username: String,
    pub experience: i64,
    pub level: i32,
    pub created_at: DateTime<Utc>,
    pub last_update_time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    pub username: String,
    pub level: i32,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            level: user.level,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: String,
    pub username: String,
    pub experience: i64,
    pub level: i32,
}

// ==================== LEVEL UP ====================
#[derive(Debug, Clone, Deserialize)]
pub struct LevelUpUser {
    pub id: String,
    pub exp: i64,
    pub level: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LevelUpRequest {
    pub user: LevelUpUser,
    pub exp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelUpResponse {
    pub did_user_level_up: bool,
    pub level: i32,
}

// ==================== API RESPONSE ====================
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}
