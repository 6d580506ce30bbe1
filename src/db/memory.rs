use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use crate::{
    error::{AppError, Result},
    models::{NewUser, User},
};

use super::UserStore;

/// In-process store used by tests. `fail_writes` simulates a backend outage.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<String, User>>,
    fail_writes: AtomicBool,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn insert(&self, id: &str, username: &str, experience: i64, level: i32) {
        let now = Utc::now();
        self.users.write().await.insert(
            id.to_string(),
            User {
                id: id.to_string(),
                username: username.to_string(),
                experience,
                level,
                created_at: now,
                last_update_time: now,
            },
        );
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Internal("simulated store outage".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn get_user(&self, id: &str) -> Result<Option<User>> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn create_user(&self, user: &NewUser) -> Result<()> {
        self.check_writable()?;
        let now = Utc::now();
        self.users
            .write()
            .await
            .entry(user.id.clone())
            .or_insert_with(|| User {
                id: user.id.clone(),
                username: user.username.clone(),
                experience: user.experience,
                level: user.level,
                created_at: now,
                last_update_time: now,
            });
        Ok(())
    }

    async fn upsert_progress(&self, progress: &NewUser) -> Result<()> {
        self.check_writable()?;
        let now = Utc::now();
        let mut users = self.users.write().await;
        let user = users.entry(progress.id.clone()).or_insert_with(|| User {
            id: progress.id.clone(),
            username: progress.username.clone(),
            experience: progress.experience,
            level: progress.level,
            created_at: now,
            last_update_time: now,
        });
        user.experience = progress.experience;
        user.level = progress.level;
        user.last_update_time = now;
        Ok(())
    }

    async fn is_healthy(&self) -> bool {
        !self.fail_writes.load(Ordering::SeqCst)
    }
}
