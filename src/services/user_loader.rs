use std::sync::Arc;

use crate::{
    constants::{STARTING_EXPERIENCE, STARTING_LEVEL},
    db::UserStore,
    error::{AppError, Result},
    models::{NewUser, UserSummary},
};

use super::name_generator::NameGenerator;

/// Fetches a player's record, creating it with a random display name on
/// first contact.
pub struct UserLoader {
    store: Arc<dyn UserStore>,
    names: NameGenerator,
}

impl UserLoader {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self {
            store,
            names: NameGenerator::new(),
        }
    }

    pub async fn load_user(&self, id: &str) -> Result<UserSummary> {
        if id.trim().is_empty() {
            return Err(AppError::BadRequest("Player identifier is empty".to_string()));
        }

        if let Some(user) = self.store.get_user(id).await? {
            return Ok(user.into());
        }

        let new_user = NewUser {
            id: id.to_string(),
            username: self.names.random_name(),
            experience: STARTING_EXPERIENCE,
            level: STARTING_LEVEL,
        };
        self.store.create_user(&new_user).await?;

        // Re-read so a concurrent first contact that won the insert is the one returned.
        let user = self
            .store
            .get_user(id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("User {} vanished after insert", id)))?;

        tracing::info!("Created player {} as {}", user.id, user.username);
        Ok(user.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryUserStore;

    #[tokio::test]
    async fn unseen_player_is_created_at_level_one() {
        let store = Arc::new(MemoryUserStore::new());
        let loader = UserLoader::new(store.clone());

        let user = loader.load_user("203.0.113.7").await.unwrap();
        assert_eq!(user.id, "203.0.113.7");
        assert_eq!(user.level, 1);
        assert!(!user.username.is_empty());

        let stored = store.get_user("203.0.113.7").await.unwrap().unwrap();
        assert_eq!(stored.experience, 0);
        assert_eq!(stored.level, 1);
    }

    #[tokio::test]
    async fn loading_twice_returns_same_player() {
        let store = Arc::new(MemoryUserStore::new());
        let loader = UserLoader::new(store.clone());

        let first = loader.load_user("198.51.100.4").await.unwrap();
        let second = loader.load_user("198.51.100.4").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn existing_player_is_returned_untouched() {
        let store = Arc::new(MemoryUserStore::new());
        store.insert("10.0.0.9", "GoldenOtter", 40, 4).await;
        let loader = UserLoader::new(store);

        let user = loader.load_user("10.0.0.9").await.unwrap();
        assert_eq!(user.username, "GoldenOtter");
        assert_eq!(user.level, 4);
    }

    #[tokio::test]
    async fn store_failure_on_create_propagates() {
        let store = Arc::new(MemoryUserStore::new());
        store.set_fail_writes(true);
        let loader = UserLoader::new(store);

        assert!(loader.load_user("10.0.0.1").await.is_err());
    }

    #[tokio::test]
    async fn empty_identifier_is_rejected() {
        let loader = UserLoader::new(Arc::new(MemoryUserStore::new()));
        let err = loader.load_user("  ").await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
