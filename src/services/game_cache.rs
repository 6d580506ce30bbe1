use async_trait::async_trait;
use chrono::Utc;
use redis::{aio::ConnectionManager, AsyncCommands};
use std::collections::{HashMap, HashSet};

use crate::{
    constants::{
        PLAYER_LEVELS_KEY_SUFFIX, PLAYER_NAMES_KEY_SUFFIX, PLAYER_SEEN_KEY_SUFFIX,
        PLAYER_UPDATES_CHANNEL_SUFFIX, SQUIRREL_KEY_SUFFIX,
    },
    error::{AppError, Result},
    models::{PlayerUpdate, SquirrelPosition, UserSummary},
};

/// Shared, short-lived game state read by every connected browser.
#[async_trait]
pub trait GameCache: Send + Sync {
    async fn squirrel_position(&self) -> Result<Option<SquirrelPosition>>;

    async fn set_squirrel_position(&self, position: SquirrelPosition) -> Result<()>;

    /// Adds or refreshes a player on the roster and announces it.
    async fn join_player(&self, player: &UserSummary) -> Result<()>;

    /// Marks a rostered player as still active. Unknown ids are ignored.
    async fn touch_player(&self, id: &str) -> Result<()>;

    /// Records a new level for a rostered player and announces it.
    async fn set_player_level(&self, id: &str, level: i32) -> Result<()>;

    /// Players seen within the roster TTL. Idle players are dropped.
    async fn players(&self) -> Result<Vec<UserSummary>>;

    async fn is_healthy(&self) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKeys {
    pub squirrel: String,
    pub player_names: String,
    pub player_levels: String,
    pub player_seen: String,
    pub player_updates: String,
}

impl CacheKeys {
    pub fn for_cache(cache_name: &str) -> Self {
        Self {
            squirrel: format!("{}:{}", cache_name, SQUIRREL_KEY_SUFFIX),
            player_names: format!("{}:{}", cache_name, PLAYER_NAMES_KEY_SUFFIX),
            player_levels: format!("{}:{}", cache_name, PLAYER_LEVELS_KEY_SUFFIX),
            player_seen: format!("{}:{}", cache_name, PLAYER_SEEN_KEY_SUFFIX),
            player_updates: format!("{}:{}", cache_name, PLAYER_UPDATES_CHANNEL_SUFFIX),
        }
    }
}

/// Last-seen timestamps at or below this value are stale.
pub fn roster_cutoff(now_secs: i64, ttl_secs: u64) -> i64 {
    now_secs.saturating_sub(i64::try_from(ttl_secs).unwrap_or(i64::MAX))
}

/// Joins the name and level hashes into a roster sorted by level, then name.
/// Players without a recorded name are skipped.
pub fn merge_roster(
    names: HashMap<String, String>,
    levels: &HashMap<String, i32>,
) -> Vec<UserSummary> {
    let mut players: Vec<UserSummary> = names
        .into_iter()
        .map(|(id, username)| {
            let level = levels.get(&id).copied().unwrap_or(1);
            UserSummary { id, username, level }
        })
        .collect();
    players.sort_by(|a, b| b.level.cmp(&a.level).then_with(|| a.username.cmp(&b.username)));
    players
}

#[derive(Clone)]
pub struct RedisGameCache {
    redis: ConnectionManager,
    keys: CacheKeys,
    roster_ttl_secs: u64,
}

impl RedisGameCache {
    pub fn new(redis: ConnectionManager, cache_name: &str, roster_ttl_secs: u64) -> Self {
        Self {
            redis,
            keys: CacheKeys::for_cache(cache_name),
            roster_ttl_secs,
        }
    }

    /// Removes idle players from the seen set and both roster hashes.
    async fn prune_roster(&self, cutoff: i64) -> Result<()> {
        let mut conn = self.redis.clone();
        let stale: Vec<String> = conn
            .zrangebyscore(&self.keys.player_seen, "-inf", cutoff)
            .await?;
        if stale.is_empty() {
            return Ok(());
        }

        let _: () = redis::pipe()
            .atomic()
            .hdel(&self.keys.player_names, &stale)
            .ignore()
            .hdel(&self.keys.player_levels, &stale)
            .ignore()
            .zrembyscore(&self.keys.player_seen, "-inf", cutoff)
            .ignore()
            .query_async(&mut conn)
            .await?;
        tracing::debug!("Dropped {} idle player(s) from roster", stale.len());
        Ok(())
    }

    async fn publish_update(&self, update: &PlayerUpdate) -> Result<()> {
        let payload = serde_json::to_string(update)
            .map_err(|e| AppError::Internal(format!("Failed to encode player update: {}", e)))?;
        let mut conn = self.redis.clone();
        let receivers: i64 = conn.publish(&self.keys.player_updates, payload).await?;
        tracing::debug!(
            "Published update for {} to {} subscriber(s)",
            update.id,
            receivers
        );
        Ok(())
    }
}

#[async_trait]
impl GameCache for RedisGameCache {
    async fn squirrel_position(&self) -> Result<Option<SquirrelPosition>> {
        let mut conn = self.redis.clone();
        let raw: Option<String> = conn.get(&self.keys.squirrel).await?;
        match raw {
            Some(raw) => match serde_json::from_str::<SquirrelPosition>(&raw) {
                Ok(p) => Ok(SquirrelPosition::new(p.x, p.y)),
                Err(err) => {
                    tracing::warn!("Ignoring malformed squirrel position {:?}: {}", raw, err);
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    async fn set_squirrel_position(&self, position: SquirrelPosition) -> Result<()> {
        let payload = serde_json::to_string(&position)
            .map_err(|e| AppError::Internal(format!("Failed to encode position: {}", e)))?;
        let mut conn = self.redis.clone();
        let _: () = conn.set(&self.keys.squirrel, payload).await?;
        Ok(())
    }

    async fn join_player(&self, player: &UserSummary) -> Result<()> {
        let mut conn = self.redis.clone();
        let _: () = redis::pipe()
            .atomic()
            .hset(&self.keys.player_names, &player.id, &player.username)
            .ignore()
            .hset(&self.keys.player_levels, &player.id, player.level)
            .ignore()
            .zadd(&self.keys.player_seen, &player.id, Utc::now().timestamp())
            .ignore()
            .query_async(&mut conn)
            .await?;

        self.publish_update(&PlayerUpdate {
            id: player.id.clone(),
            username: Some(player.username.clone()),
            level: player.level,
        })
        .await
    }

    async fn touch_player(&self, id: &str) -> Result<()> {
        let mut conn = self.redis.clone();
        // XX: only refresh members that already joined
        let _: i64 = redis::cmd("ZADD")
            .arg(&self.keys.player_seen)
            .arg("XX")
            .arg(Utc::now().timestamp())
            .arg(id)
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn set_player_level(&self, id: &str, level: i32) -> Result<()> {
        let mut conn = self.redis.clone();
        let seen: Option<f64> = conn.zscore(&self.keys.player_seen, id).await?;
        if seen.is_some() {
            let _: i64 = conn.hset(&self.keys.player_levels, id, level).await?;
        }

        self.publish_update(&PlayerUpdate {
            id: id.to_string(),
            username: None,
            level,
        })
        .await
    }

    async fn players(&self) -> Result<Vec<UserSummary>> {
        let cutoff = roster_cutoff(Utc::now().timestamp(), self.roster_ttl_secs);
        self.prune_roster(cutoff).await?;

        let mut conn = self.redis.clone();
        let live: HashSet<String> = conn
            .zrangebyscore(&self.keys.player_seen, cutoff + 1, "+inf")
            .await?;
        let mut names: HashMap<String, String> = conn.hgetall(&self.keys.player_names).await?;
        names.retain(|id, _| live.contains(id));
        let levels: HashMap<String, i32> = conn.hgetall(&self.keys.player_levels).await?;
        Ok(merge_roster(names, &levels))
    }

    async fn is_healthy(&self) -> bool {
        let mut conn = self.redis.clone();
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .is_ok()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_namespaced_by_cache() {
        let keys = CacheKeys::for_cache("squirrel-game");
        assert_eq!(keys.squirrel, "squirrel-game:squirrel");
        assert_eq!(keys.player_names, "squirrel-game:players:names");
        assert_eq!(keys.player_levels, "squirrel-game:players:levels");
        assert_eq!(keys.player_seen, "squirrel-game:players:seen");
        assert_eq!(keys.player_updates, "squirrel-game:player-updates");
    }

    #[test]
    fn roster_sorts_by_level_then_name() {
        let names = HashMap::from([
            ("a".to_string(), "Zed".to_string()),
            ("b".to_string(), "Amy".to_string()),
            ("c".to_string(), "Bob".to_string()),
        ]);
        let levels = HashMap::from([("a".to_string(), 3), ("b".to_string(), 1)]);

        let roster = merge_roster(names, &levels);
        let order: Vec<&str> = roster.iter().map(|p| p.username.as_str()).collect();
        assert_eq!(order, vec!["Zed", "Amy", "Bob"]);
        assert_eq!(roster[2].level, 1);
    }

    #[tokio::test]
    async fn memory_cache_tracks_level_changes() {
        let cache = memory::MemoryGameCache::new();
        cache
            .join_player(&UserSummary {
                id: "p1".to_string(),
                username: "TealOtter".to_string(),
                level: 1,
            })
            .await
            .unwrap();
        cache.set_player_level("p1", 4).await.unwrap();

        let players = cache.players().await.unwrap();
        assert_eq!(players.len(), 1);
        assert_eq!(players[0].level, 4);
        assert_eq!(cache.published.read().await.len(), 2);
    }

    fn player(id: &str, username: &str) -> UserSummary {
        UserSummary {
            id: id.to_string(),
            username: username.to_string(),
            level: 1,
        }
    }

    #[test]
    fn cutoff_subtracts_ttl_without_overflow() {
        assert_eq!(roster_cutoff(1_000, 120), 880);
        assert_eq!(roster_cutoff(i64::MIN + 5, 120), i64::MIN);
        assert_eq!(roster_cutoff(0, u64::MAX), i64::MIN);
    }

    #[tokio::test]
    async fn idle_player_drops_off_roster() {
        let cache = memory::MemoryGameCache::new();
        cache.join_player(&player("p1", "TealOtter")).await.unwrap();
        cache.join_player(&player("p2", "MintFox")).await.unwrap();

        let ttl = i64::try_from(cache.roster_ttl_secs).unwrap();
        cache.backdate("p1", ttl + 1).await;

        let players = cache.players().await.unwrap();
        assert_eq!(players.len(), 1);
        assert_eq!(players[0].username, "MintFox");
        assert!(!cache.has_level_for("p1").await);
    }

    #[tokio::test]
    async fn touch_keeps_player_on_roster() {
        let cache = memory::MemoryGameCache::new();
        cache.join_player(&player("p1", "TealOtter")).await.unwrap();

        let ttl = i64::try_from(cache.roster_ttl_secs).unwrap();
        cache.backdate("p1", ttl + 1).await;
        cache.touch_player("p1").await.unwrap();

        assert_eq!(cache.players().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unknown_players_are_not_added_by_touch_or_level() {
        let cache = memory::MemoryGameCache::new();
        cache.touch_player("ghost").await.unwrap();
        cache.set_player_level("ghost", 5).await.unwrap();

        assert!(cache.players().await.unwrap().is_empty());
        assert!(!cache.has_level_for("ghost").await);
        assert_eq!(cache.published.read().await.len(), 1);
    }
}
