use std::sync::Arc;

use crate::{
    db::UserStore,
    error::{AppError, Result},
    models::{LevelUpRequest, LevelUpResponse, NewUser},
};

use super::{game_cache::GameCache, name_generator::NameGenerator};

/// Cumulative experience needed to advance past `level`, or `None` once the
/// threshold no longer fits in an `i64`.
pub fn next_level_threshold(level: i32) -> Option<i64> {
    let exponent = u32::try_from(level.checked_add(1)?).ok()?;
    2i64.checked_pow(exponent)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelOutcome {
    pub experience: i64,
    pub level: i32,
    pub leveled_up: bool,
}

/// Applies `delta` and climbs as many levels as the new total allows.
/// Levels never go down, even for a negative delta.
pub fn evaluate(experience: i64, level: i32, delta: i64) -> Result<LevelOutcome> {
    if level < 1 {
        return Err(AppError::BadRequest(format!("Level must be >= 1, got {}", level)));
    }
    let new_experience = experience
        .checked_add(delta)
        .ok_or_else(|| AppError::BadRequest("Experience overflow".to_string()))?;

    let mut new_level = level;
    while let Some(threshold) = next_level_threshold(new_level) {
        if new_experience < threshold {
            break;
        }
        new_level += 1;
    }

    Ok(LevelOutcome {
        experience: new_experience,
        level: new_level,
        leveled_up: new_level > level,
    })
}

#[derive(Debug, Clone, Copy)]
pub struct ExperiencePolicy {
    pub allow_negative: bool,
}

impl ExperiencePolicy {
    pub fn check(&self, delta: i64) -> Result<()> {
        if delta < 0 && !self.allow_negative {
            return Err(AppError::BadRequest(format!(
                "Negative experience delta {} is not allowed",
                delta
            )));
        }
        Ok(())
    }
}

/// Evaluates a level-up and persists it, then mirrors the new level into the
/// game cache. A player with no stored record gets one, named on the spot.
pub struct LevelUpService {
    store: Arc<dyn UserStore>,
    cache: Arc<dyn GameCache>,
    policy: ExperiencePolicy,
    names: NameGenerator,
}

impl LevelUpService {
    pub fn new(store: Arc<dyn UserStore>, cache: Arc<dyn GameCache>, policy: ExperiencePolicy) -> Self {
        Self {
            store,
            cache,
            policy,
            names: NameGenerator::new(),
        }
    }

    pub async fn level_up(&self, req: &LevelUpRequest) -> Result<LevelUpResponse> {
        self.policy.check(req.exp)?;
        let outcome = evaluate(req.user.exp, req.user.level, req.exp)?;

        let progress = NewUser {
            id: req.user.id.clone(),
            username: self.names.random_name(),
            experience: outcome.experience,
            level: outcome.level,
        };
        self.store
            .upsert_progress(&progress)
            .await
            .map_err(|e| {
                tracing::error!("Failed to persist progress for {}: {}", req.user.id, e);
                e
            })?;

        if outcome.leveled_up {
            tracing::info!(
                "Player {} leveled up {} -> {}",
                req.user.id,
                req.user.level,
                outcome.level
            );
        }

        if let Err(e) = self.cache.set_player_level(&req.user.id, outcome.level).await {
            tracing::warn!("Cache level sync skipped for {}: {}", req.user.id, e);
        }

        Ok(LevelUpResponse {
            did_user_level_up: outcome.leveled_up,
            level: outcome.level,
        })
    }
}
