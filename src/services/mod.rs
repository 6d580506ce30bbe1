// All service modules
pub mod game_cache;
pub mod leveling;
pub mod name_generator;
pub mod squirrel;
pub mod token_service;
pub mod user_loader;

// Re-export for convenience
pub use game_cache::{GameCache, RedisGameCache};
pub use leveling::{ExperiencePolicy, LevelUpService};
pub use squirrel::SquirrelMover;
pub use token_service::{JwtTokenService, Permission, TokenService};
pub use user_loader::UserLoader;

use crate::config::Config;
use std::sync::Arc;

/// Start all background services
pub async fn start_background_services(cache: Arc<dyn GameCache>, config: Config) {
    tracing::info!("Starting background services...");

    if config.enable_squirrel_mover {
        let mover = Arc::new(SquirrelMover::new(cache, config.squirrel_move_interval_secs));
        mover.start().await;
    } else {
        tracing::warn!("Squirrel mover disabled via ENABLE_SQUIRREL_MOVER");
    }

    tracing::info!("All background services started successfully");
}
