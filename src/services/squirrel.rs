use rand::Rng;
use std::sync::Arc;
use tokio::time::{interval, Duration};

use crate::{constants::GRID_SIZE, error::Result, models::SquirrelPosition};

use super::game_cache::GameCache;

/// Squirrel Mover - hops the squirrel to a random cell on a fixed interval
pub struct SquirrelMover {
    cache: Arc<dyn GameCache>,
    interval_secs: u64,
}

pub fn random_position<R: Rng + ?Sized>(rng: &mut R) -> SquirrelPosition {
    SquirrelPosition {
        x: rng.random_range(1..=GRID_SIZE),
        y: rng.random_range(1..=GRID_SIZE),
    }
}

impl SquirrelMover {
    pub fn new(cache: Arc<dyn GameCache>, interval_secs: u64) -> Self {
        Self {
            cache,
            interval_secs: interval_secs.max(1),
        }
    }

    /// Start the move loop
    pub async fn start(self: Arc<Self>) {
        tokio::spawn(async move {
            let mut ticker = interval(Duration::from_secs(self.interval_secs));

            loop {
                ticker.tick().await;

                if let Err(e) = self.hop().await {
                    tracing::error!("Squirrel mover error: {}", e);
                }
            }
        });
    }

    async fn hop(&self) -> Result<SquirrelPosition> {
        let position = random_position(&mut rand::rng());
        self.cache.set_squirrel_position(position).await?;
        tracing::debug!("Squirrel moved to ({}, {})", position.x, position.y);
        Ok(position)
    }
}
