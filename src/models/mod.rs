// src/models/mod.rs
pub mod game;
pub mod user;

pub use game::{GameStateResponse, PlayerUpdate, SquirrelPosition};
pub use user::{
    ApiResponse,
    LevelUpRequest,
    LevelUpResponse,
    NewUser,
    User,
    UserSummary,
};
