use serde::{Deserialize, Serialize};

use crate::constants::{GRID_SIZE, SQUIRREL_START};

use super::UserSummary;

/// Squirrel cell on the board, 1-indexed on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SquirrelPosition {
    pub x: u8,
    pub y: u8,
}

impl SquirrelPosition {
    pub fn new(x: u8, y: u8) -> Option<Self> {
        let on_board = |v: u8| (1..=GRID_SIZE).contains(&v);
        (on_board(x) && on_board(y)).then_some(Self { x, y })
    }
}

impl Default for SquirrelPosition {
    fn default() -> Self {
        Self {
            x: SQUIRREL_START.0,
            y: SQUIRREL_START.1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerUpdate {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub level: i32,
}

#[derive(Debug, Serialize)]
pub struct GameStateResponse {
    pub squirrel: SquirrelPosition,
    pub players: Vec<UserSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_rejects_off_board_cells() {
        assert!(SquirrelPosition::new(0, 5).is_none());
        assert!(SquirrelPosition::new(5, GRID_SIZE + 1).is_none());
        assert_eq!(
            SquirrelPosition::new(GRID_SIZE, 1),
            Some(SquirrelPosition { x: GRID_SIZE, y: 1 })
        );
    }

    #[test]
    fn default_position_is_top_left() {
        assert_eq!(SquirrelPosition::default(), SquirrelPosition { x: 1, y: 1 });
    }

    #[test]
    fn level_only_update_omits_username() {
        let json = serde_json::to_string(&PlayerUpdate {
            id: "a".to_string(),
            username: None,
            level: 3,
        })
        .unwrap();
        assert_eq!(json, r#"{"id":"a","level":3}"#);
    }
}
