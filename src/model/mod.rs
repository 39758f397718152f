use serde::{Deserialize, Serialize};

/// Board dimensions and mine count. `mines < rows * cols` is enforced by
/// `Board::new`, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub rows: usize,
    pub cols: usize,
    pub mines: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Expert,
    Custom,
}

/// Request body for game creation. Fixed difficulties carry no settings,
/// custom games bring their own.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(tag = "difficulty", rename_all = "lowercase")]
pub enum CreateGame {
    Beginner,
    Intermediate,
    Expert,
    Custom {
        rows: usize,
        cols: usize,
        mines: usize,
    },
}

impl CreateGame {
    pub fn difficulty(&self) -> Difficulty {
        match self {
            CreateGame::Beginner => Difficulty::Beginner,
            CreateGame::Intermediate => Difficulty::Intermediate,
            CreateGame::Expert => Difficulty::Expert,
            CreateGame::Custom { .. } => Difficulty::Custom,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CellAction {
    Open,
    OpenAdjacent,
    Flag,
    Mark,
    Clear,
}

/// Body of `PATCH /games/<id>/cells`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct UpdateCell {
    pub action: CellAction,
    pub x: usize,
    pub y: usize,
}

/// Body of `POST /games/<id>/cells`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct GetCell {
    pub x: usize,
    pub y: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellState {
    Closed,
    Flagged,
    Marked,
    Opened,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameState {
    Waiting,
    Playing,
    Win,
    Lose,
}

/// Single cell as seen by the client. `mine` is only disclosed once the game
/// is over.
#[derive(Debug, Clone, Serialize)]
pub struct CellView {
    pub x: usize,
    pub y: usize,
    pub state: CellState,
    pub adjacent_mines: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mine: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BoardView {
    pub settings: Settings,
    pub cells: Vec<CellView>,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Time {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GameView {
    pub id: String,
    pub difficulty: Difficulty,
    pub state: GameState,
    pub time: Time,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cells: Option<Vec<CellView>>,
}

/// Cells touched by a single `PATCH /games/<id>/cells` action.
#[derive(Debug, Clone, Serialize)]
pub struct ActionResult {
    pub cells: Vec<CellView>,
}

/// Score emitted to the ranking store when a ranked game is won.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreRecord {
    pub game_id: String,
    pub elapsed_millis: u64,
    pub difficulty: Difficulty,
    pub reported_at: u64,
}

/// Leaderboards for the three fixed difficulties, as served by
/// `GET /ranking`.
#[derive(Debug, Clone, Serialize)]
pub struct RankingsView {
    pub beginner: Vec<ScoreRecord>,
    pub intermediate: Vec<ScoreRecord>,
    pub expert: Vec<ScoreRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub status: &'static str,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: "success",
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_game_parses_fixed_difficulty() {
        let dto: CreateGame = serde_json::from_str(r#"{"difficulty": "beginner"}"#).unwrap();
        assert!(matches!(dto, CreateGame::Beginner));
        assert_eq!(dto.difficulty(), Difficulty::Beginner);
    }

    #[test]
    fn create_game_parses_custom_settings() {
        let dto: CreateGame = serde_json::from_str(
            r#"{"difficulty": "custom", "rows": 4, "cols": 5, "mines": 6}"#,
        )
        .unwrap();
        match dto {
            CreateGame::Custom { rows, cols, mines } => {
                assert_eq!((rows, cols, mines), (4, 5, 6));
            }
            _ => panic!("expected custom settings"),
        }
        assert_eq!(dto.difficulty(), Difficulty::Custom);
    }

    #[test]
    fn cell_action_uses_screaming_snake_case() {
        let action: CellAction = serde_json::from_str(r#""OPEN_ADJACENT""#).unwrap();
        assert_eq!(action, CellAction::OpenAdjacent);
    }

    #[test]
    fn cell_view_omits_mine_unless_disclosed() {
        let view = CellView {
            x: 1,
            y: 2,
            state: CellState::Closed,
            adjacent_mines: 0,
            mine: None,
        };
        let json = serde_json::to_string(&view).unwrap();
        assert!(!json.contains("mine"));
    }
}
