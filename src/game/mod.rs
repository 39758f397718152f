use std::time::{SystemTime, UNIX_EPOCH};

use uuid::Uuid;

use crate::error::{GameError, Result};
use crate::model::{
    CellState, CellView, CreateGame, Difficulty, GameState, GameView, ScoreRecord, Settings, Time,
};

pub mod board;
pub mod cell;

pub use board::Board;

const BEGINNER: Settings = Settings {
    rows: 10,
    cols: 10,
    mines: 10,
};
const INTERMEDIATE: Settings = Settings {
    rows: 16,
    cols: 16,
    mines: 40,
};
const EXPERT: Settings = Settings {
    rows: 16,
    cols: 30,
    mines: 99,
};

pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default()
}

/// One live game: a board plus identity, difficulty, timing and the
/// WAITING → PLAYING → {WIN, LOSE} state machine. WIN and LOSE are
/// terminal; every mutating operation becomes a no-op once reached.
#[derive(Debug)]
pub struct Game {
    id: String,
    difficulty: Difficulty,
    board: Board,
    state: GameState,
    time: Time,
    score_reported: bool,
}

impl Game {
    pub fn new(request: CreateGame) -> Result<Self> {
        let settings = match request {
            CreateGame::Beginner => BEGINNER,
            CreateGame::Intermediate => INTERMEDIATE,
            CreateGame::Expert => EXPERT,
            CreateGame::Custom { rows, cols, mines } => Settings { rows, cols, mines },
        };

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            difficulty: request.difficulty(),
            board: Board::new(settings)?,
            state: GameState::Waiting,
            time: Time::default(),
            score_reported: false,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    #[cfg(test)]
    pub(crate) fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn started_at(&self) -> Option<u64> {
        self.time.start
    }

    pub fn is_over(&self) -> bool {
        matches!(self.state, GameState::Win | GameState::Lose)
    }

    /// Custom games never contribute to rankings.
    pub fn is_ranked(&self) -> bool {
        self.difficulty != Difficulty::Custom
    }

    pub fn open(&mut self, x: usize, y: usize) -> Result<Vec<CellView>> {
        if self.is_over() {
            return Ok(Vec::new());
        }

        let opened = self.board.reveal(x, y)?;
        let cells = self.board.views_for(&opened)?;
        self.recompute_state(now_millis());
        Ok(cells)
    }

    /// Chord-reveal: opens every neighbor of an already-opened cell, allowed
    /// only when the adjacent flag count matches the adjacent mine count.
    /// A mis-placed flag can make this open a mine and lose the game.
    pub fn open_adjacent(&mut self, x: usize, y: usize) -> Result<Vec<CellView>> {
        if self.is_over() {
            return Ok(Vec::new());
        }

        let anchor = self.board.cell_at(x, y)?;
        if !anchor.is_opened() {
            return Err(GameError::CellNotOpened);
        }

        let flags = self.board.count_adjacent_flags(x, y);
        let mines = self.board.count_adjacent_mines(x, y);
        if flags != mines {
            return Err(GameError::FlagCountMismatch {
                flags: flags as usize,
                mines: mines as usize,
            });
        }

        let mut opened = Vec::new();
        for (nx, ny) in self.board.adjacent_coords(x, y) {
            opened.extend(self.board.reveal(nx, ny)?);
        }

        let cells = self.board.views_for(&opened)?;
        self.recompute_state(now_millis());
        Ok(cells)
    }

    pub fn flag(&mut self, x: usize, y: usize) -> Result<CellView> {
        self.set_cell_state(x, y, CellState::Flagged)
    }

    pub fn mark(&mut self, x: usize, y: usize) -> Result<CellView> {
        self.set_cell_state(x, y, CellState::Marked)
    }

    pub fn clear(&mut self, x: usize, y: usize) -> Result<CellView> {
        self.set_cell_state(x, y, CellState::Closed)
    }

    fn set_cell_state(&mut self, x: usize, y: usize, state: CellState) -> Result<CellView> {
        if self.is_over() {
            return self.board.cell_view(x, y, false);
        }

        self.board.cell_at_mut(x, y)?.set_state(state)?;
        self.board.cell_view(x, y, false)
    }

    /// Runs after every reveal, once the flood fill has fully completed.
    fn recompute_state(&mut self, now: u64) {
        let previous = self.state;

        if self.board.any_mine_opened() {
            self.time.start.get_or_insert(now);
            self.time.end = Some(now);
            self.state = GameState::Lose;
        } else if self.board.check_win() {
            self.time.start.get_or_insert(now);
            self.time.end = Some(now);
            self.state = GameState::Win;
        } else if self.board.opened_count() == 0 {
            self.state = GameState::Waiting;
        } else {
            // The clock starts on the first real reveal, not at creation.
            if previous == GameState::Waiting {
                self.time.start = Some(now);
            }
            self.state = GameState::Playing;
        }
    }

    pub fn elapsed(&self) -> Option<u64> {
        self.time
            .end
            .zip(self.time.start)
            .and_then(|(end, start)| end.checked_sub(start))
    }

    /// Hands out the score for a ranked win exactly once.
    pub fn take_score(&mut self, now: u64) -> Option<ScoreRecord> {
        if self.state != GameState::Win || !self.is_ranked() || self.score_reported {
            return None;
        }

        let elapsed_millis = self.elapsed()?;
        self.score_reported = true;

        Some(ScoreRecord {
            game_id: self.id.clone(),
            elapsed_millis,
            difficulty: self.difficulty,
            reported_at: now,
        })
    }

    /// The full board, mines included, is only disclosed once the game is
    /// over.
    pub fn serialize(&self) -> GameView {
        GameView {
            id: self.id.clone(),
            difficulty: self.difficulty,
            state: self.state,
            time: self.time,
            cells: self.is_over().then(|| self.board.serialize(true).cells),
        }
    }
}
