use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{GameError, Result};
use crate::game::{Game, now_millis};
use crate::model::{ActionResult, BoardView, CellAction, CellView, CreateGame, GameView};
use crate::ranking::ScoreReporter;

/// Registry of live games. The map guards its own structure, and every game
/// sits behind its own lock, so mutations against different ids never
/// contend and two calls against the same id are serialized.
#[derive(Clone)]
pub struct SessionStore {
    games: Arc<DashMap<String, Arc<Mutex<Game>>>>,
    reporter: Arc<dyn ScoreReporter>,
}

impl SessionStore {
    pub fn new(reporter: Arc<dyn ScoreReporter>) -> Self {
        Self {
            games: Arc::new(DashMap::new()),
            reporter,
        }
    }

    pub fn create(&self, request: CreateGame) -> Result<GameView> {
        let game = Game::new(request)?;
        let view = game.serialize();
        let id = game.id().to_string();

        self.games.insert(id.clone(), Arc::new(Mutex::new(game)));
        info!("Created game {} ({:?})", id, request.difficulty());

        Ok(view)
    }

    fn entry(&self, id: &str) -> Result<Arc<Mutex<Game>>> {
        self.games
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| GameError::GameNotFound { id: id.to_string() })
    }

    pub async fn get(&self, id: &str) -> Result<GameView> {
        let game = self.entry(id)?;
        let game = game.lock().await;
        Ok(game.serialize())
    }

    /// Idempotent at this layer; the API checks existence and maps a missed
    /// removal to a not-found response.
    pub fn delete(&self, id: &str) -> bool {
        let removed = self.games.remove(id).is_some();
        if removed {
            info!("Deleted game {}", id);
        }
        removed
    }

    pub async fn get_board(&self, id: &str) -> Result<BoardView> {
        let game = self.entry(id)?;
        let game = game.lock().await;
        Ok(game.board().serialize(false))
    }

    pub async fn get_cell(&self, id: &str, x: usize, y: usize) -> Result<CellView> {
        let game = self.entry(id)?;
        let game = game.lock().await;
        game.board().cell_view(x, y, false)
    }

    pub async fn apply_cell_action(
        &self,
        id: &str,
        x: usize,
        y: usize,
        action: CellAction,
    ) -> Result<ActionResult> {
        let game = self.entry(id)?;
        let mut game = game.lock().await;

        debug!("Applying {:?} at ({}, {}) to game {}", action, x, y, id);

        let cells = match action {
            CellAction::Open => game.open(x, y)?,
            CellAction::OpenAdjacent => game.open_adjacent(x, y)?,
            CellAction::Flag => vec![game.flag(x, y)?],
            CellAction::Mark => vec![game.mark(x, y)?],
            CellAction::Clear => vec![game.clear(x, y)?],
        };

        if let Some(score) = game.take_score(now_millis()) {
            self.reporter.report(score);
        }

        Ok(ActionResult { cells })
    }

    pub fn game_count(&self) -> usize {
        self.games.len()
    }

    /// Evicts finished games older than `max_age` in two passes: collect
    /// ids, then remove. Games whose lock is currently held are skipped and
    /// picked up next tick; an in-flight mutation keeps its own `Arc` and
    /// completes safely even if the entry is removed under it.
    pub fn sweep(&self, now: u64, max_age: Duration) -> usize {
        let max_age_millis = max_age.as_millis() as u64;
        let mut expired = Vec::new();

        for entry in self.games.iter() {
            if let Ok(game) = entry.value().try_lock() {
                let aged_out = game
                    .started_at()
                    .is_some_and(|start| now.saturating_sub(start) > max_age_millis);

                if game.is_over() && aged_out {
                    expired.push(entry.key().clone());
                }
            }
        }

        let removed = expired.len();
        for id in expired {
            self.games.remove(&id);
            debug!("Swept finished game: {}", id);
        }

        if removed > 0 {
            info!("Swept {} finished games", removed);
        }

        removed
    }
}
