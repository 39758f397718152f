use dashmap::DashMap;
use tracing::info;

use crate::model::{Difficulty, ScoreRecord};

/// Receives the score of a ranked game when it is won. The session store
/// calls this exactly once per game.
pub trait ScoreReporter: Send + Sync {
    fn report(&self, score: ScoreRecord);
}

/// In-memory leaderboard, one list per fixed difficulty, sorted by elapsed
/// time ascending.
#[derive(Debug, Default)]
pub struct RankingStore {
    rankings: DashMap<Difficulty, Vec<ScoreRecord>>,
}

impl RankingStore {
    pub fn new() -> Self {
        let rankings = DashMap::new();
        for difficulty in [
            Difficulty::Beginner,
            Difficulty::Intermediate,
            Difficulty::Expert,
        ] {
            rankings.insert(difficulty, Vec::new());
        }

        Self { rankings }
    }

    pub fn rankings_for(&self, difficulty: Difficulty) -> Vec<ScoreRecord> {
        self.rankings
            .get(&difficulty)
            .map(|scores| scores.value().clone())
            .unwrap_or_default()
    }

    /// 1-based position of a game in its difficulty's leaderboard.
    pub fn rank_of(&self, game_id: &str, difficulty: Difficulty) -> Option<usize> {
        self.rankings
            .get(&difficulty)?
            .iter()
            .position(|score| score.game_id == game_id)
            .map(|index| index + 1)
    }
}

impl ScoreReporter for RankingStore {
    fn report(&self, score: ScoreRecord) {
        let game_id = score.game_id.clone();
        let difficulty = score.difficulty;
        let elapsed_millis = score.elapsed_millis;

        {
            let mut scores = self.rankings.entry(difficulty).or_insert_with(Vec::new);
            scores.push(score);
            scores.sort_by_key(|score| score.elapsed_millis);
        }

        let rank = self.rank_of(&game_id, difficulty).unwrap_or(0);
        info!(
            "Score ({}ms) added to {:?} rankings for game {}, achieved rank {}",
            elapsed_millis, difficulty, game_id, rank
        );
    }
}
