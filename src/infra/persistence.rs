use std::collections::HashMap;

use parking_lot::Mutex;
use thiserror::Error;

use crate::domain::table::Game;
use crate::domain::tournament::Tournament;
use crate::domain::{GameId, TournamentId};
use crate::engine::hand_history::ActionRecord;

/// Ошибка хранилища. Запись — best effort: рантайм логирует ошибку и
/// продолжает с состоянием в памяти до следующей удачной записи.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Абстракция хранилища.
///
/// Реализация обязана давать read-your-writes внутри одной критической
/// секции игры: чтение после записи видит эту запись.
pub trait GameStore: Send + Sync {
    fn save_game(&self, game: &Game) -> Result<(), StoreError>;

    fn load_game(&self, id: GameId) -> Option<Game>;

    fn save_tournament(&self, tournament: &Tournament) -> Result<(), StoreError>;

    fn load_tournament(&self, id: TournamentId) -> Option<Tournament>;

    /// Дописать строку истории действий.
    fn append_action(&self, record: &ActionRecord) -> Result<(), StoreError>;

    /// Id последней записи истории по игре (0 — истории нет).
    fn last_action_id(&self, game_id: GameId) -> u64;
}

/// In-memory реализация для тестов и локального запуска.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    games: Mutex<HashMap<GameId, Game>>,
    tournaments: Mutex<HashMap<TournamentId, Tournament>>,
    actions: Mutex<Vec<ActionRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn actions_for(&self, game_id: GameId) -> Vec<ActionRecord> {
        self.actions
            .lock()
            .iter()
            .filter(|r| r.game_id == game_id)
            .cloned()
            .collect()
    }
}

impl GameStore for InMemoryStore {
    fn save_game(&self, game: &Game) -> Result<(), StoreError> {
        self.games.lock().insert(game.id, game.clone());
        Ok(())
    }

    fn load_game(&self, id: GameId) -> Option<Game> {
        self.games.lock().get(&id).cloned()
    }

    fn save_tournament(&self, tournament: &Tournament) -> Result<(), StoreError> {
        self.tournaments.lock().insert(tournament.id, tournament.clone());
        Ok(())
    }

    fn load_tournament(&self, id: TournamentId) -> Option<Tournament> {
        self.tournaments.lock().get(&id).cloned()
    }

    fn append_action(&self, record: &ActionRecord) -> Result<(), StoreError> {
        self.actions.lock().push(record.clone());
        Ok(())
    }

    fn last_action_id(&self, game_id: GameId) -> u64 {
        self.actions
            .lock()
            .iter()
            .rev()
            .find(|r| r.game_id == game_id)
            .map(|r| r.id)
            .unwrap_or(0)
    }
}
