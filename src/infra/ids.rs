use std::sync::atomic::{AtomicU64, Ordering};

use crate::domain::{GameId, HandId, PlayerId, TournamentId};

/// Генерация ID на монотонных счётчиках.
///
/// В проде идентификаторы обычно выдаёт хранилище; счётчики покрывают
/// локальный запуск и тесты, оставаясь валидными в многопоточном
/// рантайме.
#[derive(Debug)]
pub struct IdGenerator {
    game_counter: AtomicU64,
    player_counter: AtomicU64,
    tournament_counter: AtomicU64,
    hand_counter: AtomicU64,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator {
    /// Все счётчики стартуют с 1.
    pub fn new() -> Self {
        Self {
            game_counter: AtomicU64::new(1),
            player_counter: AtomicU64::new(1),
            tournament_counter: AtomicU64::new(1),
            hand_counter: AtomicU64::new(1),
        }
    }

    #[inline]
    pub fn next_game_id(&self) -> GameId {
        self.game_counter.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn next_player_id(&self) -> PlayerId {
        self.player_counter.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn next_tournament_id(&self) -> TournamentId {
        self.tournament_counter.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn next_hand_id(&self) -> HandId {
        self.hand_counter.fetch_add(1, Ordering::Relaxed)
    }
}
