use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::blinds::BlindSchedule;
use crate::domain::chips::Chips;
use crate::domain::{GameId, PlayerId, TournamentId};

/// Статус турнира.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum TournamentStatus {
    /// Открыт для посадки, ждёт планового старта.
    Active,
    /// Идёт игра на дочерних столах.
    Running,
    /// Завершён, призы разосланы.
    Ended,
}

/// Доля призового фонда одного места.
///
/// Доли храним в базисных пунктах (10_000 = 100%), чтобы арифметика
/// оставалась целочисленной; усечение при делении — явное поведение.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RewardShare {
    pub bps: u32,
}

impl RewardShare {
    pub fn of(&self, pool: Chips) -> Chips {
        Chips(pool.0.saturating_mul(self.bps as u64) / 10_000)
    }
}

/// Конфигурация турнира: общее число мест, размер стола, план наград
/// и параметры, которые наследует каждый дочерний стол.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TournamentConfig {
    pub name: String,
    /// Общее количество мест в турнире.
    pub total_seats: u32,
    /// Мест за одним столом (2–9).
    pub table_seats: u8,
    pub initial_stack: Chips,
    pub buy_in: Chips,
    pub min_bet: Chips,
    pub blinds: BlindSchedule,
    /// Упорядоченный план наград: rank 1 первым.
    pub reward_plan: Vec<RewardShare>,
    /// Плановое unix-время старта.
    pub start_at_ts: u64,
}

impl TournamentConfig {
    pub fn validate(&self) -> Result<(), TournamentError> {
        if self.name.trim().is_empty() {
            return Err(TournamentError::InvalidConfig("name is empty".into()));
        }
        if self.table_seats < 2 || self.table_seats > 9 {
            return Err(TournamentError::InvalidConfig(
                "table_seats must be in [2, 9]".into(),
            ));
        }
        if self.total_seats == 0 || self.total_seats < self.table_seats as u32 {
            return Err(TournamentError::InvalidConfig(
                "total_seats must fit at least one table".into(),
            ));
        }
        if self.initial_stack.is_zero() {
            return Err(TournamentError::InvalidConfig("initial_stack = 0".into()));
        }
        if self.reward_plan.is_empty() {
            return Err(TournamentError::InvalidConfig("reward_plan is empty".into()));
        }
        let total_bps: u64 = self.reward_plan.iter().map(|s| s.bps as u64).sum();
        if total_bps > 10_000 {
            return Err(TournamentError::InvalidConfig(
                "reward_plan exceeds 100%".into(),
            ));
        }
        Ok(())
    }
}

/// Присуждённое призовое место.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TournamentWinner {
    pub player_id: PlayerId,
    pub name: String,
    pub rank: u32,
    pub reward: Chips,
}

/// Основной объект турнира: конфиг, статус, дочерние игры и журнал
/// вылетов (нужен для раздачи мест за пределами финального стола).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub config: TournamentConfig,
    pub status: TournamentStatus,
    pub child_games: Vec<GameId>,
    /// Вылетевшие игроки в порядке вылета (последний — самый свежий).
    pub eliminations: Vec<PlayerId>,
    /// Итоговые победители (заполняется при завершении).
    pub winners: Vec<TournamentWinner>,
    /// Сколько игроков реально село (для расчёта призового фонда).
    pub entrants: u32,
}

impl Tournament {
    pub fn new(id: TournamentId, config: TournamentConfig) -> Result<Self, TournamentError> {
        config.validate()?;
        Ok(Self {
            id,
            config,
            status: TournamentStatus::Active,
            child_games: Vec::new(),
            eliminations: Vec::new(),
            winners: Vec::new(),
            entrants: 0,
        })
    }

    /// Призовой фонд: бай-ин с каждого севшего игрока.
    pub fn prize_pool(&self) -> Chips {
        self.config.buy_in.saturating_mul(self.entrants as u64)
    }

    pub fn is_ended(&self) -> bool {
        self.status == TournamentStatus::Ended
    }
}

/// Ошибки турнирного слоя.
#[derive(Debug, Error, Clone)]
pub enum TournamentError {
    #[error("Tournament not found: id={tournament_id}")]
    TournamentNotFound { tournament_id: TournamentId },

    #[error("Tournament is full: id={tournament_id}")]
    TournamentFull { tournament_id: TournamentId },

    #[error("Player {player_id} is already seated in tournament {tournament_id}")]
    AlreadySeated {
        player_id: PlayerId,
        tournament_id: TournamentId,
    },

    #[error("Tournament {tournament_id} is not accepting players (status {status:?})")]
    RegistrationClosed {
        tournament_id: TournamentId,
        status: TournamentStatus,
    },

    #[error("Invalid tournament config: {0}")]
    InvalidConfig(String),
}
