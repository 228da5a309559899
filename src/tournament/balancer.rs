//! Балансировка турнирных столов.
//!
//! Решение принимается после каждого расчёта раздачи, когда за столом
//! освободились места. Стратегии пробуются по порядку:
//!   1) растворить стол: все выжившие помещаются в свободные места
//!      другого живого стола;
//!   2) добрать одиночку: на каком-то столе остался один игрок —
//!      забрать его сюда (он приезжает сфолженным, чтобы не входить
//!      в чужую раздачу с преимуществом);
//!   3) если столов больше нет, а здесь остался один игрок —
//!      турнир завершён.
//!
//! Планирование чистое: функции смотрят на снимки столов и ничего не
//! двигают. Перенос выполняют акторы, и стек игрока едет с ним
//! без изменений — слияние не создаёт и не сжигает фишки.

use serde::{Deserialize, Serialize};

use crate::domain::table::{Game, GameMode};
use crate::domain::{Chips, GameId, PlayerId, SeatId, TableId};

/// Краткая строка игрока в снимке стола.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerBrief {
    pub id: PlayerId,
    pub seat_id: SeatId,
    pub stack: Chips,
}

/// Снимок одного стола для межстольных решений.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameSnapshot {
    pub game_id: GameId,
    pub table_id: TableId,
    pub mode: GameMode,
    pub num_seats: u8,
    pub started: bool,
    pub ended: bool,
    pub active_players: Vec<PlayerBrief>,
}

impl GameSnapshot {
    pub fn from_game(game: &Game) -> Self {
        Self {
            game_id: game.id,
            table_id: game.table_id,
            mode: game.mode,
            num_seats: game.num_seats,
            started: game.started_at.is_some(),
            ended: game.ended,
            active_players: game
                .active_players()
                .iter()
                .map(|p| PlayerBrief {
                    id: p.id,
                    seat_id: p.seat_id,
                    stack: p.stack,
                })
                .collect(),
        }
    }

    pub fn active_count(&self) -> usize {
        self.active_players.len()
    }

    pub fn empty_seats(&self) -> usize {
        (self.num_seats as usize).saturating_sub(self.active_count())
    }

    fn is_running(&self) -> bool {
        self.started && !self.ended
    }
}

/// Решение балансировщика.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BalanceAction {
    /// Растворить стол `from`: все его выжившие переезжают на `to`,
    /// `from` закрывается.
    AbsorbInto { from: GameId, to: GameId },
    /// Забрать единственного игрока стола `from` на стол `to`,
    /// `from` закрывается.
    PullLoner { from: GameId, to: GameId },
    /// Все остальные столы закрыты, остался один игрок — турнир
    /// завершён.
    FinishTournament,
}

/// Выбрать действие для стола `settled`, только что закончившего
/// раздачу. `siblings` — остальные столы того же турнира.
pub fn plan_balance(settled: &GameSnapshot, siblings: &[GameSnapshot]) -> Option<BalanceAction> {
    if settled.mode != GameMode::Tournament || settled.ended {
        return None;
    }
    if settled.empty_seats() == 0 {
        return None;
    }

    // 1. Наши выжившие целиком влезают в другой живой стол.
    if settled.active_count() >= 1 {
        for sibling in siblings {
            if sibling.game_id == settled.game_id {
                continue;
            }
            if sibling.is_running()
                && sibling.active_count() > 1
                && settled.active_count() <= sibling.empty_seats()
            {
                return Some(BalanceAction::AbsorbInto {
                    from: settled.game_id,
                    to: sibling.game_id,
                });
            }
        }
    }

    // 2. Где-то остался одиночка, а у нас есть место.
    for sibling in siblings {
        if sibling.game_id == settled.game_id {
            continue;
        }
        if !sibling.ended && sibling.active_count() == 1 && settled.empty_seats() >= 1 {
            return Some(BalanceAction::PullLoner {
                from: sibling.game_id,
                to: settled.game_id,
            });
        }
    }

    // 3. Один игрок здесь, все остальные столы закрыты.
    let others_ended = siblings
        .iter()
        .filter(|s| s.game_id != settled.game_id)
        .all(|s| s.ended);
    if settled.active_count() == 1 && others_ended {
        return Some(BalanceAction::FinishTournament);
    }

    None
}

/// Итоговое ранжирование турнира.
///
/// Сначала места финального стола (чемпион и итеративный отбор рук
/// последнего вскрытия), затем вылетевшие в порядке "самый свежий
/// вылет — выше", без дублей, не длиннее плана наград.
pub fn final_rankings(
    final_table: &[PlayerId],
    eliminations: &[PlayerId],
    plan_len: usize,
) -> Vec<PlayerId> {
    let mut ranking: Vec<PlayerId> = Vec::with_capacity(plan_len);
    for id in final_table {
        if !ranking.contains(id) {
            ranking.push(*id);
        }
        if ranking.len() == plan_len {
            return ranking;
        }
    }
    for id in eliminations.iter().rev() {
        if !ranking.contains(id) {
            ranking.push(*id);
        }
        if ranking.len() == plan_len {
            break;
        }
    }
    ranking
}
