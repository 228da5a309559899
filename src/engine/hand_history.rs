use serde::{Deserialize, Serialize};

use crate::domain::{Chips, GameId, PlayerId};
use crate::engine::actions::Action;

/// Одна запись истории действий.
///
/// `id` строго растёт внутри игры: таймаут хода сравнивает id,
/// зафиксированный при передаче хода, с последним — совпадение значит
/// "с тех пор никто не походил".
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActionRecord {
    pub id: u64,
    pub game_id: GameId,
    pub player_id: PlayerId,
    pub action: Action,
    /// Сумма действия, если у него есть размер (рейз, блайнд).
    pub amount: Option<Chips>,
    /// Ставка игры на момент действия.
    pub game_bet: Chips,
}

/// История действий одной игры (append-only).
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActionHistory {
    records: Vec<ActionRecord>,
    next_id: u64,
}

impl ActionHistory {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            next_id: 1,
        }
    }

    /// Записать действие, вернуть его id.
    pub fn record(
        &mut self,
        game_id: GameId,
        player_id: PlayerId,
        action: Action,
        amount: Option<Chips>,
        game_bet: Chips,
    ) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.records.push(ActionRecord {
            id,
            game_id,
            player_id,
            action,
            amount,
            game_bet,
        });
        id
    }

    /// Id последней записи (0, если истории ещё нет).
    pub fn last_id(&self) -> u64 {
        self.records.last().map(|r| r.id).unwrap_or(0)
    }

    pub fn last(&self) -> Option<&ActionRecord> {
        self.records.last()
    }

    pub fn records(&self) -> &[ActionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
