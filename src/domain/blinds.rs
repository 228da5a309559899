use serde::{Deserialize, Serialize};

use crate::domain::chips::Chips;

/// Режим эскалации блайндов. Режимы взаимоисключающие: у стола задан
/// ровно один (или None — блайнды фиксированные).
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum BlindIncreaseMode {
    /// Блайнды не растут.
    None,
    /// По времени: прошло `interval_secs` с последнего повышения.
    Time { interval_secs: u64 },
    /// По счётчику раздач: сыграно `hands` раздач с последнего повышения.
    Round { hands: u32 },
}

/// Расписание эскалации min_bet для одного стола.
///
/// `min_bet` хранится на самой игре; здесь — правило и штампы последнего
/// повышения.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlindSchedule {
    pub mode: BlindIncreaseMode,
    /// Множитель повышения (обычно 2).
    pub multiplier: u64,
    /// Unix-время последнего повышения (или создания стола).
    pub updated_at_ts: u64,
    /// Номер раздачи на момент последнего повышения.
    pub updated_hand: u32,
}

impl BlindSchedule {
    pub fn fixed() -> Self {
        Self {
            mode: BlindIncreaseMode::None,
            multiplier: 1,
            updated_at_ts: 0,
            updated_hand: 0,
        }
    }

    pub fn by_time(interval_secs: u64, multiplier: u64, created_at_ts: u64) -> Self {
        Self {
            mode: BlindIncreaseMode::Time { interval_secs },
            multiplier,
            updated_at_ts: created_at_ts,
            updated_hand: 0,
        }
    }

    pub fn by_round(hands: u32, multiplier: u64) -> Self {
        Self {
            mode: BlindIncreaseMode::Round { hands },
            multiplier,
            updated_at_ts: 0,
            updated_hand: 0,
        }
    }

    /// Проверить расписание на старте раздачи и, если пора, поднять
    /// `min_bet`. Возвращает новое значение, если повышение произошло.
    pub fn escalate(&mut self, min_bet: &mut Chips, hand: u32, now_ts: u64) -> Option<Chips> {
        match self.mode {
            BlindIncreaseMode::None => None,
            BlindIncreaseMode::Time { interval_secs } => {
                if now_ts.saturating_sub(self.updated_at_ts) > interval_secs {
                    *min_bet = min_bet.saturating_mul(self.multiplier);
                    self.updated_at_ts = now_ts;
                    Some(*min_bet)
                } else {
                    None
                }
            }
            BlindIncreaseMode::Round { hands } => {
                if hand >= self.updated_hand + hands {
                    *min_bet = min_bet.saturating_mul(self.multiplier);
                    self.updated_hand = hand;
                    Some(*min_bet)
                } else {
                    None
                }
            }
        }
    }
}

/// Большой блайнд равен min_bet стола.
pub fn big_blind(min_bet: Chips) -> Chips {
    min_bet
}

/// Малый блайнд — половина min_bet. При нечётном min_bet половина
/// округляется вниз: это задокументированное целочисленное поведение.
pub fn small_blind(min_bet: Chips) -> Chips {
    min_bet.div_floor(2)
}
