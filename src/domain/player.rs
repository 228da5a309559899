use serde::{Deserialize, Serialize};

use crate::domain::card::Card;
use crate::domain::chips::Chips;
use crate::domain::{PlayerId, SeatId, UNSEATED};
use crate::engine::actions::Action;

/// Игрок за конкретным столом (строка, переживающая раздачи).
///
/// `active` = игрок всё ещё держит место финансово; вылетевший или
/// ушедший игрок остаётся в списке, но с `active = false`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// Место за столом, 0 = не сидит.
    pub seat_id: SeatId,
    /// Текущий стек.
    pub stack: Chips,
    /// Ставка на текущей улице (маркер для уравнивания; сами фишки
    /// уже лежат в банках).
    pub bet: Chips,
    /// Последняя ненулевая ставка игрока в раздаче (для фронта).
    pub last_bet: Chips,
    pub folded: bool,
    pub active: bool,
    /// Последнее действие на этой улице; None = ещё не ходил.
    pub last_action: Option<Action>,
    /// Карманные карты (две в холдеме).
    pub cards: Vec<Card>,
    pub dealer: bool,
    pub small_blind: bool,
    pub big_blind: bool,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>, seat_id: SeatId, stack: Chips) -> Self {
        Self {
            id,
            name: name.into(),
            seat_id,
            stack,
            bet: Chips::ZERO,
            last_bet: Chips::ZERO,
            folded: false,
            active: true,
            last_action: None,
            cards: Vec::new(),
            dealer: false,
            small_blind: false,
            big_blind: false,
        }
    }

    /// Участвует ли игрок в торговле (сидит и не сфолдил).
    pub fn is_active_unfolded(&self) -> bool {
        self.active && !self.folded
    }

    /// Игрок в олл-ине: фишек в стеке не осталось.
    pub fn is_all_in(&self) -> bool {
        self.stack.is_zero()
    }

    /// Сброс полей перед новой раздачей. AFK-игрок остаётся сфолженным,
    /// пока не вернётся.
    pub fn reset_for_hand(&mut self) {
        self.bet = Chips::ZERO;
        self.last_bet = Chips::ZERO;
        self.cards.clear();
        self.dealer = false;
        self.small_blind = false;
        self.big_blind = false;
        self.folded = matches!(self.last_action, Some(Action::Afk));
        if !matches!(self.last_action, Some(Action::Afk)) {
            self.last_action = None;
        }
    }

    /// Убрать игрока с места (ушёл до старта или выкинут).
    pub fn unseat(&mut self) {
        self.active = false;
        self.seat_id = UNSEATED;
        self.bet = Chips::ZERO;
    }
}
