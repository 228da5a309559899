use serde::{Deserialize, Serialize};

use crate::domain::card::Card;
use crate::domain::chips::Chips;
use crate::domain::PlayerId;

/// Улица раздачи.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Street {
    Preflop,
    Flop,
    Turn,
    River,
}

impl Street {
    /// Сколько общих карт открыто на этой улице.
    pub fn revealed_cards(self) -> usize {
        match self {
            Street::Preflop => 0,
            Street::Flop => 3,
            Street::Turn => 4,
            Street::River => 5,
        }
    }

    /// Следующая улица. None для ривера — дальше только шоудаун.
    pub fn next(self) -> Option<Street> {
        match self {
            Street::Preflop => Some(Street::Flop),
            Street::Flop => Some(Street::Turn),
            Street::Turn => Some(Street::River),
            Street::River => None,
        }
    }
}

/// Фаза жизненного цикла раздачи.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum HandPhase {
    /// За столом ещё нет двух игроков с фишками — раздача не стартует.
    AwaitingPlayers,
    /// Колода тасуется, блайнды и карты раздаются.
    Dealing,
    /// Идёт торговля на одной из улиц.
    Betting(Street),
    /// Вскрытие и распределение банков.
    Showdown,
    /// Раздача рассчитана, стол ждёт следующую.
    Settled,
}

/// Победитель (или проигравший с описанием руки) одной раздачи.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HandWinner {
    pub player_id: PlayerId,
    /// Суммарный приз по всем банкам. Для проигравших — ZERO.
    pub prize: Chips,
    /// Текст силы руки для фронта ("Two Pair, ..."), пустой при
    /// бесспорной победе (все остальные сфолдили).
    pub desc: String,
    pub cards: Vec<Card>,
}
