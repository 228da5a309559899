use serde::{Deserialize, Serialize};

use crate::api::dto::{PotView, SeatMap};
use crate::domain::hand::HandWinner;
use crate::domain::tournament::TournamentWinner;
use crate::domain::{Card, Chips, GameId, PlayerId};
use crate::engine::actions::ActionKind;
use crate::engine::validation::AllowedActions;

/// Входящее событие транспорта для конкретной игры.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct InboundEvent {
    pub player_id: PlayerId,
    pub kind: InboundKind,
}

/// Что игрок прислал. Посадка (sitOnGame / sitTournament) идёт через
/// отдельные методы комнаты — ей нужен контекст лобби, не игры.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum InboundKind {
    Call,
    Raise(Chips),
    Check,
    Fold,
    AllIn,
    Leave,
}

impl InboundKind {
    /// Действие торговли, если это оно (Leave обрабатывается отдельно).
    pub fn as_action(&self) -> Option<ActionKind> {
        match self {
            InboundKind::Call => Some(ActionKind::Call),
            InboundKind::Raise(amount) => Some(ActionKind::Raise(*amount)),
            InboundKind::Check => Some(ActionKind::Check),
            InboundKind::Fold => Some(ActionKind::Fold),
            InboundKind::AllIn => Some(ActionKind::AllIn),
            InboundKind::Leave => None,
        }
    }
}

/// Исходящее событие для клиентов.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum RoomEvent {
    /// Снимок рассадки (карты скрыты вне шоудауна).
    SeatsUpdated { seats: SeatMap, players: usize },
    /// Ход перешёл (None = раздача закончилась) + что разрешено.
    TurnChangedTo {
        player_id: Option<PlayerId>,
        allowed: Option<AllowedActions>,
    },
    PotsUpdated(Vec<PotView>),
    BetUpdated(Chips),
    CommunityCardsUpdated(Vec<Card>),
    /// Карманные карты — только адресату.
    HoleCards(Vec<Card>),
    /// Текст лучшей руки игрока — только адресату.
    BestHand(String),
    /// Победители раздачи; `game_over` = стол закрылся.
    Winners {
        winners: Vec<HandWinner>,
        game_over: bool,
    },
    /// Не выигравшие, но дошедшие до вскрытия руки (для UI).
    GameLostHands(Vec<HandWinner>),
    BlindUpdated(Chips),
    GameStarted,
    /// Список открытых игр изменился (лобби перечитает его само).
    ActiveGameUpdated,
    /// Список турниров изменился.
    ActiveTournamentUpdated,
    NotifyTournamentWinners(Vec<TournamentWinner>),
    /// Игрока пересаживают на другой стол турнира.
    ResitTournamentTable { game_id: GameId },
    /// Строка журнала стола.
    Log(String),
}
