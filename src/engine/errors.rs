use crate::domain::{GameId, PlayerId};

use thiserror::Error;

/// Ошибки движка.
///
/// ВАЖНО: нелегальное действие игрока — НЕ ошибка, а тихий no-op
/// (`ActionOutcome::Ignored`). Сюда попадают только нарушения
/// протокола вызова: неизвестный игрок, раздача не идёт и т.п.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Игра {0} не найдена")]
    GameNotFound(GameId),

    #[error("Игрок {0} не найден за столом")]
    PlayerNotAtTable(PlayerId),

    #[error("Недостаточно активных игроков для раздачи")]
    NotEnoughPlayers,

    #[error("Раздача уже идёт")]
    HandAlreadyInProgress,

    #[error("Раздача не активна")]
    NoActiveHand,

    #[error("Стол уже закрыт")]
    GameEnded,

    #[error("Не удалось выбрать дилера")]
    NoDealer,

    #[error("Внутренняя ошибка: {0}")]
    Internal(&'static str),
}
