use serde::{Deserialize, Serialize};

use crate::domain::{Chips, PlayerId};

/// Метка действия — то, что хранится в истории и на игроке
/// (`last_action`).
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Action {
    Call,
    Raise,
    Check,
    Fold,
    AllIn,
    Leave,
    /// Игрок перестал отвечать: авто-фолд каждой раздачи до возвращения.
    Afk,
}

/// Действие игрока в торговле с параметрами.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum ActionKind {
    Call,
    /// Рейз на указанную сумму (доплата этой улицы, не целевой бет).
    Raise(Chips),
    Check,
    Fold,
    AllIn,
}

impl ActionKind {
    pub fn label(&self) -> Action {
        match self {
            ActionKind::Call => Action::Call,
            ActionKind::Raise(_) => Action::Raise,
            ActionKind::Check => Action::Check,
            ActionKind::Fold => Action::Fold,
            ActionKind::AllIn => Action::AllIn,
        }
    }
}

/// Конкретное действие конкретного игрока.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerAction {
    pub player_id: PlayerId,
    pub kind: ActionKind,
}
