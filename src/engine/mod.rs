//! Движок раздачи: касса банков, правила действий, порядок ходов,
//! жизненный цикл раздачи и расчёт вскрытия.
//!
//! Основные операции:
//!   - `start_hand` / `start_game` — запустить раздачу / игру;
//!   - `apply_action` — применить действие игрока (нелегальное — no-op);
//!   - `leave_player` — уход игрока;
//!   - `resolve_showdown` — расчёт (обычно зовётся изнутри движка).

pub mod actions;
pub mod errors;
pub mod game_loop;
pub mod hand_history;
pub mod positions;
pub mod pot;
pub mod showdown;
pub mod validation;

pub use actions::{Action, ActionKind, PlayerAction};
pub use errors::EngineError;
pub use game_loop::{
    apply_action, leave_player, start_game, start_hand, ActionOutcome, TurnFlow,
};
pub use hand_history::{ActionHistory, ActionRecord};
pub use pot::{pots_total, settle_contribution, Pot};
pub use showdown::{CashPayout, HandOutcome};
pub use validation::{allowed_actions, AllowedActions};

/// Источник случайности движка. Реализации — в `infra`.
pub trait RandomSource {
    fn shuffle<T>(&mut self, slice: &mut [T]);

    /// Равновероятный индекс в диапазоне `0..upper` (upper > 0).
    fn pick(&mut self, upper: usize) -> usize;
}
