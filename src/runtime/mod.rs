//! Рантайм комнаты.
//!
//! Каждая игра — независимый актор: одна tokio-задача владеет `Game`
//! и обрабатывает свою очередь сообщений строго последовательно.
//! Действия игроков, таймауты хода, авто-старт, пересадки и стартовые
//! сигналы турниров — всё сообщения; никакой обработчик не трогает
//! состояние чужой игры. Очереди разных игр работают параллельно.

pub mod actor;
pub mod router;

pub use actor::{GameActor, GameDeps, GameHandle, GameMessage, RoomConfig, RoomSignal};
pub use router::{CashTableConfig, Room};
