//! Доменная модель комнаты: фишки, карты, игроки, игры (столы), турниры,
//! расписание блайндов.
//!
//! Здесь нет ни RNG, ни ввода-вывода — только данные и методы,
//! сохраняющие инварианты.

pub mod blinds;
pub mod card;
pub mod chips;
pub mod deck;
pub mod hand;
pub mod player;
pub mod table;
pub mod tournament;

// Базовые идентификаторы.
pub type PlayerId = u64;
pub type GameId = u64;
pub type TableId = u64;
pub type TournamentId = u64;
pub type HandId = u64;

/// Номер места за столом. 0 = игрок не сидит (встал / вылетел),
/// занятые места нумеруются 1..=num_seats.
pub type SeatId = u8;

/// Метка "не сидит".
pub const UNSEATED: SeatId = 0;

// Реэкспорты, чтобы в других модулях писать crate::domain::Card и т.п.
pub use blinds::*;
pub use card::*;
pub use chips::*;
pub use deck::*;
pub use hand::*;
pub use player::*;
pub use table::*;
pub use tournament::*;
