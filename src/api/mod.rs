//! Граница транспорта.
//!
//! Сам транспорт (сокеты, сериализация) живёт снаружи; здесь только
//! словарь событий в обе стороны, DTO для фронта и трейт
//! `RoomNotifier`, через который ядро публикует события.

pub mod dto;
pub mod events;
pub mod notifier;

pub use dto::*;
pub use events::*;
pub use notifier::*;
