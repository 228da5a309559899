//! Ядро покерной комнаты: параллельные кэш-столы и турниры на
//! реальные деньги.
//!
//! Крейт отвечает за точную финансовую машину состояний одной
//! раздачи и комнаты в целом: порядок ходов, легальность ставок,
//! сайд-поты, расчёт вскрытия, эскалацию блайндов и балансировку
//! турнирных столов. Транспорт, постоянное хранилище, оценщик рук,
//! планировщик и сервис денежных расчётов — внешние коллабораторы
//! за трейтами (`api::RoomNotifier`, `infra::GameStore`,
//! `eval::HandEvaluator`, `infra::StartScheduler`,
//! `infra::Settlement`).

pub mod api;
pub mod domain;
pub mod engine;
pub mod eval;
pub mod infra;
pub mod runtime;
pub mod tournament;
