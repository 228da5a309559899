//! Инфраструктурный слой вокруг движка:
//! - генерация ID;
//! - RNG-реализации (системный и детерминированный);
//! - абстракция хранилища (внешняя БД / тесты);
//! - внешний сервис расчётов с ограниченным ретраем;
//! - планировщик стартов турниров.

pub mod ids;
pub mod persistence;
pub mod rng;
pub mod rng_seed;
pub mod scheduler;
pub mod settlement;

pub use ids::IdGenerator;
pub use persistence::{GameStore, InMemoryStore, StoreError};
pub use rng::{DeterministicRng, SystemRng, TableRng};
pub use rng_seed::RngSeed;
pub use scheduler::{now_ts, StartScheduler, TokioScheduler};
pub use settlement::{
    submit_with_retry, LoggingSettlement, RetryPolicy, Settlement, SettlementError,
    SettlementRequest,
};
