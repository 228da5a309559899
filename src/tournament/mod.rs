//! Турнирный слой: лобби (регистрация и рассадка) и балансировка
//! столов по мере вылетов.

pub mod balancer;
pub mod lobby;

pub use balancer::{final_rankings, plan_balance, BalanceAction, GameSnapshot, PlayerBrief};
pub use lobby::{child_table_count, TournamentLobby};
