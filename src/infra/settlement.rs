//! Внешний сервис денежных расчётов (эскроу бай-инов, выплаты).
//!
//! Вызовы асинхронные и могут падать; ядро никогда не ждёт их на
//! критическом пути стола. Ретрай — ограниченный, с экспоненциальной
//! паузой и идемпотентным ключом на попытку: упавшая выплата не
//! превращается в бесконечную рекурсию и не дублирует перевод на
//! стороне сервиса, который умеет ключи.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::domain::tournament::TournamentWinner;
use crate::domain::{Chips, GameId, PlayerId};

#[derive(Debug, Error)]
pub enum SettlementError {
    #[error("settlement call failed: {0}")]
    CallFailed(String),
}

/// Запрос на выплату (для журналирования и ключей идемпотентности).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum SettlementRequest {
    /// Выплата победителю кэш-стола.
    Payout {
        game_id: GameId,
        winner: PlayerId,
        amount: Chips,
        leave_vault: Chips,
    },
    /// Возврат бай-ина ушедшему до старта.
    RefundOnLeave { game_id: GameId, player: PlayerId },
    /// Распределение призового фонда турнира по местам.
    TournamentPayout {
        tournament_id: u64,
        winners: Vec<TournamentWinner>,
    },
}

impl SettlementRequest {
    /// Идемпотентный ключ запроса: один и тот же запрос — один ключ.
    pub fn idempotency_key(&self) -> String {
        match self {
            SettlementRequest::Payout {
                game_id, winner, ..
            } => format!("payout:{game_id}:{winner}"),
            SettlementRequest::RefundOnLeave { game_id, player } => {
                format!("refund:{game_id}:{player}")
            }
            SettlementRequest::TournamentPayout { tournament_id, .. } => {
                format!("tournament:{tournament_id}")
            }
        }
    }
}

/// Внешний расчётный сервис.
#[async_trait]
pub trait Settlement: Send + Sync {
    async fn submit(
        &self,
        request: &SettlementRequest,
        idempotency_key: &str,
    ) -> Result<(), SettlementError>;
}

/// Политика ретрая: ограниченное число попыток с экспоненциальной
/// паузой.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(1u32 << attempt.min(16))
    }
}

/// Отправить запрос вне критического пути стола: fire-and-forget с
/// ретраем по политике. Ключ идемпотентности дополняется номером
/// попытки только в журнале — сервису всегда уходит один и тот же.
pub fn submit_with_retry(
    settlement: Arc<dyn Settlement>,
    policy: RetryPolicy,
    request: SettlementRequest,
) {
    tokio::spawn(async move {
        let key = request.idempotency_key();
        for attempt in 0..policy.max_attempts {
            match settlement.submit(&request, &key).await {
                Ok(()) => {
                    info!(key, attempt, "settlement submitted");
                    return;
                }
                Err(err) => {
                    warn!(key, attempt, %err, "settlement attempt failed");
                    tokio::time::sleep(policy.delay_for(attempt)).await;
                }
            }
        }
        error!(key, "settlement gave up after {} attempts", policy.max_attempts);
    });
}

/// Заглушка: только журналирует запросы. Используется в dev CLI и
/// тестах.
#[derive(Debug, Default)]
pub struct LoggingSettlement;

#[async_trait]
impl Settlement for LoggingSettlement {
    async fn submit(
        &self,
        request: &SettlementRequest,
        idempotency_key: &str,
    ) -> Result<(), SettlementError> {
        info!(key = idempotency_key, ?request, "settlement request");
        Ok(())
    }
}
