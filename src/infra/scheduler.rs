//! Планировщик стартов турниров: один колбэк в заданный wall-clock
//! момент. Сам колбэк — это сообщение в очередь комнаты, планировщик
//! состояние столов не трогает.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Текущее unix-время в секундах.
pub fn now_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Внешний планировщик.
pub trait StartScheduler: Send + Sync {
    /// Выполнить `callback` не раньше `at_ts` (unix-секунды).
    fn schedule(&self, at_ts: u64, callback: Box<dyn FnOnce() + Send>);
}

/// Реализация на tokio-таймере.
#[derive(Debug, Default)]
pub struct TokioScheduler;

impl StartScheduler for TokioScheduler {
    fn schedule(&self, at_ts: u64, callback: Box<dyn FnOnce() + Send>) {
        let delay = Duration::from_secs(at_ts.saturating_sub(now_ts()));
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            callback();
        });
    }
}
