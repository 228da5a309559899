//! Граница внешнего оценщика рук.
//!
//! Ядро не ранжирует руки само: оно отдаёт оценщику семь карт
//! (2 карманные + 5 общих) и получает сравнимую силу с текстовым
//! описанием. Продакшен-оценщик реализует трейт снаружи; здесь живёт
//! только заведомо простая реализация для dev CLI и тестов.

use serde::{Deserialize, Serialize};

use crate::domain::Card;

/// Сила руки: чем больше `score`, тем сильнее. Равные `score` — сплит.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HandStrength {
    pub score: u64,
    /// Человекочитаемое описание ("Two Pair, Kings and Tens").
    pub desc: String,
}

/// Внешний оценщик.
pub trait HandEvaluator: Send + Sync {
    /// Оценить лучшую 5-карточную руку из предложенных карт.
    fn rank(&self, cards: &[Card]) -> HandStrength;

    /// Индексы рук, делящих лучшую силу.
    fn winners(&self, ranked: &[HandStrength]) -> Vec<usize> {
        let best = match ranked.iter().map(|h| h.score).max() {
            Some(b) => b,
            None => return Vec::new(),
        };
        ranked
            .iter()
            .enumerate()
            .filter(|(_, h)| h.score == best)
            .map(|(i, _)| i)
            .collect()
    }
}

/// Примитивный оценщик: сила = пять старших карт.
///
/// Не знает пар и стритов — годится только чтобы гонять движок в
/// dev CLI и тестах, где важны делёж банков и порядок ходов, а не
/// покерная сила как таковая.
#[derive(Debug, Default)]
pub struct HighCardEvaluator;

impl HandEvaluator for HighCardEvaluator {
    fn rank(&self, cards: &[Card]) -> HandStrength {
        let mut values: Vec<u64> = cards.iter().map(|c| c.rank.value() as u64).collect();
        values.sort_unstable_by(|a, b| b.cmp(a));
        values.truncate(5);

        let score = values.iter().fold(0u64, |acc, v| acc * 16 + v);
        let top = cards
            .iter()
            .max_by_key(|c| c.rank.value())
            .map(|c| c.rank.to_string())
            .unwrap_or_default();

        HandStrength {
            score,
            desc: format!("High Card, {top}"),
        }
    }
}
