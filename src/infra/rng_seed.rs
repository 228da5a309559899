//! RngSeed — доменно-разделённый seed покерного RNG.
//!
//! Позволяет хранить базовый seed стола и детерминированно выводить
//! seed каждой раздачи:
//!     new = H(domain || old || game_id || hand)
//! Стол, сконфигурированный с seed'ом, переигрывает одни и те же
//! колоды раздача за раздачей.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::GameId;
use crate::infra::rng::DeterministicRng;

/// 32-байтовый seed для RNG.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RngSeed {
    pub bytes: [u8; 32],
}

impl RngSeed {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self { bytes }
    }

    /// Seed из u64 (удобно в тестах).
    pub fn from_u64(x: u64) -> Self {
        let mut b = [0u8; 32];
        b[..8].copy_from_slice(&x.to_le_bytes());
        Self { bytes: b }
    }

    /// Хэш-вывод seed'а раздачи из контекста (игра + номер раздачи).
    pub fn derive(&self, game_id: GameId, hand: u64) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"POKER_ROOM_RNG_V1");
        hasher.update(self.bytes);
        hasher.update(game_id.to_le_bytes());
        hasher.update(hand.to_le_bytes());

        let hash = hasher.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&hash[..32]);
        Self { bytes: out }
    }

    /// Детерминированный RNG из этого seed'а.
    pub fn to_rng(&self) -> DeterministicRng {
        DeterministicRng::from_seed_bytes(self.bytes)
    }
}
