use crate::domain::GameId;
use crate::engine::RandomSource;
use crate::infra::rng_seed::RngSeed;

/// Системный RNG поверх thread_rng.
#[derive(Clone, Debug, Default)]
pub struct SystemRng;

impl RandomSource for SystemRng {
    fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        use rand::thread_rng;

        slice.shuffle(&mut thread_rng());
    }

    fn pick(&mut self, upper: usize) -> usize {
        use rand::Rng;

        if upper == 0 {
            return 0;
        }
        rand::thread_rng().gen_range(0..upper)
    }
}

/// Детерминированный RNG для тестов и реплея: одинаковый seed —
/// одинаковые колоды и выбор дилера.
#[derive(Clone, Debug)]
pub struct DeterministicRng {
    inner: rand::rngs::StdRng,
}

impl DeterministicRng {
    pub fn from_seed_u64(seed: u64) -> Self {
        use rand::SeedableRng;
        Self {
            inner: rand::rngs::StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_seed_bytes(seed: [u8; 32]) -> Self {
        use rand::SeedableRng;
        Self {
            inner: rand::rngs::StdRng::from_seed(seed),
        }
    }
}

impl RandomSource for DeterministicRng {
    fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.inner);
    }

    fn pick(&mut self, upper: usize) -> usize {
        use rand::Rng;

        if upper == 0 {
            return 0;
        }
        self.inner.gen_range(0..upper)
    }
}

/// RNG стола: системный по умолчанию, либо детерминированный от
/// базового seed'а — тогда seed каждой раздачи выводится заново и
/// колоды воспроизводимы.
#[derive(Clone, Debug)]
pub enum TableRng {
    System(SystemRng),
    Seeded {
        base: RngSeed,
        current: DeterministicRng,
    },
}

impl TableRng {
    pub fn system() -> Self {
        TableRng::System(SystemRng)
    }

    pub fn seeded(base: RngSeed) -> Self {
        let current = base.to_rng();
        TableRng::Seeded { base, current }
    }

    /// Перед каждой раздачей: вывести seed раздачи из базового.
    pub fn reseed_for_hand(&mut self, game_id: GameId, hand: u64) {
        if let TableRng::Seeded { base, current } = self {
            *current = base.derive(game_id, hand).to_rng();
        }
    }
}

impl RandomSource for TableRng {
    fn shuffle<T>(&mut self, slice: &mut [T]) {
        match self {
            TableRng::System(rng) => rng.shuffle(slice),
            TableRng::Seeded { current, .. } => current.shuffle(slice),
        }
    }

    fn pick(&mut self, upper: usize) -> usize {
        match self {
            TableRng::System(rng) => rng.pick(upper),
            TableRng::Seeded { current, .. } => current.pick(upper),
        }
    }
}
