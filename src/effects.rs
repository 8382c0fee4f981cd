use crate::config::{
    CELEBRATION_BURST, CELEBRATION_MESSAGE, CELEBRATION_STAGGER, CELEBRATION_VISIBLE_FOR,
};
use crate::models::Particle;
use rand::Rng;
use std::time::Duration;

pub const SYMBOLS: [&str; 12] = [
    "🌱", "🌿", "🌳", "💧", "🌸", "🍃", "🌺", "🌻", "🪴", "🌾", "🌷", "🌼",
];

/// Makes decorative particles with random symbol, placement and speed.
#[derive(Debug)]
pub struct ParticleSpawner<R> {
    rng: R,
    next_id: u64,
}

impl<R: Rng> ParticleSpawner<R> {
    pub fn new(rng: R) -> Self {
        Self { rng, next_id: 1 }
    }

    pub fn spawn(&mut self) -> Particle {
        let id = self.next_id;
        self.next_id += 1;
        Particle {
            id,
            symbol: SYMBOLS[self.rng.gen_range(0..SYMBOLS.len())],
            left_percent: self.rng.gen_range(10.0..90.0),
            duration_secs: self.rng.gen_range(2.0..5.0),
        }
    }
}

/// Follow-up work after a reset has switched the banner on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CelebrationPlan {
    pub message: &'static str,
    pub visible_for: Duration,
    pub burst: u32,
    pub stagger: Duration,
}

impl Default for CelebrationPlan {
    fn default() -> Self {
        Self {
            message: CELEBRATION_MESSAGE,
            visible_for: CELEBRATION_VISIBLE_FOR,
            burst: CELEBRATION_BURST,
            stagger: CELEBRATION_STAGGER,
        }
    }
}

impl CelebrationPlan {
    /// Delay before each burst spawn, measured from the reset.
    pub fn spawn_offsets(&self) -> impl Iterator<Item = Duration> + '_ {
        (0..self.burst).map(|i| self.stagger * i)
    }
}
