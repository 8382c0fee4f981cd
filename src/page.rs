use crate::clock::Clock;
use crate::cycle::{CycleStatus, CycleTracker, TickOutcome};
use crate::display::{DisplaySlots, RenderTarget};
use crate::effects::ParticleSpawner;
use crate::models::DisplaySnapshot;
use crate::storage::KeyValueStore;
use rand::Rng;

/// One page session: the tracker, the slots it paints and the particle layer.
pub struct Page<S, C, R> {
    tracker: CycleTracker<S, C>,
    display: DisplaySlots,
    spawner: ParticleSpawner<R>,
}

impl<S: KeyValueStore, C: Clock, R: Rng> Page<S, C, R> {
    pub fn new(tracker: CycleTracker<S, C>, spawner: ParticleSpawner<R>) -> Self {
        Self {
            tracker,
            display: DisplaySlots::new(),
            spawner,
        }
    }

    pub fn load(&mut self) -> TickOutcome {
        self.tracker.initialize(&mut self.display)
    }

    pub fn tick(&mut self) -> TickOutcome {
        self.tracker.tick(&mut self.display)
    }

    pub fn cycle_status(&mut self) -> CycleStatus {
        self.tracker.status()
    }

    /// Adds one particle and returns its id for later removal.
    pub fn spawn_particle(&mut self) -> u64 {
        let particle = self.spawner.spawn();
        let id = particle.id;
        self.display.append_particle(particle);
        id
    }

    pub fn expire_particle(&mut self, id: u64) {
        self.display.remove_particle(id);
    }

    pub fn end_celebration(&mut self) {
        self.display.set_celebration_active(false);
    }

    pub fn display(&self) -> &DisplaySlots {
        &self.display
    }

    pub fn snapshot(&self) -> DisplaySnapshot {
        self.display.snapshot()
    }
}
