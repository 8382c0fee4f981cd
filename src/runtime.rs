//! Timers driving a page session. All of them run for the life of the process.

use crate::clock::Clock;
use crate::config::{KEEPALIVE_INTERVAL, PARTICLE_LIFETIME, SPAWN_INTERVAL, TICK_INTERVAL};
use crate::cycle::TickOutcome;
use crate::effects::CelebrationPlan;
use crate::keep_awake::{KeepAwake, SilentAudio, WakeLock};
use crate::page::Page;
use crate::storage::KeyValueStore;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::{JoinError, JoinHandle};
use tracing::error;
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};

pub type SharedPage<S, C, R> = Arc<Mutex<Page<S, C, R>>>;

fn every(period: Duration) -> tokio::time::Interval {
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

async fn spawn_and_expire<S, C, R>(page: SharedPage<S, C, R>)
where
    S: KeyValueStore,
    C: Clock,
    R: Rng,
{
    let id = page.lock().await.spawn_particle();
    sleep(PARTICLE_LIFETIME).await;
    page.lock().await.expire_particle(id);
}

/// Runs `f` on the blocking pool with the page locked. Anything that reads or
/// writes the store goes through here so file I/O stays off the event loop.
pub async fn with_page_blocking<S, C, R, T, F>(
    page: &SharedPage<S, C, R>,
    f: F,
) -> Result<T, JoinError>
where
    S: KeyValueStore + Send + 'static,
    C: Clock + Send + 'static,
    R: Rng + Send + 'static,
    T: Send + 'static,
    F: FnOnce(&mut Page<S, C, R>) -> T + Send + 'static,
{
    let mut page = Arc::clone(page).lock_owned().await;
    tokio::task::spawn_blocking(move || f(&mut page)).await
}

/// Schedules the burst and the banner timeout after a reset.
pub fn celebrate<S, C, R>(page: &SharedPage<S, C, R>, plan: &CelebrationPlan)
where
    S: KeyValueStore + Send + 'static,
    C: Clock + Send + 'static,
    R: Rng + Send + 'static,
{
    for offset in plan.spawn_offsets() {
        let page = Arc::clone(page);
        tokio::spawn(async move {
            sleep(offset).await;
            spawn_and_expire(page).await;
        });
    }

    let page = Arc::clone(page);
    let visible_for = plan.visible_for;
    tokio::spawn(async move {
        sleep(visible_for).await;
        page.lock().await.end_celebration();
    });
}

pub fn handle_outcome<S, C, R>(page: &SharedPage<S, C, R>, outcome: &TickOutcome)
where
    S: KeyValueStore + Send + 'static,
    C: Clock + Send + 'static,
    R: Rng + Send + 'static,
{
    if let TickOutcome::Reset { celebration, .. } = outcome {
        celebrate(page, celebration);
    }
}

/// Re-reads the store every minute. The first paint happens in `Page::load`.
pub fn spawn_render_loop<S, C, R>(page: SharedPage<S, C, R>) -> JoinHandle<()>
where
    S: KeyValueStore + Send + 'static,
    C: Clock + Send + 'static,
    R: Rng + Send + 'static,
{
    tokio::spawn(async move {
        let mut ticks = every(TICK_INTERVAL);
        loop {
            ticks.tick().await;
            match with_page_blocking(&page, |page| page.tick()).await {
                Ok(outcome) => handle_outcome(&page, &outcome),
                Err(err) => error!("render tick failed: {err}"),
            }
        }
    })
}

pub fn spawn_particle_loop<S, C, R>(page: SharedPage<S, C, R>) -> JoinHandle<()>
where
    S: KeyValueStore + Send + 'static,
    C: Clock + Send + 'static,
    R: Rng + Send + 'static,
{
    tokio::spawn(async move {
        let mut ticks = every(SPAWN_INTERVAL);
        loop {
            ticks.tick().await;
            tokio::spawn(spawn_and_expire(Arc::clone(&page)));
        }
    })
}

/// Initial acquisition followed by the 30 second health check.
pub fn spawn_keep_awake<L, A>(keep_awake: Arc<Mutex<KeepAwake<L, A>>>) -> JoinHandle<()>
where
    L: WakeLock + Send + 'static,
    A: SilentAudio + Send + 'static,
{
    tokio::spawn(async move {
        keep_awake.lock().await.acquire().await;
        let mut ticks = every(KEEPALIVE_INTERVAL);
        loop {
            ticks.tick().await;
            keep_awake.lock().await.keep_alive().await;
        }
    })
}
