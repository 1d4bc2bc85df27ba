//! Timer-driven heartbeat for a [`Simulation`].
//!
//! The loop runs on the caller's task and holds the only mutable borrow of
//! the simulation, so state is never touched concurrently. Snapshot writes
//! are handed to the blocking pool and not awaited between ticks; at most one
//! write is in flight, and a write skipped for that reason is flushed on stop.

use crate::config::EngineConfig;
use crate::random::RandomSource;
use crate::simulation::Simulation;
use crate::snapshot::write_file;
use chrono::Utc;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Schedule of a heartbeat loop.
#[derive(Debug, Clone, PartialEq)]
pub struct HeartbeatConfig {
    pub interval: Duration,
    /// Evaluate cycle phases every N ticks
    pub cycle_every: u64,
    /// Persist a snapshot every N ticks
    pub persist_every: u64,
    /// Snapshot destination; `None` disables persistence
    pub state_path: Option<PathBuf>,
    /// Stop after this many ticks
    pub max_ticks: Option<u64>,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            cycle_every: 10,
            persist_every: 5,
            state_path: None,
            max_ticks: None,
        }
    }
}

impl From<&EngineConfig> for HeartbeatConfig {
    fn from(config: &EngineConfig) -> Self {
        Self {
            interval: config.tick_interval(),
            cycle_every: config.cycle_every.max(1),
            persist_every: config.persist_every.max(1),
            state_path: Some(config.state_path()),
            max_ticks: None,
        }
    }
}

/// Sender side stops the loop by sending `true` or by being dropped.
pub fn shutdown_channel() -> (watch::Sender<bool>, watch::Receiver<bool>) {
    watch::channel(false)
}

/// Stop the heartbeat when `signal` resolves. A failed signal leaves the
/// heartbeat running instead of dropping the sender.
pub async fn shutdown_on<F>(signal: F, shutdown: watch::Sender<bool>)
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => {
            tracing::info!("Interrupted, stopping heartbeat");
            let _ = shutdown.send(true);
        }
        Err(e) => {
            tracing::warn!("Shutdown signal unavailable: {}", e);
            shutdown.closed().await;
        }
    }
}

/// Drive `sim` until shutdown or `max_ticks`. Returns the ticks executed.
pub async fn run<R: RandomSource>(
    sim: &mut Simulation<R>,
    config: &HeartbeatConfig,
    mut shutdown: watch::Receiver<bool>,
) -> u64 {
    if *shutdown.borrow() {
        return 0;
    }

    let period = config.interval.max(Duration::from_millis(1));
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let cycle_every = config.cycle_every.max(1);
    let persist_every = config.persist_every.max(1);
    let mut ticks: u64 = 0;
    let mut pending: Option<JoinHandle<()>> = None;
    let mut unsaved = false;

    tracing::info!("Heartbeat started (interval={:?})", period);

    loop {
        if config.max_ticks.is_some_and(|max| ticks >= max) {
            break;
        }

        tokio::select! {
            _ = ticker.tick() => {}
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
                continue;
            }
        }

        sim.step(Utc::now());
        ticks += 1;

        if ticks % cycle_every == 0 {
            let outcome = sim.evaluate_cycles();
            tracing::debug!("Cycle evaluation at tick {}: momentum={:.3}", ticks, outcome.momentum);
        }

        if ticks % persist_every == 0 {
            if let Some(path) = &config.state_path {
                if pending.as_ref().is_some_and(|write| !write.is_finished()) {
                    tracing::debug!("Snapshot write still running, skipping tick {}", ticks);
                    unsaved = true;
                } else {
                    pending = persist_in_background(path.clone(), sim);
                    unsaved = false;
                }
            }
        }
    }

    if let Some(write) = pending.take() {
        let _ = write.await;
    }
    if unsaved {
        if let Some(path) = &config.state_path {
            if let Some(write) = persist_in_background(path.clone(), sim) {
                let _ = write.await;
            }
        }
    }

    tracing::info!("Heartbeat stopped after {} ticks", ticks);
    ticks
}

fn persist_in_background<R: RandomSource>(path: PathBuf, sim: &Simulation<R>) -> Option<JoinHandle<()>> {
    let content = match serde_json::to_string_pretty(&sim.snapshot()) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!("Failed to serialize snapshot: {}", e);
            return None;
        }
    };

    Some(tokio::task::spawn_blocking(move || {
        let tmp = path.with_extension("json.tmp");
        let result = write_file(&tmp, &content)
            .and_then(|()| std::fs::rename(&tmp, &path).map_err(crate::Error::from));
        if let Err(e) = result {
            tracing::warn!("Failed to persist snapshot to {}: {}", path.display(), e);
        }
    }))
}
