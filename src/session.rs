//! Session controller
//!
//! Owns the current world snapshot and the tick scheduler. Hosts call the
//! input surface (`set_viewport`, `start`, `pause`, `resume`, `terminate`,
//! `move_player`) from any thread and read snapshots via `snapshot()` or a
//! `subscribe()` channel.
//!
//! All mutable state sits behind one lock. Every scheduler run carries an
//! epoch; cancelling bumps the epoch under the lock and joins the thread after
//! the lock is released, so once `pause`/`terminate`/`start` return no stale
//! tick can touch the world.

use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded, select};
use parking_lot::Mutex;

use crate::highscores::ScoreStore;
use crate::platform::LifecycleEvent;
use crate::settings::Settings;
use crate::sim::{RandomSource, SeededRng, Viewport, World, advance};

/// Snapshots a subscriber may have queued before it is disconnected
pub const SUBSCRIBER_BUFFER: usize = 256;

/// Controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Never started, or terminated
    Idle,
    Running,
    Paused,
    GameOver,
}

/// Published view of the session
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Bumped on every publish
    pub version: u64,
    pub phase: SessionPhase,
    pub world: Arc<World>,
}

impl Snapshot {
    pub fn is_running(&self) -> bool {
        self.phase == SessionPhase::Running
    }

    pub fn is_paused(&self) -> bool {
        self.phase == SessionPhase::Paused
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == SessionPhase::GameOver
    }
}

/// Handle to a running scheduler thread
struct Scheduler {
    stop: Sender<()>,
    handle: JoinHandle<()>,
}

impl Scheduler {
    /// Stop the thread and wait for it, unless we are that thread
    fn shutdown(self) {
        let _ = self.stop.try_send(());
        if self.handle.thread().id() != thread::current().id() && self.handle.join().is_err() {
            log::error!("Tick scheduler panicked");
        }
    }
}

/// Result of one tick
enum TickOutcome {
    Continue,
    /// The game ended; the scheduler handle must be shut down outside the lock
    Finished(Option<Scheduler>),
}

struct Inner {
    world: Arc<World>,
    version: u64,
    phase: SessionPhase,
    viewport: Viewport,
    has_started: bool,
    /// One-shot guard for the game-over ledger write
    score_saved: bool,
    rng: Box<dyn RandomSource + Send>,
    epoch: u64,
    scheduler: Option<Scheduler>,
    subscribers: Vec<Sender<Snapshot>>,
}

impl Inner {
    fn snapshot(&self) -> Snapshot {
        Snapshot {
            version: self.version,
            phase: self.phase,
            world: Arc::clone(&self.world),
        }
    }

    /// Fan the current snapshot out. Subscribers that hung up or fell a
    /// full buffer behind are dropped.
    fn publish(&mut self) {
        self.version += 1;
        let snapshot = self.snapshot();
        self.subscribers
            .retain(|tx| match tx.try_send(snapshot.clone()) {
                Ok(()) => true,
                Err(TrySendError::Full(_)) => {
                    log::warn!("Dropping subscriber {} snapshots behind", SUBSCRIBER_BUFFER);
                    false
                }
                Err(TrySendError::Disconnected(_)) => false,
            });
    }

    /// Invalidate the current scheduler run and hand back its handle
    fn cancel_scheduler(&mut self) -> Option<Scheduler> {
        self.epoch += 1;
        self.scheduler.take()
    }

    fn update_world(&mut self, f: impl FnOnce(&mut World)) {
        let mut world = (*self.world).clone();
        f(&mut world);
        self.world = Arc::new(world);
    }
}

struct Shared {
    inner: Mutex<Inner>,
    ledger: Arc<dyn ScoreStore>,
    tick_interval: Duration,
}

impl Shared {
    fn spawn_scheduler(self: &Arc<Self>, epoch: u64) -> Option<Scheduler> {
        let (stop, stop_rx) = bounded::<()>(1);
        let weak = Arc::downgrade(self);
        let interval = self.tick_interval;

        let spawned = thread::Builder::new()
            .name("tick-scheduler".into())
            .spawn(move || run_scheduler(weak, epoch, interval, stop_rx));

        match spawned {
            Ok(handle) => Some(Scheduler { stop, handle }),
            Err(e) => {
                log::error!("Failed to spawn tick scheduler: {}", e);
                None
            }
        }
    }

    /// One tick from the scheduler run tagged `epoch`.
    /// Returns false once that run should stop.
    fn scheduled_step(&self, epoch: u64) -> bool {
        let outcome = {
            let mut inner = self.inner.lock();
            if inner.epoch != epoch {
                return false;
            }
            self.tick_locked(&mut inner)
        };
        match outcome {
            TickOutcome::Continue => true,
            TickOutcome::Finished(scheduler) => {
                if let Some(scheduler) = scheduler {
                    scheduler.shutdown();
                }
                false
            }
        }
    }

    fn tick_locked(&self, inner: &mut Inner) -> TickOutcome {
        if inner.phase != SessionPhase::Running {
            return TickOutcome::Continue;
        }

        let next = advance(&inner.world, inner.viewport, inner.rng.as_mut());
        let game_over = next.game_over;
        inner.world = Arc::new(next);

        if !game_over {
            inner.publish();
            return TickOutcome::Continue;
        }

        let (score, wave) = (inner.world.score, inner.world.wave);
        log::info!("Game over: score {} on wave {}", score, wave);
        if !inner.score_saved {
            inner.score_saved = true;
            self.save_score(score, wave);
        }
        inner.phase = SessionPhase::GameOver;
        let scheduler = inner.cancel_scheduler();
        inner.publish();
        TickOutcome::Finished(scheduler)
    }

    /// Ledger failures are logged, never fed back into the simulation
    fn save_score(&self, score: u32, wave: u32) {
        match self.ledger.save(score, wave) {
            Ok(Some(rank)) => log::info!("New high score, rank {}", rank),
            Ok(None) => {}
            Err(e) => log::warn!("Failed to save score {}: {}", score, e),
        }
    }

    fn step(&self) {
        let outcome = {
            let mut inner = self.inner.lock();
            self.tick_locked(&mut inner)
        };
        if let TickOutcome::Finished(Some(scheduler)) = outcome {
            scheduler.shutdown();
        }
    }

    fn start(self: &Arc<Self>) {
        let previous = {
            let mut inner = self.inner.lock();
            if !inner.viewport.is_valid() {
                log::debug!("start() ignored: viewport not set");
                return;
            }
            let previous = inner.cancel_scheduler();
            inner.world = Arc::new(World::new(inner.viewport));
            inner.phase = SessionPhase::Running;
            inner.has_started = true;
            inner.score_saved = false;
            inner.publish();
            inner.scheduler = self.spawn_scheduler(inner.epoch);
            previous
        };
        if let Some(previous) = previous {
            previous.shutdown();
        }
        log::info!("Session started");
    }

    fn pause(&self) {
        let stopped = {
            let mut inner = self.inner.lock();
            if inner.phase != SessionPhase::Running {
                log::debug!("pause() ignored in {:?}", inner.phase);
                return;
            }
            let stopped = inner.cancel_scheduler();
            inner.phase = SessionPhase::Paused;
            inner.update_world(|w| w.paused = true);
            inner.publish();
            stopped
        };
        if let Some(scheduler) = stopped {
            scheduler.shutdown();
        }
        log::info!("Session paused");
    }

    fn resume(self: &Arc<Self>) {
        let mut inner = self.inner.lock();
        if inner.phase != SessionPhase::Paused {
            log::debug!("resume() ignored in {:?}", inner.phase);
            return;
        }
        inner.phase = SessionPhase::Running;
        inner.update_world(|w| w.paused = false);
        inner.publish();
        inner.scheduler = self.spawn_scheduler(inner.epoch);
        log::info!("Session resumed");
    }

    fn terminate(&self) {
        let stopped = {
            let mut inner = self.inner.lock();
            if inner.phase == SessionPhase::Idle {
                return;
            }
            let stopped = inner.cancel_scheduler();
            inner.phase = SessionPhase::Idle;
            inner.update_world(|w| {
                w.running = false;
                w.paused = false;
            });
            inner.publish();
            stopped
        };
        if let Some(scheduler) = stopped {
            scheduler.shutdown();
        }
        log::info!("Session terminated");
    }

    fn handle_lifecycle(self: &Arc<Self>, event: LifecycleEvent) {
        match event {
            LifecycleEvent::Backgrounded => self.pause(),
            LifecycleEvent::Foregrounded => self.resume(),
        }
    }

    fn shutdown(&self) {
        let stopped = self.inner.lock().cancel_scheduler();
        if let Some(scheduler) = stopped {
            scheduler.shutdown();
        }
    }
}

fn run_scheduler(weak: Weak<Shared>, epoch: u64, interval: Duration, stop: Receiver<()>) {
    let ticker = crossbeam_channel::tick(interval);
    loop {
        select! {
            recv(stop) -> _ => break,
            recv(ticker) -> _ => {
                let Some(shared) = weak.upgrade() else { break };
                if !shared.scheduled_step(epoch) {
                    break;
                }
            }
        }
    }
    log::debug!("Tick scheduler {} stopped", epoch);
}

/// A game session: one world, one scheduler, one score ledger
pub struct Session {
    shared: Arc<Shared>,
}

impl Session {
    /// Session with a seeded (or entropy-seeded) random source
    pub fn new(settings: &Settings, ledger: Arc<dyn ScoreStore>) -> Self {
        let rng = match settings.seed {
            Some(seed) => SeededRng::new(seed),
            None => SeededRng::from_entropy(),
        };
        Self::with_random_source(settings, ledger, Box::new(rng))
    }

    /// Session with an injected random source
    pub fn with_random_source(
        settings: &Settings,
        ledger: Arc<dyn ScoreStore>,
        rng: Box<dyn RandomSource + Send>,
    ) -> Self {
        let inner = Inner {
            world: Arc::new(World::default()),
            version: 0,
            phase: SessionPhase::Idle,
            viewport: Viewport::default(),
            has_started: false,
            score_saved: false,
            rng,
            epoch: 0,
            scheduler: None,
            subscribers: Vec::new(),
        };
        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(inner),
                ledger,
                tick_interval: settings.tick_interval(),
            }),
        }
    }

    /// Record the viewport. Non-positive dimensions are ignored.
    pub fn set_viewport(&self, width: f32, height: f32) {
        let viewport = Viewport::new(width, height);
        if !viewport.is_valid() {
            log::debug!("Ignoring viewport {}x{}", width, height);
            return;
        }
        self.shared.inner.lock().viewport = viewport;
    }

    pub fn viewport(&self) -> Viewport {
        self.shared.inner.lock().viewport
    }

    /// Fresh world and scheduler. Legal from any state once a viewport is set.
    pub fn start(&self) {
        self.shared.start();
    }

    /// Stop ticking. Idempotent.
    pub fn pause(&self) {
        self.shared.pause();
    }

    /// Continue a paused session
    pub fn resume(&self) {
        self.shared.resume();
    }

    /// Stop the session and return to idle (host leaving the game screen)
    pub fn terminate(&self) {
        self.shared.terminate();
    }

    /// Move the player to `x`, clamped to the viewport. Dropped unless running.
    pub fn move_player(&self, x: f32) {
        let mut inner = self.shared.inner.lock();
        if inner.phase != SessionPhase::Running {
            log::debug!("move_player() ignored in {:?}", inner.phase);
            return;
        }
        let viewport = inner.viewport;
        inner.world = Arc::new(inner.world.with_player_x(x, viewport));
        inner.publish();
    }

    /// Run one tick now. The scheduler calls the same path every interval;
    /// hosts with their own clock may call this directly.
    pub fn step(&self) {
        self.shared.step();
    }

    pub fn snapshot(&self) -> Snapshot {
        self.shared.inner.lock().snapshot()
    }

    /// Stream of published snapshots, starting with the current one.
    /// A receiver that falls `SUBSCRIBER_BUFFER` snapshots behind is cut off.
    pub fn subscribe(&self) -> Receiver<Snapshot> {
        let (tx, rx) = bounded(SUBSCRIBER_BUFFER);
        let mut inner = self.shared.inner.lock();
        // The receiver is alive, so this cannot fail
        let _ = tx.send(inner.snapshot());
        inner.subscribers.push(tx);
        rx
    }

    pub fn has_started(&self) -> bool {
        self.shared.inner.lock().has_started
    }

    pub fn handle_lifecycle(&self, event: LifecycleEvent) {
        self.shared.handle_lifecycle(event);
    }

    /// Apply host lifecycle events on a background thread until the
    /// channel closes or the session is dropped
    pub fn follow_lifecycle(
        &self,
        events: Receiver<LifecycleEvent>,
    ) -> std::io::Result<JoinHandle<()>> {
        let weak = Arc::downgrade(&self.shared);
        thread::Builder::new()
            .name("lifecycle".into())
            .spawn(move || {
                for event in events {
                    let Some(shared) = weak.upgrade() else { break };
                    shared.handle_lifecycle(event);
                }
            })
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.shared.shutdown();
    }
}
