//! Sharing one engine between command handlers and the tick driver.
//!
//! Every operation locks the whole engine for its duration. Nothing inside
//! the engine blocks, so a single coarse lock is all the coordination needed.
//! A handler that panicked while holding the lock does not stop the arena:
//! the poisoned guard is recovered and play continues.
//!
//! Delivery always happens after the lock is released, so a slow
//! [`Outbox`] cannot stall the simulation for other callers.

use std::any::Any;
use std::fmt;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, error, trace};

use crate::command::Command;
use crate::constants::TICK_RATE;
use crate::engine::Engine;
use crate::entity::PlayerId;
use crate::output::{GameEvent, Outbound, OutboundMessage};
use crate::snapshot::PlayerView;

// =============================================================================
// SharedEngine
// =============================================================================

/// Cloneable handle to one engine behind a mutex.
#[derive(Clone)]
pub struct SharedEngine {
    inner: Arc<Mutex<Engine>>,
}

impl fmt::Debug for SharedEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SharedEngine").field(&*self.lock()).finish()
    }
}

impl SharedEngine {
    /// Wraps an engine for shared use.
    #[must_use]
    pub fn new(engine: Engine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Engine> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `f` with exclusive access to the engine.
    pub fn with<R>(&self, f: impl FnOnce(&mut Engine) -> R) -> R {
        f(&mut self.lock())
    }

    /// Applies one inbound command. See [`Engine::handle`].
    pub fn handle(&self, id: &PlayerId, command: Command) -> Vec<Outbound> {
        self.lock().handle(id, command)
    }

    /// Advances the world one step. See [`Engine::tick`].
    pub fn tick(&self) -> Vec<GameEvent> {
        self.lock().tick()
    }

    /// One player's view. See [`Engine::get_snapshot`].
    pub fn snapshot(&self, id: &PlayerId) -> Option<PlayerView> {
        self.lock().get_snapshot(id)
    }

    /// Number of registered players.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.lock().player_count()
    }

    /// Wall-clock time between ticks.
    ///
    /// Falls back to the default rate if the tuned rate is unusable.
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.lock().tuning().tick_interval())
            .ok()
            .filter(|interval| !interval.is_zero())
            .unwrap_or_else(|| Duration::from_secs_f64(1.0 / TICK_RATE))
    }

    /// Ticks once and collects the tick's events followed by a
    /// `state_update` for every player, all under one lock.
    fn step(&self) -> Vec<Outbound> {
        let mut engine = self.lock();
        let mut out: Vec<Outbound> = engine.tick().iter().flat_map(GameEvent::deliveries).collect();
        out.extend(
            engine
                .snapshot_all()
                .into_iter()
                .map(|(id, view)| Outbound::to(id, OutboundMessage::StateUpdate(view))),
        );
        out
    }
}

// =============================================================================
// Outbox
// =============================================================================

/// Where outbound messages go. The transport implements this.
pub trait Outbox: Send + Sync {
    /// Hands one message to the transport.
    fn deliver(&self, outbound: Outbound);

    /// Hands over several messages in order.
    fn deliver_all(&self, outbound: Vec<Outbound>) {
        for message in outbound {
            self.deliver(message);
        }
    }
}

impl<T: Outbox + ?Sized> Outbox for Arc<T> {
    fn deliver(&self, outbound: Outbound) {
        (**self).deliver(outbound);
    }
}

/// Outbox that keeps every message in memory.
#[derive(Debug, Default)]
pub struct CollectingOutbox {
    messages: Mutex<Vec<Outbound>>,
}

impl CollectingOutbox {
    /// Creates an empty outbox.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns everything delivered so far.
    pub fn take(&self) -> Vec<Outbound> {
        std::mem::take(&mut *self.messages.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Number of messages held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// True if nothing has been delivered since the last [`take`](Self::take).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Outbox for CollectingOutbox {
    fn deliver(&self, outbound: Outbound) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(outbound);
    }
}

// =============================================================================
// TickDriver
// =============================================================================

/// Background thread ticking a [`SharedEngine`] at the tuned rate.
///
/// Stops on [`TickDriver::stop`] or when dropped.
pub struct TickDriver {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl fmt::Debug for TickDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TickDriver")
            .field("running", &self.handle.is_some())
            .finish()
    }
}

impl TickDriver {
    /// Starts the tick thread.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the thread cannot be spawned.
    pub fn spawn(engine: SharedEngine, outbox: Arc<dyn Outbox>) -> io::Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let interval = engine.tick_interval();
        let handle = thread::Builder::new()
            .name("uboat-tick".into())
            .spawn(move || {
                debug!(?interval, "tick driver started");
                let mut deadline = Instant::now();
                while !flag.load(Ordering::Acquire) {
                    let delivered = Self::run_once(&engine, &*outbox);
                    trace!(delivered, "tick broadcast");

                    deadline += interval;
                    let now = Instant::now();
                    if deadline > now {
                        thread::sleep(deadline - now);
                    } else {
                        deadline = now;
                    }
                }
                debug!("tick driver stopped");
            })?;
        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    /// Ticks once on the calling thread and delivers the results.
    ///
    /// Returns the number of messages delivered.
    pub fn run_once(engine: &SharedEngine, outbox: &dyn Outbox) -> usize {
        let out = engine.step();
        let delivered = out.len();
        outbox.deliver_all(out);
        delivered
    }

    /// Signals the thread to stop and waits for it.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            if let Err(payload) = handle.join() {
                error!(reason = panic_reason(payload.as_ref()), "tick thread panicked");
            }
        }
    }
}

/// Message carried by a panic payload, when it has one.
fn panic_reason(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown")
}

impl Drop for TickDriver {
    fn drop(&mut self) {
        self.shutdown();
    }
}
