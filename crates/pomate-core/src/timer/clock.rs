//! Tick sources for the timer engine.
//!
//! The engine never sleeps. It asks a [`Scheduler`] to start a repeating
//! tick source and gets back a [`TickHandle`]; the scheduler delivers the
//! source's [`Tick`] token once per interval to whoever drives the engine,
//! and the driver hands it to [`TimerEngine::handle_tick`]. Each source has
//! its own token, so a tick that was already in flight when its source was
//! cancelled is recognised as stale and dropped.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;

use super::engine::TimerEngine;
use crate::events::Event;

/// Token identifying the tick source that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tick {
    source: u64,
}

impl Tick {
    pub(crate) fn new(source: u64) -> Self {
        Self { source }
    }

    pub fn source(&self) -> u64 {
        self.source
    }
}

/// Cancels its tick source when `cancel`led or dropped.
#[must_use = "dropping a TickHandle stops its tick source"]
pub struct TickHandle {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl TickHandle {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Stop the source. No tick is delivered for it after this returns.
    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for TickHandle {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for TickHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TickHandle")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// Starts repeating tick sources.
pub trait Scheduler: Send {
    /// Deliver `tick` every `interval`, starting one interval from now, until
    /// the returned handle is cancelled.
    fn start(&mut self, interval: Duration, tick: Tick) -> TickHandle;
}

// ── Tokio ────────────────────────────────────────────────────────────

/// Wall-clock scheduler backed by the tokio timer.
///
/// Ticks arrive on the receiver returned by [`TokioScheduler::channel`].
/// Must be used from within a tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    tx: mpsc::UnboundedSender<Tick>,
}

impl TokioScheduler {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Tick>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Scheduler for TokioScheduler {
    fn start(&mut self, interval: Duration, tick: Tick) -> TickHandle {
        let tx = self.tx.clone();
        let task = tokio::spawn(async move {
            let mut ticker =
                tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
            loop {
                ticker.tick().await;
                if tx.send(tick).is_err() {
                    break;
                }
            }
        });
        TickHandle::new(move || task.abort())
    }
}

// ── Manual ───────────────────────────────────────────────────────────

/// Scheduler advanced by hand, for tests and simulations.
///
/// Clones share state: keep one clone, give the other to the engine, then
/// call [`ManualScheduler::advance`].
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    inner: Arc<Mutex<ManualInner>>,
}

#[derive(Debug, Default)]
struct ManualInner {
    active: Option<Tick>,
    started: usize,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token of the currently running source, if any.
    pub fn active(&self) -> Option<Tick> {
        self.inner.lock().ok()?.active
    }

    /// How many sources have been started so far.
    pub fn started(&self) -> usize {
        self.inner.lock().map(|i| i.started).unwrap_or(0)
    }

    /// Fire `ticks` one-second ticks from whichever source is active at each
    /// step. Stops early if the engine has no running source.
    pub fn advance(&self, engine: &mut TimerEngine, ticks: u32) -> Vec<Event> {
        let mut events = Vec::new();
        for _ in 0..ticks {
            let Some(tick) = self.active() else {
                break;
            };
            events.extend(engine.handle_tick(tick));
        }
        events
    }
}

impl Scheduler for ManualScheduler {
    fn start(&mut self, _interval: Duration, tick: Tick) -> TickHandle {
        if let Ok(mut inner) = self.inner.lock() {
            inner.active = Some(tick);
            inner.started += 1;
        }
        let inner = Arc::clone(&self.inner);
        TickHandle::new(move || {
            if let Ok(mut inner) = inner.lock() {
                if inner.active == Some(tick) {
                    inner.active = None;
                }
            }
        })
    }
}
