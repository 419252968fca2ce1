//! Event poller: periodically fetches the newest events and hands each one
//! that is newer than anything seen so far to the registered listeners.
//!
//! DESIGN
//! ======
//! A poller is an ordinary value (cheap `Clone` handle over shared state),
//! so several can run side by side. The backend and the timer are injected
//! through [`EventSource`] and [`Runtime`], which is what lets the tests
//! drive cycles deterministically.
//!
//! Each run is a single task looping fetch, dispatch, sleep. Cycles never
//! overlap. `stop()` bumps a generation counter and a cycle whose generation
//! changed while its fetch was in flight drops the result untouched.
//!
//! Novelty is decided purely by id ordering. The first successful fetch only
//! records a baseline so events that existed before `start` never notify.

#[cfg(test)]
#[path = "poller_test.rs"]
mod poller_test;

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

use futures::future::LocalBoxFuture;

use crate::config::{DEFAULT_POLL_BATCH, DEFAULT_POLL_INTERVAL_MS, MonitorConfig};
use crate::net::api::ApiError;
use crate::net::types::{EventId, EventRecord};

/// Callback invoked once per new event.
pub type Listener = Rc<dyn Fn(&EventRecord)>;

/// Handle returned by [`EventPoller::add_listener`], used for removal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Why `start` refused to begin polling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PollerError {
    #[error("no active session")]
    NoSession,
    #[error("poller is already running")]
    AlreadyRunning,
}

/// Backend access needed by the poller.
pub trait EventSource {
    /// Session check. A `false` here means the user logged out.
    fn has_session(&self) -> bool;

    /// Fetch the newest `limit` events, newest first.
    fn fetch_recent(&self, limit: usize) -> impl Future<Output = Result<Vec<EventRecord>, ApiError>>;
}

/// Task spawning and timers for the polling loop.
pub trait Runtime {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>);
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()>;
}

/// Browser runtime: Leptos local tasks plus `setTimeout`-backed sleeps.
#[cfg(feature = "hydrate")]
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserRuntime;

#[cfg(feature = "hydrate")]
impl Runtime for BrowserRuntime {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        leptos::task::spawn_local(task);
    }

    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        Box::pin(gloo_timers::future::sleep(duration))
    }
}

/// The poller used by the app: REST source on the browser runtime.
#[cfg(feature = "hydrate")]
pub type BrowserPoller = EventPoller<crate::net::api::HttpEventSource, BrowserRuntime>;

#[cfg(feature = "hydrate")]
impl BrowserPoller {
    #[must_use]
    pub fn from_config(config: &MonitorConfig) -> Self {
        Self::new(crate::net::api::HttpEventSource::from_config(config), BrowserRuntime, PollerOptions::from(config))
    }
}

/// Batch size and default interval.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollerOptions {
    pub batch: usize,
    pub interval: Duration,
}

impl Default for PollerOptions {
    fn default() -> Self {
        Self { batch: DEFAULT_POLL_BATCH, interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS) }
    }
}

impl From<&MonitorConfig> for PollerOptions {
    fn from(config: &MonitorConfig) -> Self {
        Self { batch: config.poll_batch, interval: config.poll_interval }
    }
}

#[derive(Default)]
struct PollerState {
    running: bool,
    generation: u64,
    last_seen: Option<EventId>,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
}

impl PollerState {
    fn add_listener(&mut self, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Fold a newest-first fetch into the last-seen marker and return the new
    /// events oldest first.
    fn absorb(&mut self, events: Vec<EventRecord>) -> Vec<EventRecord> {
        let Some(newest) = events.first() else {
            return Vec::new();
        };
        let Some(last_seen) = self.last_seen else {
            self.last_seen = Some(newest.id);
            return Vec::new();
        };
        let mut fresh: Vec<EventRecord> = events.into_iter().filter(|e| e.id > last_seen).collect();
        if let Some(max) = fresh.iter().map(|e| e.id).max() {
            self.last_seen = Some(max);
        }
        fresh.reverse();
        fresh
    }

    fn is_current(&self, generation: u64) -> bool {
        self.running && self.generation == generation
    }
}

enum Delivery {
    Deliver,
    Skip,
    Halt,
}

struct Inner<S, R> {
    source: S,
    runtime: R,
    options: PollerOptions,
    state: RefCell<PollerState>,
}

pub struct EventPoller<S, R> {
    inner: Rc<Inner<S, R>>,
}

impl<S, R> Clone for EventPoller<S, R> {
    fn clone(&self) -> Self {
        Self { inner: Rc::clone(&self.inner) }
    }
}

impl<S, R> EventPoller<S, R>
where
    S: EventSource + 'static,
    R: Runtime + 'static,
{
    #[must_use]
    pub fn new(source: S, runtime: R, options: PollerOptions) -> Self {
        Self { inner: Rc::new(Inner { source, runtime, options, state: RefCell::new(PollerState::default()) }) }
    }

    /// Begin polling every `interval`, running the first cycle immediately.
    ///
    /// `listener`, when given, is registered even if the poller is already
    /// running.
    ///
    /// # Errors
    ///
    /// [`PollerError::NoSession`] when the session check fails (nothing is
    /// registered), [`PollerError::AlreadyRunning`] when a run is active.
    pub fn start(&self, listener: Option<Listener>, interval: Duration) -> Result<(), PollerError> {
        if !self.inner.source.has_session() {
            return Err(PollerError::NoSession);
        }
        let generation = {
            let mut state = self.inner.state.borrow_mut();
            if let Some(listener) = listener {
                state.add_listener(listener);
            }
            if state.running {
                return Err(PollerError::AlreadyRunning);
            }
            state.running = true;
            state.generation += 1;
            state.generation
        };
        leptos::logging::log!("event poller started (every {} ms)", interval.as_millis());
        let poller = self.clone();
        self.inner.runtime.spawn(Box::pin(poller.run(generation, interval)));
        Ok(())
    }

    /// [`EventPoller::start`] with the configured interval.
    ///
    /// # Errors
    ///
    /// Same as [`EventPoller::start`].
    pub fn start_default(&self, listener: Option<Listener>) -> Result<(), PollerError> {
        self.start(listener, self.inner.options.interval)
    }

    /// Stop polling, forget the baseline and drop every listener. Safe to call
    /// at any time.
    pub fn stop(&self) {
        let mut state = self.inner.state.borrow_mut();
        if state.running {
            leptos::logging::log!("event poller stopped");
        }
        state.running = false;
        state.generation += 1;
        state.last_seen = None;
        state.listeners.clear();
    }

    pub fn add_listener(&self, listener: Listener) -> ListenerId {
        self.inner.state.borrow_mut().add_listener(listener)
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut state = self.inner.state.borrow_mut();
        let before = state.listeners.len();
        state.listeners.retain(|(lid, _)| *lid != id);
        state.listeners.len() != before
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.inner.state.borrow().running
    }

    #[must_use]
    pub fn last_seen_id(&self) -> Option<EventId> {
        self.inner.state.borrow().last_seen
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner.state.borrow().listeners.len()
    }

    /// Run one fetch-and-compare cycle now. Does nothing when stopped.
    pub async fn check_for_new_events(&self) {
        let generation = {
            let state = self.inner.state.borrow();
            if !state.running {
                return;
            }
            state.generation
        };
        self.cycle(generation).await;
    }

    async fn run(self, generation: u64, interval: Duration) {
        loop {
            self.cycle(generation).await;
            if !self.inner.state.borrow().is_current(generation) {
                break;
            }
            self.inner.runtime.sleep(interval).await;
            if !self.inner.state.borrow().is_current(generation) {
                break;
            }
        }
    }

    /// Re-checked before every callback: a listener may stop the poller or
    /// remove another listener mid-batch.
    fn delivery(&self, generation: u64, id: ListenerId) -> Delivery {
        let state = self.inner.state.borrow();
        if !state.is_current(generation) {
            Delivery::Halt
        } else if state.listeners.iter().any(|(lid, _)| *lid == id) {
            Delivery::Deliver
        } else {
            Delivery::Skip
        }
    }

    async fn cycle(&self, generation: u64) {
        if !self.inner.source.has_session() {
            return;
        }
        let result = self.inner.source.fetch_recent(self.inner.options.batch).await;
        if !self.inner.state.borrow().is_current(generation) {
            return;
        }
        match result {
            Ok(events) => {
                let (fresh, listeners) = {
                    let mut state = self.inner.state.borrow_mut();
                    let fresh = state.absorb(events);
                    let listeners: Vec<(ListenerId, Listener)> =
                        state.listeners.iter().map(|(id, l)| (*id, Rc::clone(l))).collect();
                    (fresh, listeners)
                };
                for event in &fresh {
                    for (id, listener) in &listeners {
                        match self.delivery(generation, *id) {
                            Delivery::Deliver => listener(event),
                            Delivery::Skip => {}
                            Delivery::Halt => return,
                        }
                    }
                }
            }
            Err(err) if err.is_auth_failure() => {
                leptos::logging::warn!("event poll rejected, stopping: {err}");
                self.stop();
            }
            Err(err) => leptos::logging::warn!("event poll failed, retrying next tick: {err}"),
        }
    }
}
