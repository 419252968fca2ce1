use super::*;
use std::cell::Cell;
use std::collections::VecDeque;

use futures::channel::oneshot;
use futures::executor::{LocalPool, LocalSpawner};
use futures::task::LocalSpawnExt;

// =============================================================
// Fakes
// =============================================================

type Response = Result<Vec<EventRecord>, ApiError>;

#[derive(Clone, Default)]
struct FakeSource {
    responses: Rc<RefCell<VecDeque<Response>>>,
    logged_out: Rc<Cell<bool>>,
    calls: Rc<Cell<usize>>,
    limits: Rc<RefCell<Vec<usize>>>,
    gate: Rc<RefCell<Option<oneshot::Receiver<()>>>>,
}

impl FakeSource {
    fn respond(&self, response: Response) {
        self.responses.borrow_mut().push_back(response);
    }

    fn respond_ids(&self, ids: &[EventId]) {
        self.respond(Ok(ids.iter().map(|id| event(*id)).collect()));
    }

    /// Hold the next fetch open until the returned sender fires.
    fn hold_next_fetch(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.gate.borrow_mut() = Some(rx);
        tx
    }
}

impl EventSource for FakeSource {
    fn has_session(&self) -> bool {
        !self.logged_out.get()
    }

    fn fetch_recent(&self, limit: usize) -> impl Future<Output = Response> {
        self.calls.set(self.calls.get() + 1);
        self.limits.borrow_mut().push(limit);
        let gate = self.gate.borrow_mut().take();
        let responses = Rc::clone(&self.responses);
        async move {
            if let Some(gate) = gate {
                gate.await.ok();
            }
            responses.borrow_mut().pop_front().unwrap_or_else(|| Ok(Vec::new()))
        }
    }
}

/// Runs tasks on a `LocalPool`; sleeps finish only when the test calls `tick`.
#[derive(Clone)]
struct ManualRuntime {
    spawner: LocalSpawner,
    sleepers: Rc<RefCell<Vec<oneshot::Sender<()>>>>,
}

impl ManualRuntime {
    fn tick(&self) {
        for sleeper in self.sleepers.borrow_mut().drain(..) {
            sleeper.send(()).ok();
        }
    }
}

impl Runtime for ManualRuntime {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        self.spawner.spawn_local(task).expect("spawn poll task");
    }

    fn sleep(&self, _duration: Duration) -> LocalBoxFuture<'static, ()> {
        let (tx, rx) = oneshot::channel();
        self.sleepers.borrow_mut().push(tx);
        Box::pin(async move {
            rx.await.ok();
        })
    }
}

struct Harness {
    pool: LocalPool,
    source: FakeSource,
    runtime: ManualRuntime,
    poller: EventPoller<FakeSource, ManualRuntime>,
}

impl Harness {
    fn new() -> Self {
        let pool = LocalPool::new();
        let source = FakeSource::default();
        let runtime = ManualRuntime { spawner: pool.spawner(), sleepers: Rc::default() };
        let poller = EventPoller::new(source.clone(), runtime.clone(), PollerOptions::default());
        Self { pool, source, runtime, poller }
    }

    fn settle(&mut self) {
        self.pool.run_until_stalled();
    }

    fn tick(&mut self) {
        self.runtime.tick();
        self.settle();
    }
}

fn event(id: EventId) -> EventRecord {
    EventRecord {
        id,
        timestamp: format!("2024-05-01T10:00:{:02}", id % 60),
        event_type: "person".to_owned(),
        camera_id: "cam-1".to_owned(),
        camera_name: Some("Front".to_owned()),
        camera_location: None,
        confidence: 0.9,
        severity: crate::net::types::Severity::Red,
        image_path: None,
        is_false_positive: false,
        metadata: serde_json::Value::Null,
    }
}

fn recorder() -> (Listener, Rc<RefCell<Vec<EventId>>>) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let listener: Listener = Rc::new(move |e: &EventRecord| sink.borrow_mut().push(e.id));
    (listener, seen)
}

const INTERVAL: Duration = Duration::from_secs(10);

// =============================================================
// Baseline and novelty
// =============================================================

#[test]
fn first_cycle_sets_baseline_without_notifying() {
    let mut h = Harness::new();
    h.source.respond_ids(&[5, 4, 3]);
    let (listener, seen) = recorder();

    assert_eq!(h.poller.start(Some(listener), INTERVAL), Ok(()));
    h.settle();

    assert!(seen.borrow().is_empty());
    assert_eq!(h.poller.last_seen_id(), Some(5));
    assert_eq!(h.source.calls.get(), 1);
}

#[test]
fn new_events_are_delivered_oldest_first() {
    let mut h = Harness::new();
    h.source.respond_ids(&[5, 4, 3]);
    h.source.respond_ids(&[8, 7, 6, 5, 4]);
    let (listener, seen) = recorder();

    h.poller.start(Some(listener), INTERVAL).expect("start");
    h.settle();
    h.tick();

    assert_eq!(*seen.borrow(), vec![6, 7, 8]);
    assert_eq!(h.poller.last_seen_id(), Some(8));
}

#[test]
fn every_listener_sees_every_new_event() {
    let mut h = Harness::new();
    h.source.respond_ids(&[1]);
    h.source.respond_ids(&[3, 2, 1]);
    let (first, first_seen) = recorder();
    let (second, second_seen) = recorder();

    h.poller.start(Some(first), INTERVAL).expect("start");
    h.poller.add_listener(second);
    h.settle();
    h.tick();

    assert_eq!(*first_seen.borrow(), vec![2, 3]);
    assert_eq!(*second_seen.borrow(), vec![2, 3]);
}

#[test]
fn unchanged_fetch_fires_nothing() {
    let mut h = Harness::new();
    h.source.respond_ids(&[5, 4]);
    h.source.respond_ids(&[5, 4]);
    h.source.respond_ids(&[]);
    let (listener, seen) = recorder();

    h.poller.start(Some(listener), INTERVAL).expect("start");
    h.settle();
    h.tick();
    h.tick();

    assert!(seen.borrow().is_empty());
    assert_eq!(h.poller.last_seen_id(), Some(5));
    assert_eq!(h.source.calls.get(), 3);
}

#[test]
fn empty_first_fetch_leaves_baseline_unset() {
    let mut h = Harness::new();
    h.source.respond_ids(&[]);
    h.source.respond_ids(&[2, 1]);
    let (listener, seen) = recorder();

    h.poller.start(Some(listener), INTERVAL).expect("start");
    h.settle();
    assert_eq!(h.poller.last_seen_id(), None);

    h.tick();
    assert!(seen.borrow().is_empty());
    assert_eq!(h.poller.last_seen_id(), Some(2));
}

#[test]
fn fetch_uses_configured_batch() {
    let mut h = Harness::new();
    h.poller.start(None, INTERVAL).expect("start");
    h.settle();
    assert_eq!(*h.source.limits.borrow(), vec![DEFAULT_POLL_BATCH]);
}

#[test]
fn absorb_ignores_ids_at_or_below_marker() {
    let mut state = PollerState { last_seen: Some(10), ..PollerState::default() };
    let fresh = state.absorb(vec![event(12), event(10), event(11), event(9)]);
    let ids: Vec<EventId> = fresh.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![11, 12]);
    assert_eq!(state.last_seen, Some(12));
}

// =============================================================
// Start / stop lifecycle
// =============================================================

#[test]
fn start_without_session_is_refused() {
    let mut h = Harness::new();
    h.source.logged_out.set(true);
    let (listener, _) = recorder();

    assert_eq!(h.poller.start(Some(listener), INTERVAL), Err(PollerError::NoSession));
    h.settle();

    assert!(!h.poller.is_running());
    assert_eq!(h.poller.listener_count(), 0);
    assert_eq!(h.source.calls.get(), 0);
}

#[test]
fn second_start_registers_listener_but_reports_running() {
    let mut h = Harness::new();
    let (first, _) = recorder();
    let (second, _) = recorder();

    h.poller.start(Some(first), INTERVAL).expect("start");
    assert_eq!(h.poller.start(Some(second), INTERVAL), Err(PollerError::AlreadyRunning));
    h.settle();

    assert_eq!(h.poller.listener_count(), 2);
    assert_eq!(h.source.calls.get(), 1);
}

#[test]
fn start_default_uses_default_interval() {
    let mut h = Harness::new();
    assert_eq!(h.poller.start_default(None), Ok(()));
    h.settle();
    assert!(h.poller.is_running());
}

#[test]
fn stop_is_idempotent_and_restart_is_fresh() {
    let mut h = Harness::new();
    h.poller.stop();
    h.poller.stop();
    assert!(!h.poller.is_running());

    h.source.respond_ids(&[5, 4]);
    let (old, old_seen) = recorder();
    h.poller.start(Some(old), INTERVAL).expect("start");
    h.settle();
    assert_eq!(h.poller.last_seen_id(), Some(5));

    h.poller.stop();
    h.poller.stop();
    assert_eq!(h.poller.last_seen_id(), None);
    assert_eq!(h.poller.listener_count(), 0);

    h.source.respond_ids(&[9, 8]);
    h.source.respond_ids(&[10, 9]);
    let (fresh, fresh_seen) = recorder();
    h.poller.start(Some(fresh), INTERVAL).expect("restart");
    h.settle();
    assert_eq!(h.poller.last_seen_id(), Some(9));
    assert!(fresh_seen.borrow().is_empty());

    h.tick();
    assert_eq!(*fresh_seen.borrow(), vec![10]);
    assert!(old_seen.borrow().is_empty());
}

#[test]
fn stopped_loop_does_not_fetch_again() {
    let mut h = Harness::new();
    h.poller.start(None, INTERVAL).expect("start");
    h.settle();
    h.poller.stop();
    h.tick();
    h.tick();
    assert_eq!(h.source.calls.get(), 1);
}

#[test]
fn in_flight_fetch_after_stop_is_discarded() {
    let mut h = Harness::new();
    let release = h.source.hold_next_fetch();
    h.source.respond_ids(&[7, 6]);
    let (listener, seen) = recorder();

    h.poller.start(Some(listener), INTERVAL).expect("start");
    h.settle();
    h.poller.stop();
    release.send(()).expect("release fetch");
    h.settle();

    assert_eq!(h.poller.last_seen_id(), None);
    assert!(seen.borrow().is_empty());
    assert!(!h.poller.is_running());
}

#[test]
fn remove_listener_reports_membership() {
    let h = Harness::new();
    let (listener, _) = recorder();
    let id = h.poller.add_listener(listener);
    assert!(h.poller.remove_listener(id));
    assert!(!h.poller.remove_listener(id));
    assert_eq!(h.poller.listener_count(), 0);
}

#[test]
fn removed_listener_stops_receiving() {
    let mut h = Harness::new();
    h.source.respond_ids(&[1]);
    h.source.respond_ids(&[2, 1]);
    let (kept, kept_seen) = recorder();
    let (dropped, dropped_seen) = recorder();

    h.poller.start(Some(kept), INTERVAL).expect("start");
    let id = h.poller.add_listener(dropped);
    h.settle();
    h.poller.remove_listener(id);
    h.tick();

    assert_eq!(*kept_seen.borrow(), vec![2]);
    assert!(dropped_seen.borrow().is_empty());
}

#[test]
fn stop_from_listener_halts_rest_of_batch() {
    let mut h = Harness::new();
    h.source.respond_ids(&[5]);
    h.source.respond_ids(&[8, 7, 6, 5]);
    let poller = h.poller.clone();
    let stopper: Listener = Rc::new(move |_e: &EventRecord| poller.stop());
    let (recorder_listener, seen) = recorder();

    h.poller.start(Some(stopper), INTERVAL).expect("start");
    h.poller.add_listener(recorder_listener);
    h.settle();
    h.tick();

    assert!(!h.poller.is_running());
    assert_eq!(h.poller.listener_count(), 0);
    assert!(seen.borrow().is_empty());
}

#[test]
fn listener_removed_mid_batch_misses_remaining_events() {
    let mut h = Harness::new();
    h.source.respond_ids(&[1]);
    h.source.respond_ids(&[4, 3, 2, 1]);
    let (late, late_seen) = recorder();
    let late_id = Rc::new(Cell::new(None::<ListenerId>));

    let poller = h.poller.clone();
    let target = Rc::clone(&late_id);
    let remover: Listener = Rc::new(move |e: &EventRecord| {
        if e.id == 3 {
            if let Some(id) = target.get() {
                poller.remove_listener(id);
            }
        }
    });
    h.poller.start(Some(remover), INTERVAL).expect("start");
    late_id.set(Some(h.poller.add_listener(late)));
    h.settle();
    h.tick();

    assert_eq!(*late_seen.borrow(), vec![2]);
    assert!(h.poller.is_running());
    assert_eq!(h.poller.last_seen_id(), Some(4));
}

// =============================================================
// Failures
// =============================================================

#[test]
fn auth_failure_stops_poller() {
    let mut h = Harness::new();
    h.source.respond(Err(ApiError::Unauthorized));
    let (listener, _) = recorder();

    h.poller.start(Some(listener), INTERVAL).expect("start");
    h.settle();

    assert!(!h.poller.is_running());
    assert_eq!(h.poller.listener_count(), 0);
    h.tick();
    assert_eq!(h.source.calls.get(), 1);
}

#[test]
fn transient_failure_retries_next_tick() {
    let mut h = Harness::new();
    h.source.respond(Err(ApiError::Network("offline".to_owned())));
    h.source.respond_ids(&[5]);
    h.source.respond(Err(ApiError::Status(500)));
    h.source.respond_ids(&[6, 5]);
    let (listener, seen) = recorder();

    h.poller.start(Some(listener), INTERVAL).expect("start");
    h.settle();
    assert!(h.poller.is_running());
    assert_eq!(h.poller.last_seen_id(), None);

    h.tick();
    h.tick();
    h.tick();
    assert_eq!(*seen.borrow(), vec![6]);
    assert_eq!(h.source.calls.get(), 4);
}

#[test]
fn logged_out_mid_poll_skips_cycle_silently() {
    let mut h = Harness::new();
    h.source.respond_ids(&[3]);
    h.poller.start(None, INTERVAL).expect("start");
    h.settle();

    h.source.logged_out.set(true);
    h.tick();
    assert_eq!(h.source.calls.get(), 1);
    assert!(h.poller.is_running());
    assert_eq!(h.poller.last_seen_id(), Some(3));
}

// =============================================================
// Manual cycles
// =============================================================

#[test]
fn manual_check_does_nothing_when_stopped() {
    let h = Harness::new();
    futures::executor::block_on(h.poller.check_for_new_events());
    assert_eq!(h.source.calls.get(), 0);
}

#[test]
fn manual_check_runs_one_cycle() {
    let mut h = Harness::new();
    h.source.respond_ids(&[4]);
    h.source.respond_ids(&[5, 4]);
    let (listener, seen) = recorder();
    h.poller.start(Some(listener), INTERVAL).expect("start");
    h.settle();

    futures::executor::block_on(h.poller.check_for_new_events());
    assert_eq!(*seen.borrow(), vec![5]);
}
