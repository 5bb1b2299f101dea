//! Unit tests for trek-dispatch: scheduling fairness, budgets, and the
//! host bindings.  Tests play the privileged thread by servicing the
//! store between ticks, except the driver tests, where the driver does.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use trek_core::{Capabilities, Cell, ChunkId, Cost, DomainId, TaskId};
use trek_search::{Goal, TrialConfig};
use trek_session::{
    EngineContext, SearchSession, SessionBuilder, SessionHandle, SessionState,
};
use trek_terrain::{BlockKind, CacheConfig, FlatWorld, TerrainOracle, TerrainStore};

use crate::{bind, DispatchConfig, Dispatcher, HostScheduler, TickDriver};

const D0: DomainId = DomainId(0);

// ── Fixtures ──────────────────────────────────────────────────────────────────

fn flat_world() -> FlatWorld {
    FlatWorld::new(4, 0, 16)
}

/// Flat ground with a sealed box around `center`, three blocks tall.
fn world_with_box(center: Cell) -> FlatWorld {
    let mut world = flat_world();
    for d in -2..=2 {
        for y in center.y..=center.y + 2 {
            world.set(Cell::new(center.x + d, y, center.z - 2, D0), BlockKind::Solid);
            world.set(Cell::new(center.x + d, y, center.z + 2, D0), BlockKind::Solid);
            world.set(Cell::new(center.x - 2, y, center.z + d, D0), BlockKind::Solid);
            world.set(Cell::new(center.x + 2, y, center.z + d, D0), BlockKind::Solid);
        }
    }
    world
}

fn fresh_dispatcher(config: DispatchConfig) -> (Arc<TerrainStore>, Dispatcher) {
    let store = Arc::new(TerrainStore::new(CacheConfig::default()).unwrap());
    let dispatcher = Dispatcher::new(EngineContext::new(Arc::clone(&store)), config).unwrap();
    (store, dispatcher)
}

/// A pedestrian session with a cost ceiling, so unreachable goals exhaust
/// promptly instead of flooding the open world.
fn bounded_session(ctx: &EngineContext, origin: Cell, goal: Goal) -> SearchSession {
    SessionBuilder::new(Capabilities::new(origin), goal)
        .standard_modes()
        .trial_config(TrialConfig {
            max_cost: Some(Cost::new(40.0)),
            ..TrialConfig::default()
        })
        .build(ctx)
        .unwrap()
}

/// Tick until every handle is terminal, servicing chunks before each tick.
fn drive_all(
    dispatcher: &mut Dispatcher,
    store: &TerrainStore,
    world: &dyn TerrainOracle,
    handles: &[SessionHandle],
) {
    for _ in 0..1_000_000 {
        store.service(world, usize::MAX);
        dispatcher.tick();
        if handles.iter().all(|h| h.state().is_terminal()) {
            return;
        }
    }
    panic!("sessions did not all terminate");
}

// ── Configuration ─────────────────────────────────────────────────────────────

mod config_tests {
    use super::*;

    #[test]
    fn zero_budgets_are_rejected() {
        let store = Arc::new(TerrainStore::new(CacheConfig::default()).unwrap());
        let ctx = EngineContext::new(store);

        let no_sessions = DispatchConfig {
            sessions_per_tick: 0,
            ..DispatchConfig::default()
        };
        assert!(Dispatcher::new(ctx.clone(), no_sessions).is_err());

        let no_cells = DispatchConfig {
            cells_per_tick: 0,
            ..DispatchConfig::default()
        };
        assert!(Dispatcher::new(ctx, no_cells).is_err());
    }
}

// ── Scheduling ────────────────────────────────────────────────────────────────

mod scheduling_tests {
    use super::*;

    /// The canonical scenario: `2` reachable from `1`, `4` sealed off; the
    /// reachable search succeeds, the sealed one fails, and a warm-cache
    /// rerun reproduces the cost exactly.
    #[test]
    fn worked_example() {
        let four = Cell::new(10, 4, 10, D0);
        let world = world_with_box(four);
        let (store, mut dispatcher) = fresh_dispatcher(DispatchConfig::default());
        let ctx = dispatcher.context().clone();
        let one = Cell::new(0, 4, 0, D0);
        let two = Cell::new(3, 4, 3, D0);

        let to_two = dispatcher.search(bounded_session(&ctx, one, Goal::Cell(two)), None);
        let to_four = dispatcher.search(bounded_session(&ctx, one, Goal::Cell(four)), None);
        drive_all(&mut dispatcher, &store, &world, &[to_two.clone(), to_four.clone()]);

        assert_eq!(to_two.state(), SessionState::Succeeded);
        assert_eq!(to_four.state(), SessionState::Failed);
        let first_cost = to_two.try_result().unwrap().itinerary.unwrap().total_cost();

        // Second identical request against the warm cache.
        let rerun = dispatcher.search(bounded_session(&ctx, one, Goal::Cell(two)), None);
        drive_all(&mut dispatcher, &store, &world, &[rerun.clone()]);
        let rerun_cost = rerun.try_result().unwrap().itinerary.unwrap().total_cost();
        assert_eq!(first_cost, rerun_cost);
    }

    #[test]
    fn global_budget_bounds_each_tick() {
        let world = flat_world();
        let config = DispatchConfig {
            sessions_per_tick: 8,
            cells_per_tick: 32,
        };
        let (store, mut dispatcher) = fresh_dispatcher(config);
        let ctx = dispatcher.context().clone();

        let handles: Vec<SessionHandle> = (0..4)
            .map(|i| {
                let origin = Cell::new(0, 4, i * 40, D0);
                let goal = Goal::Cell(Cell::new(25, 4, i * 40, D0));
                dispatcher.search(bounded_session(&ctx, origin, goal), None)
            })
            .collect();

        for _ in 0..1_000_000 {
            store.service(&world, usize::MAX);
            let report = dispatcher.tick();
            assert!(
                report.expanded <= 32,
                "tick expanded {} > global budget",
                report.expanded
            );
            if handles.iter().all(|h| h.state().is_terminal()) {
                assert!(handles.iter().all(|h| h.state() == SessionState::Succeeded));
                return;
            }
        }
        panic!("sessions did not all terminate");
    }

    #[test]
    fn round_robin_serves_every_session() {
        let world = flat_world();
        let config = DispatchConfig {
            sessions_per_tick: 1,
            cells_per_tick: 64,
        };
        let (store, mut dispatcher) = fresh_dispatcher(config);
        let ctx = dispatcher.context().clone();

        let a = dispatcher.search(
            bounded_session(&ctx, Cell::new(0, 4, 0, D0), Goal::Cell(Cell::new(15, 4, 0, D0))),
            None,
        );
        let b = dispatcher.search(
            bounded_session(&ctx, Cell::new(0, 4, 50, D0), Goal::Cell(Cell::new(15, 4, 50, D0))),
            None,
        );

        for _ in 0..1_000_000 {
            store.service(&world, usize::MAX);
            let report = dispatcher.tick();
            assert!(report.sessions <= 1, "batch exceeded sessions_per_tick");
            if a.state().is_terminal() && b.state().is_terminal() {
                // One-session ticks still served both to completion.
                assert_eq!(a.state(), SessionState::Succeeded);
                assert_eq!(b.state(), SessionState::Succeeded);
                assert!(dispatcher.is_idle());
                return;
            }
        }
        panic!("sessions did not all terminate");
    }

    #[test]
    fn fifty_concurrent_sessions_all_terminate() {
        let sealed = Cell::new(100, 4, 100, D0);
        let world = world_with_box(sealed);
        let config = DispatchConfig {
            sessions_per_tick: 4,
            cells_per_tick: 64,
        };
        let (store, mut dispatcher) = fresh_dispatcher(config);
        let ctx = dispatcher.context().clone();

        let handles: Vec<SessionHandle> = (0..50)
            .map(|i| {
                let origin = Cell::new(0, 4, i * 10, D0);
                // Every fifth session chases the sealed cell and must fail.
                let goal = if i % 5 == 0 {
                    Goal::Cell(Cell::new(sealed.x, sealed.y, sealed.z, D0))
                } else {
                    Goal::Cell(Cell::new(12, 4, i * 10, D0))
                };
                dispatcher.search(bounded_session(&ctx, origin, goal), None)
            })
            .collect();

        drive_all(&mut dispatcher, &store, &world, &handles);

        for (i, handle) in handles.iter().enumerate() {
            let expected = if i % 5 == 0 {
                SessionState::Failed
            } else {
                SessionState::Succeeded
            };
            assert_eq!(handle.state(), expected, "session {i}");
        }
        assert!(dispatcher.is_idle());
    }

    #[test]
    fn errored_session_is_never_registered() {
        let (_store, mut dispatcher) = fresh_dispatcher(DispatchConfig::default());
        let ctx = dispatcher.context().clone();

        let origin = Cell::new(0, 4, 0, D0);
        let handle = dispatcher.search(bounded_session(&ctx, origin, Goal::Domain(D0)), None);

        assert_eq!(handle.state(), SessionState::Errored);
        assert!(dispatcher.is_idle());
    }

    #[test]
    fn cache_is_pruned_once_per_tick() {
        let store = Arc::new(
            TerrainStore::new(CacheConfig {
                ttl: Duration::from_millis(1),
                ..CacheConfig::default()
            })
            .unwrap(),
        );
        let mut dispatcher = Dispatcher::new(
            EngineContext::new(Arc::clone(&store)),
            DispatchConfig::default(),
        )
        .unwrap();

        let world = flat_world();
        // Populate: one request inserts the chunk plus its prefetched ring.
        store.request(ChunkId::new(D0, 0, 0));
        store.service(&world, usize::MAX);
        assert_eq!(store.len(), 9);

        std::thread::sleep(Duration::from_millis(10));
        let report = dispatcher.tick();
        assert_eq!(report.pruned, 9);
        assert!(store.is_empty());
    }
}

// ── Host bindings ─────────────────────────────────────────────────────────────

mod host_tests {
    use super::*;

    /// A hand-pumped scheduler standing in for the host's loop.
    struct TestHost {
        tasks: Mutex<Vec<(TaskId, Box<dyn FnMut() + Send>)>>,
        next: AtomicU64,
    }

    impl TestHost {
        fn new() -> Self {
            Self {
                tasks: Mutex::new(Vec::new()),
                next: AtomicU64::new(0),
            }
        }

        /// Run every registered task once.
        fn pump(&self) {
            for (_, task) in self.tasks.lock().unwrap().iter_mut() {
                task();
            }
        }

        fn task_count(&self) -> usize {
            self.tasks.lock().unwrap().len()
        }
    }

    impl HostScheduler for TestHost {
        fn schedule_repeating(
            &self,
            _period: Duration,
            task: Box<dyn FnMut() + Send>,
        ) -> TaskId {
            let id = TaskId(self.next.fetch_add(1, Ordering::Relaxed));
            self.tasks.lock().unwrap().push((id, task));
            id
        }

        fn schedule_once(&self, _delay: Duration, task: Box<dyn FnOnce() + Send>) -> TaskId {
            let mut task = Some(task);
            self.schedule_repeating(
                _delay,
                Box::new(move || {
                    if let Some(task) = task.take() {
                        task();
                    }
                }),
            )
        }

        fn cancel(&self, task: TaskId) -> bool {
            let mut tasks = self.tasks.lock().unwrap();
            let before = tasks.len();
            tasks.retain(|(id, _)| *id != task);
            tasks.len() < before
        }
    }

    #[test]
    fn bind_drives_a_search_through_the_host_loop() {
        let host = TestHost::new();
        let (_store, dispatcher) = fresh_dispatcher(DispatchConfig::default());
        let dispatcher = Arc::new(Mutex::new(dispatcher));
        let ctx = dispatcher.lock().unwrap().context().clone();

        let tasks = bind(
            &host,
            Arc::clone(&dispatcher),
            Box::new(flat_world()),
            Duration::from_millis(50),
            usize::MAX,
        );
        assert_eq!(host.task_count(), 2);

        let origin = Cell::new(0, 4, 0, D0);
        let handle = dispatcher.lock().unwrap().search(
            bounded_session(&ctx, origin, Goal::Cell(Cell::new(10, 4, 0, D0))),
            None,
        );

        for _ in 0..100_000 {
            host.pump();
            if handle.state().is_terminal() {
                break;
            }
        }
        assert_eq!(handle.state(), SessionState::Succeeded);

        tasks.cancel(&host);
        assert_eq!(host.task_count(), 0);
    }

    #[test]
    fn tick_driver_completes_a_search_unattended() {
        let (_store, dispatcher) = fresh_dispatcher(DispatchConfig::default());
        let dispatcher = Arc::new(Mutex::new(dispatcher));
        let ctx = dispatcher.lock().unwrap().context().clone();

        let driver = TickDriver::spawn(
            Arc::clone(&dispatcher),
            Box::new(flat_world()),
            Duration::from_millis(1),
            usize::MAX,
        )
        .unwrap();

        let origin = Cell::new(0, 4, 0, D0);
        let handle = dispatcher.lock().unwrap().search(
            bounded_session(&ctx, origin, Goal::Cell(Cell::new(12, 4, 0, D0))),
            None,
        );

        let result = handle
            .result_timeout(Duration::from_secs(10))
            .expect("driver never finished the session");
        assert_eq!(result.state, SessionState::Succeeded);
        driver.stop();
    }
}
