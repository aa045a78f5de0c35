mod common;

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};

use strand::{AsyncId, BoxError, HookFns, WorkHandle};

const SLEEP_TAG: &str = "Strand::Test::SleepWorker";

/// Sleeps `ms` on the pool, then runs `callback` on the loop.
fn do_sleep(tag: &str, ms: u64, callback: impl FnOnce() + 'static) -> WorkHandle {
    strand::queue_work(
        tag,
        move || {
            thread::sleep(Duration::from_millis(ms));
            Ok::<_, BoxError>(())
        },
        move |result| {
            result.expect("sleep worker failed");
            callback();
        },
    )
    .expect("failed to queue sleep worker")
}

#[strand::test]
fn test_callback_runs_inside_worker_context() {
    common::init_test_logging();

    let hooks = strand::hooks().unwrap();

    let sleep_id: Rc<Cell<Option<AsyncId>>> = Rc::default();
    let before_called = Rc::new(Cell::new(false));
    let after_called = Rc::new(Cell::new(false));

    let hook = hooks.enable(
        HookFns::new()
            .on_init({
                let sleep_id = sleep_id.clone();
                move |id, tag, _| {
                    if tag == SLEEP_TAG {
                        sleep_id.set(Some(id));
                    }
                }
            })
            .on_before({
                let sleep_id = sleep_id.clone();
                let before_called = before_called.clone();
                move |id| {
                    if sleep_id.get() == Some(id) {
                        before_called.set(true);
                    }
                }
            })
            .on_after({
                let sleep_id = sleep_id.clone();
                let after_called = after_called.clone();
                move |id| {
                    if sleep_id.get() == Some(id) {
                        after_called.set(true);
                    }
                }
            }),
    );

    let handle = do_sleep(SLEEP_TAG, 200, {
        let sleep_id = sleep_id.clone();
        move || {
            assert!(sleep_id.get().is_some(), "init should have been reported");
            assert!(before_called.get(), "before should have been reported");
            assert!(!after_called.get(), "after should not be reported yet");
            assert_eq!(strand::execution_id(), sleep_id.get().unwrap());

            strand::set_timeout(Duration::from_millis(10), move || {
                assert!(after_called.get(), "after should have been reported");
                assert!(hooks.disable(hook));
            })
            .unwrap();
        }
    });

    assert_eq!(sleep_id.get(), Some(handle.id()));
}

#[strand::test(worker_threads = 2)]
fn test_concurrent_workers_each_get_their_own_context() {
    common::init_test_logging();

    let hooks = strand::hooks().unwrap();

    let sleep_ids: Rc<RefCell<Vec<AsyncId>>> = Rc::default();
    let before_ids: Rc<RefCell<Vec<AsyncId>>> = Rc::default();
    let after_ids: Rc<RefCell<Vec<AsyncId>>> = Rc::default();

    let hook = hooks.enable(
        HookFns::new()
            .on_init({
                let sleep_ids = sleep_ids.clone();
                move |id, tag, _| {
                    if tag == SLEEP_TAG {
                        sleep_ids.borrow_mut().push(id);
                    }
                }
            })
            .on_before({
                let sleep_ids = sleep_ids.clone();
                let before_ids = before_ids.clone();
                move |id| {
                    if sleep_ids.borrow().contains(&id) {
                        before_ids.borrow_mut().push(id);
                    }
                }
            })
            .on_after({
                let sleep_ids = sleep_ids.clone();
                let after_ids = after_ids.clone();
                move |id| {
                    if sleep_ids.borrow().contains(&id) {
                        after_ids.borrow_mut().push(id);
                    }
                }
            }),
    );

    let finished = Rc::new(Cell::new(0usize));

    let callback = Rc::new({
        let sleep_ids = sleep_ids.clone();
        let before_ids = before_ids.clone();
        let after_ids = after_ids.clone();
        let hooks = hooks.clone();
        move || {
            finished.set(finished.get() + 1);
            if finished.get() < 2 {
                return;
            }

            assert_eq!(sleep_ids.borrow().len(), 2, "two resources initialized");
            assert_eq!(before_ids.borrow().len(), 2, "before reported twice");
            assert_eq!(after_ids.borrow().len(), 1, "only the first after so far");

            let after_ids = after_ids.clone();
            let hooks = hooks.clone();
            strand::set_timeout(Duration::from_millis(10), move || {
                assert_eq!(after_ids.borrow().len(), 2, "after reported twice");
                hooks.disable(hook);
            })
            .unwrap();
        }
    });

    let first = do_sleep(SLEEP_TAG, 200, {
        let callback = callback.clone();
        move || callback()
    });
    let second = do_sleep(SLEEP_TAG, 200, move || callback());

    assert_ne!(first.id(), second.id());
    assert_eq!(*sleep_ids.borrow(), vec![first.id(), second.id()]);
}

#[strand::test(worker_threads = 2)]
fn test_shared_callback_is_scoped_to_each_worker() {
    common::init_test_logging();

    let hooks = strand::hooks().unwrap();

    let sleep_ids: Rc<RefCell<Vec<AsyncId>>> = Rc::default();
    let scopes: Rc<RefCell<Vec<AsyncId>>> = Rc::default();
    let after_ids: Rc<RefCell<Vec<AsyncId>>> = Rc::default();

    let hook = hooks.enable(
        HookFns::new()
            .on_init({
                let sleep_ids = sleep_ids.clone();
                move |id, tag, _| {
                    if tag.starts_with("Strand::Test::SleepWorker") {
                        sleep_ids.borrow_mut().push(id);
                    }
                }
            })
            .on_after({
                let sleep_ids = sleep_ids.clone();
                let after_ids = after_ids.clone();
                move |id| {
                    if sleep_ids.borrow().contains(&id) {
                        after_ids.borrow_mut().push(id);
                    }
                }
            }),
    );

    let callback = Rc::new({
        let scopes = scopes.clone();
        let sleep_ids = sleep_ids.clone();
        move || {
            let scope = strand::execution_id();
            assert!(sleep_ids.borrow().contains(&scope));
            scopes.borrow_mut().push(scope);

            if scopes.borrow().len() == 2 {
                let scopes = scopes.clone();
                let after_ids = after_ids.clone();
                let hooks = hooks.clone();
                strand::set_timeout(Duration::from_millis(10), move || {
                    let mut seen = scopes.borrow().clone();
                    let mut done = after_ids.borrow().clone();
                    seen.sort();
                    done.sort();

                    assert_ne!(seen[0], seen[1], "each call ran in its own scope");
                    assert_eq!(seen, done);
                    hooks.disable(hook);
                })
                .unwrap();
            }
        }
    });

    do_sleep("Strand::Test::SleepWorker1", 150, {
        let callback = callback.clone();
        move || callback()
    });
    do_sleep("Strand::Test::SleepWorker2", 150, move || callback());

    assert_eq!(sleep_ids.borrow().len(), 2);
}

#[strand::test]
fn test_queue_work_returns_before_work_runs() {
    let start = Instant::now();

    let handle = strand::queue_work(
        "Strand::Test::Slow",
        || {
            thread::sleep(Duration::from_millis(200));
            Ok::<_, BoxError>(7)
        },
        move |result| {
            assert_eq!(result.unwrap(), 7);
            assert!(start.elapsed() >= Duration::from_millis(200));
        },
    )
    .unwrap();

    assert!(start.elapsed() < Duration::from_millis(200));
    assert_eq!(strand::execution_id(), AsyncId::ROOT);
    assert!(!handle.is_cancelled());
}
