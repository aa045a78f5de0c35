mod common;

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use strand::StrandError;
use strand::executor::Executor;

fn executor(threads: usize) -> Executor {
    common::init_test_logging();
    Executor::new(threads, "strand-test").unwrap()
}

#[test]
fn test_single_thread_runs_jobs_in_order() {
    let mut executor = executor(1);
    let (tx, rx) = mpsc::channel();

    for i in 0..10 {
        let tx = tx.clone();
        executor.submit(move || tx.send(i).unwrap()).unwrap();
    }

    let received: Vec<i32> = rx.iter().take(10).collect();
    assert_eq!(received, (0..10).collect::<Vec<_>>());

    executor.shutdown();
    executor.join();
}

#[test]
fn test_jobs_run_off_the_submitting_thread() {
    let executor = executor(2);
    let (tx, rx) = mpsc::channel();

    executor
        .submit(move || {
            let name = thread::current().name().map(str::to_string);
            tx.send(name).unwrap();
        })
        .unwrap();

    let name = rx.recv().unwrap().unwrap();
    assert!(name.starts_with("strand-test-"), "unexpected name {name}");
    assert_ne!(Some(name.as_str()), thread::current().name());
}

#[test]
fn test_jobs_run_in_parallel() {
    let executor = executor(4);

    let active = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let (tx, rx) = mpsc::channel();

    for _ in 0..4 {
        let active = active.clone();
        let peak = peak.clone();
        let tx = tx.clone();

        executor
            .submit(move || {
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);

                thread::sleep(Duration::from_millis(100));

                active.fetch_sub(1, Ordering::SeqCst);
                tx.send(()).unwrap();
            })
            .unwrap();
    }

    for _ in 0..4 {
        rx.recv().unwrap();
    }

    assert!(peak.load(Ordering::SeqCst) > 1, "jobs never overlapped");
}

#[test]
fn test_executor_stress() {
    let executor = executor(8);
    let completed = Arc::new(Mutex::new(HashSet::new()));
    let (tx, rx) = mpsc::channel();

    for i in 0..1000 {
        let completed = completed.clone();
        let tx = tx.clone();
        executor
            .submit(move || {
                completed.lock().unwrap().insert(i);
                tx.send(()).unwrap();
            })
            .unwrap();
    }

    for _ in 0..1000 {
        rx.recv().unwrap();
    }

    let set = completed.lock().unwrap();
    assert_eq!(set.len(), 1000);
}

#[test]
fn test_submit_after_shutdown_fails() {
    let executor = executor(2);
    executor.shutdown();

    assert!(executor.is_shutdown());
    assert!(matches!(
        executor.submit(|| {}),
        Err(StrandError::ExecutorShutdown)
    ));
}

#[test]
fn test_shutdown_drops_queued_jobs() {
    let mut executor = executor(1);
    let ran = Arc::new(AtomicUsize::new(0));
    let (started_tx, started_rx) = mpsc::channel();

    executor
        .submit(move || {
            started_tx.send(()).unwrap();
            thread::sleep(Duration::from_millis(50));
        })
        .unwrap();

    started_rx.recv().unwrap();

    for _ in 0..5 {
        let ran = ran.clone();
        executor
            .submit(move || {
                ran.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
    }
    assert_eq!(executor.pending(), 5);

    executor.shutdown();
    executor.join();

    assert_eq!(ran.load(Ordering::SeqCst), 0);
    assert_eq!(executor.pending(), 0);
}

#[test]
fn test_panicking_job_does_not_kill_the_thread() {
    let executor = executor(1);
    let (tx, rx) = mpsc::channel();

    executor.submit(|| panic!("job exploded")).unwrap();
    executor.submit(move || tx.send(7).unwrap()).unwrap();

    assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), 7);
}

#[test]
#[should_panic(expected = "worker_threads must be > 0")]
fn test_worker_threads_zero_panics() {
    let _ = strand::LoopBuilder::new().worker_threads(0).build();
}

#[test]
fn test_sequential_executors() {
    for n in 1..=4 {
        let executor = executor(n);
        assert_eq!(executor.threads(), n);
        drop(executor);
    }
}
