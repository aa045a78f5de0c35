mod common;

use common::{Recorder, event_loop};

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use strand::work::CompletionQueue;

#[test]
fn test_drain_returns_everything_once() {
    let queue = CompletionQueue::new(|| {});

    queue.push(1);
    queue.push(2);
    queue.push(3);
    assert_eq!(queue.len(), 3);

    assert_eq!(queue.drain_all().collect::<Vec<_>>(), [1, 2, 3]);
    assert!(queue.is_empty());
    assert_eq!(queue.drain_all().count(), 0);
}

#[test]
fn test_every_push_notifies() {
    let notified = Arc::new(AtomicUsize::new(0));
    let queue = CompletionQueue::new({
        let notified = notified.clone();
        move || {
            notified.fetch_add(1, Ordering::SeqCst);
        }
    });

    for i in 0..5 {
        queue.push(i);
    }

    assert_eq!(notified.load(Ordering::SeqCst), 5);

    // Draining does not notify.
    let _ = queue.drain_all();
    assert_eq!(notified.load(Ordering::SeqCst), 5);
}

#[test]
fn test_concurrent_pushes_are_all_drained() {
    let queue = Arc::new(CompletionQueue::new(|| {}));

    let producers: Vec<_> = (0..8)
        .map(|t| {
            let queue = queue.clone();
            thread::spawn(move || {
                for i in 0..1000 {
                    queue.push(t * 1000 + i);
                }
            })
        })
        .collect();

    let mut seen = HashSet::new();
    for producer in producers {
        producer.join().unwrap();
    }
    seen.extend(queue.drain_all());

    assert_eq!(seen.len(), 8000);
    assert!(queue.is_empty());
}

#[test]
fn test_drain_while_pushing_loses_nothing() {
    let queue = Arc::new(CompletionQueue::new(|| {}));

    let producer = {
        let queue = queue.clone();
        thread::spawn(move || {
            for i in 0..10_000 {
                queue.push(i);
            }
        })
    };

    let mut seen = Vec::new();
    while !producer.is_finished() {
        seen.extend(queue.drain_all());
    }
    producer.join().unwrap();
    seen.extend(queue.drain_all());

    assert_eq!(seen, (0..10_000).collect::<Vec<_>>());
}

#[test]
fn test_idle_loop_returns_without_events() {
    let event_loop = event_loop(1);
    let (recorder, log) = Recorder::all();
    event_loop.hooks().enable(recorder);

    event_loop.run().unwrap();
    event_loop.run().unwrap();

    assert!(log.is_empty());
    assert_eq!(event_loop.pending(), 0);
}
