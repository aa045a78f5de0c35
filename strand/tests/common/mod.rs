#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;
use std::sync::Once;

use strand::{AsyncHook, AsyncId, EventLoop, HookEvent, LoopBuilder, TypeTag};
use tracing_subscriber::EnvFilter;

static INIT_LOGGING: Once = Once::new();

/// Initialize test logging once per test binary.
///
/// Honors `RUST_LOG`; defaults to `strand=debug`.
pub fn init_test_logging() {
    INIT_LOGGING.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("strand=debug"));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_thread_names(true)
            .with_ansi(false)
            .try_init();
    });
}

/// Builds a loop with `threads` pool threads and test logging enabled.
pub fn event_loop(threads: usize) -> EventLoop {
    init_test_logging();

    LoopBuilder::new()
        .worker_threads(threads)
        .build()
        .expect("failed to build event loop")
}

/// Shared, inspectable list of recorded hook events.
#[derive(Clone, Default)]
pub struct EventLog(Rc<RefCell<Vec<HookEvent>>>);

impl EventLog {
    pub fn events(&self) -> Vec<HookEvent> {
        self.0.borrow().clone()
    }

    pub fn push(&self, event: HookEvent) {
        self.0.borrow_mut().push(event);
    }

    /// Ids that reported `init`, in order.
    pub fn init_ids(&self) -> Vec<AsyncId> {
        self.0
            .borrow()
            .iter()
            .filter_map(|e| match e {
                HookEvent::Init { id, .. } => Some(*id),
                _ => None,
            })
            .collect()
    }

    /// Names of the events recorded for `id`, in order.
    pub fn kinds_for(&self, id: AsyncId) -> Vec<&'static str> {
        self.0
            .borrow()
            .iter()
            .filter(|e| e.id() == id)
            .map(kind)
            .collect()
    }

    /// Trigger id reported by `id`'s init, if recorded.
    pub fn trigger_of(&self, id: AsyncId) -> Option<AsyncId> {
        self.0.borrow().iter().find_map(|e| match e {
            HookEvent::Init {
                id: init, trigger, ..
            } if *init == id => Some(*trigger),
            _ => None,
        })
    }

    pub fn count(&self, name: &str) -> usize {
        self.0.borrow().iter().filter(|e| kind(e) == name).count()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}

pub fn kind(event: &HookEvent) -> &'static str {
    match event {
        HookEvent::Init { .. } => "init",
        HookEvent::Before(_) => "before",
        HookEvent::After(_) => "after",
        HookEvent::Destroy(_) => "destroy",
    }
}

/// Hook that records every event of resources whose tag starts with a
/// prefix. Without a prefix, every event is recorded, including events of
/// resources whose `init` happened before the hook was enabled.
pub struct Recorder {
    prefix: Option<&'static str>,
    tracked: RefCell<HashSet<AsyncId>>,
    log: EventLog,
}

impl Recorder {
    pub fn with_prefix(prefix: &'static str) -> (Self, EventLog) {
        Self::new(Some(prefix))
    }

    pub fn all() -> (Self, EventLog) {
        Self::new(None)
    }

    fn new(prefix: Option<&'static str>) -> (Self, EventLog) {
        let log = EventLog::default();
        let recorder = Self {
            prefix,
            tracked: RefCell::new(HashSet::new()),
            log: log.clone(),
        };
        (recorder, log)
    }

    fn wants(&self, id: AsyncId) -> bool {
        self.prefix.is_none() || self.tracked.borrow().contains(&id)
    }
}

impl AsyncHook for Recorder {
    fn init(&self, id: AsyncId, tag: &TypeTag, trigger: AsyncId) {
        if self.prefix.is_some_and(|p| !tag.starts_with(p)) {
            return;
        }
        self.tracked.borrow_mut().insert(id);
        self.log.push(HookEvent::Init {
            id,
            tag: tag.clone(),
            trigger,
        });
    }

    fn before(&self, id: AsyncId) {
        if self.wants(id) {
            self.log.push(HookEvent::Before(id));
        }
    }

    fn after(&self, id: AsyncId) {
        if self.wants(id) {
            self.log.push(HookEvent::After(id));
        }
    }

    fn destroy(&self, id: AsyncId) {
        if self.wants(id) {
            self.log.push(HookEvent::Destroy(id));
        }
    }
}
