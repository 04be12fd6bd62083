#![allow(dead_code)]

use chorus::{
    ListenerResult,
    testing::{CallLog, CountdownLatch},
};
use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    thread,
    time::Duration,
};

// ============================================================================
// Test Capability
// ============================================================================

#[chorus::capability]
pub trait TestListener {
    fn ping(&self) -> ListenerResult;
    fn value(&self, value: u32, label: String) -> ListenerResult;
}

/// One recorded call: which listener, which method, with what.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Call {
    pub listener: usize,
    pub what: String,
}

impl Call {
    pub fn new(listener: usize, what: impl Into<String>) -> Self {
        Self {
            listener,
            what: what.into(),
        }
    }
}

// ============================================================================
// Test Listeners
// ============================================================================

/// Records every call in a shared log; fails after recording when `fail` is set.
pub struct RecordingListener {
    pub id: usize,
    pub log: Arc<CallLog<Call>>,
    pub fail: bool,
}

impl RecordingListener {
    pub fn new(id: usize, log: &Arc<CallLog<Call>>) -> Arc<Self> {
        Arc::new(Self {
            id,
            log: Arc::clone(log),
            fail: false,
        })
    }

    pub fn failing(id: usize, log: &Arc<CallLog<Call>>) -> Arc<Self> {
        Arc::new(Self {
            id,
            log: Arc::clone(log),
            fail: true,
        })
    }

    fn outcome(&self) -> ListenerResult {
        if self.fail {
            return Err(format!("listener {} failed", self.id).into());
        }
        Ok(())
    }
}

impl TestListener for RecordingListener {
    fn ping(&self) -> ListenerResult {
        self.log.record(Call::new(self.id, "ping"));
        self.outcome()
    }

    fn value(&self, value: u32, label: String) -> ListenerResult {
        self.log
            .record(Call::new(self.id, format!("value {value} {label}")));
        self.outcome()
    }
}

/// Counts calls and optionally counts down a latch.
#[derive(Default)]
pub struct CountingListener {
    pub calls: AtomicUsize,
    pub latch: Option<Arc<CountdownLatch>>,
    pub panics: bool,
}

impl CountingListener {
    pub fn with_latch(latch: &Arc<CountdownLatch>) -> Arc<Self> {
        Arc::new(Self {
            latch: Some(Arc::clone(latch)),
            ..Self::default()
        })
    }

    pub fn panicking() -> Arc<Self> {
        Arc::new(Self {
            panics: true,
            ..Self::default()
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) -> ListenerResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.panics {
            panic!("counting listener told to panic");
        }
        if let Some(latch) = &self.latch {
            latch.count_down();
        }
        Ok(())
    }
}

impl TestListener for CountingListener {
    fn ping(&self) -> ListenerResult {
        self.hit()
    }

    fn value(&self, _value: u32, _label: String) -> ListenerResult {
        self.hit()
    }
}

/// Records the name of the thread each call runs on.
pub struct ThreadNameListener {
    pub names: Arc<CallLog<Option<String>>>,
}

impl ThreadNameListener {
    pub fn new(names: &Arc<CallLog<Option<String>>>) -> Arc<Self> {
        Arc::new(Self {
            names: Arc::clone(names),
        })
    }

    fn record(&self) -> ListenerResult {
        self.names
            .record(thread::current().name().map(str::to_owned));
        Ok(())
    }
}

impl TestListener for ThreadNameListener {
    fn ping(&self) -> ListenerResult {
        self.record()
    }

    fn value(&self, _value: u32, _label: String) -> ListenerResult {
        self.record()
    }
}

/// Holds every call until `gate` opens, then records it.
pub struct GatedListener {
    pub gate: Arc<CountdownLatch>,
    pub log: Arc<CallLog<Call>>,
}

impl GatedListener {
    pub fn new(gate: &Arc<CountdownLatch>, log: &Arc<CallLog<Call>>) -> Arc<Self> {
        Arc::new(Self {
            gate: Arc::clone(gate),
            log: Arc::clone(log),
        })
    }

    fn pass(&self, what: &str) -> ListenerResult {
        self.gate.wait_timeout(Duration::from_secs(10));
        self.log.record(Call::new(0, what));
        Ok(())
    }
}

impl TestListener for GatedListener {
    fn ping(&self) -> ListenerResult {
        self.pass("ping")
    }

    fn value(&self, value: u32, label: String) -> ListenerResult {
        self.pass(&format!("value {value} {label}"))
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Routes `tracing` output to the test harness; honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
