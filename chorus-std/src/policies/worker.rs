//! Dispatch on a one-shot worker thread.

use super::{deliver_guarded, report};
use chorus_core::{AsyncDispatchFailure, DispatchError, DispatchPolicy, Invocation, Listeners, Policy};
use std::thread;

/// Delivers on a freshly spawned thread that is never reused.
///
/// Listeners are still visited in snapshot order on that one thread, and a
/// failure stops the fan-out and is logged there. Separate invocations run on
/// separate threads with no ordering between them.
#[derive(Debug, Clone)]
pub struct WorkerAsync {
    name: String,
}

impl WorkerAsync {
    /// Thread name used by [`WorkerAsync::new`].
    pub const DEFAULT_NAME: &'static str = "chorus-worker";

    /// Creates the policy with the default thread name.
    pub fn new() -> Self {
        Self::with_name(Self::DEFAULT_NAME)
    }

    /// Creates the policy; spawned threads are named `name`.
    pub fn with_name(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for WorkerAsync {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized + Send + Sync + 'static> DispatchPolicy<T> for WorkerAsync {
    fn kind(&self) -> Policy {
        Policy::WorkerAsync
    }

    fn dispatch(
        &self,
        listeners: Listeners<T>,
        invocation: Invocation<T>,
    ) -> Result<(), DispatchError> {
        let method = invocation.method();
        thread::Builder::new()
            .name(self.name.clone())
            .spawn(move || {
                if let Err(source) = deliver_guarded(listeners, &invocation) {
                    report(&AsyncDispatchFailure {
                        policy: Policy::WorkerAsync,
                        method,
                        source,
                    });
                }
            })
            .map(drop)
            .map_err(|source| DispatchError::WorkerSpawn { method, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policies::fixtures::{Sink, exploding, hit, recorders, snapshot};
    use chorus_core::ListenerResult;
    use crossbeam_channel::Receiver;
    use std::{
        sync::{Arc, Mutex},
        time::Duration,
    };

    struct ThreadName {
        names: Arc<Mutex<Vec<Option<String>>>>,
        fail: bool,
    }

    impl Sink for ThreadName {
        fn hit(&self, _n: usize) -> ListenerResult {
            let name = thread::current().name().map(str::to_owned);
            self.names.lock().unwrap().push(name);
            if self.fail {
                return Err("nope".into());
            }
            Ok(())
        }
    }

    /// Blocks in the listener until the test opens the gate.
    struct Gated {
        gate: Receiver<()>,
        names: Arc<Mutex<Vec<Option<String>>>>,
    }

    impl Sink for Gated {
        fn hit(&self, _n: usize) -> ListenerResult {
            let _ = self.gate.recv_timeout(Duration::from_secs(5));
            self.names.lock().unwrap().push(None);
            Ok(())
        }
    }

    fn wait_for(names: &Mutex<Vec<Option<String>>>, len: usize) {
        for _ in 0..500 {
            if names.lock().unwrap().len() >= len {
                return;
            }
            thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn test_worker_runs_off_the_caller_thread() {
        let names = Arc::new(Mutex::new(Vec::new()));
        let listeners: Vec<Arc<dyn Sink>> = vec![Arc::new(ThreadName {
            names: Arc::clone(&names),
            fail: false,
        })];

        WorkerAsync::with_name("worker-test")
            .dispatch(snapshot(&listeners), hit(0))
            .unwrap();
        wait_for(&names, 1);

        assert_eq!(
            *names.lock().unwrap(),
            vec![Some("worker-test".to_string())]
        );
    }

    #[test]
    fn test_worker_failure_skips_remaining_listeners() {
        let names = Arc::new(Mutex::new(Vec::new()));
        let listeners: Vec<Arc<dyn Sink>> = (0..3)
            .map(|i| {
                Arc::new(ThreadName {
                    names: Arc::clone(&names),
                    fail: i == 0,
                }) as Arc<dyn Sink>
            })
            .collect();

        WorkerAsync::new()
            .dispatch(snapshot(&listeners), hit(0))
            .unwrap();
        wait_for(&names, 1);
        thread::sleep(Duration::from_millis(50));

        assert_eq!(names.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_worker_returns_before_delivery() {
        let (gate_tx, gate_rx) = crossbeam_channel::bounded::<()>(1);
        let names = Arc::new(Mutex::new(Vec::new()));
        let listeners: Vec<Arc<dyn Sink>> = vec![Arc::new(Gated {
            gate: gate_rx,
            names: Arc::clone(&names),
        })];

        WorkerAsync::new()
            .dispatch(snapshot(&listeners), hit(0))
            .unwrap();
        assert!(names.lock().unwrap().is_empty());

        gate_tx.send(()).unwrap();
        wait_for(&names, 1);
        assert_eq!(names.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_panicking_snapshot_is_contained_on_the_worker() {
        let policy = WorkerAsync::new();
        policy.dispatch(exploding(), hit(0)).unwrap();

        let (listeners, log) = recorders(2, None);
        policy.dispatch(snapshot(&listeners), hit(1)).unwrap();
        for _ in 0..500 {
            if log.lock().unwrap().len() == 2 {
                break;
            }
            thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(*log.lock().unwrap(), vec![(0, 1), (1, 1)]);
    }
}
