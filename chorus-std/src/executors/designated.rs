//! The default designated executor: one lazily started thread.

use chorus_core::{DesignatedExecutor, ExecutorError, Task};
use crossbeam_channel::{Receiver, Sender};
use once_cell::sync::OnceCell;
use std::{
    panic::{self, AssertUnwindSafe},
    thread::{self, ThreadId},
};

/// A [`DesignatedExecutor`] backed by one persistent thread and an unbounded
/// FIFO queue.
///
/// The thread is spawned on the first [`execute`](DesignatedExecutor::execute)
/// call. It runs until the executor is dropped, then drains the tasks still
/// queued and exits. Nothing else stops it: an executor kept alive keeps its
/// thread alive.
pub struct DesignatedThread {
    name: String,
    worker: OnceCell<Worker>,
}

struct Worker {
    sender: Sender<Task>,
    thread: ThreadId,
}

impl DesignatedThread {
    /// Thread name used by [`DesignatedThread::new`].
    pub const DEFAULT_NAME: &'static str = "chorus-designated";

    /// Creates an executor whose thread is named [`DEFAULT_NAME`](Self::DEFAULT_NAME).
    pub fn new() -> Self {
        Self::with_name(Self::DEFAULT_NAME)
    }

    /// Creates an executor whose thread will be named `name`.
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            worker: OnceCell::new(),
        }
    }

    /// The name of the executor's thread.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` once the thread has been spawned.
    pub fn is_started(&self) -> bool {
        self.worker.get().is_some()
    }

    fn worker(&self) -> Result<&Worker, ExecutorError> {
        self.worker.get_or_try_init(|| Worker::spawn(&self.name))
    }
}

impl Default for DesignatedThread {
    fn default() -> Self {
        Self::new()
    }
}

impl Worker {
    fn spawn(name: &str) -> Result<Self, ExecutorError> {
        let (sender, receiver) = crossbeam_channel::unbounded();
        let handle = thread::Builder::new()
            .name(name.to_owned())
            .spawn(move || run(receiver))
            .map_err(ExecutorError::Spawn)?;
        tracing::debug!(thread = %name, "designated thread started");
        Ok(Self {
            sender,
            thread: handle.thread().id(),
        })
    }
}

fn run(receiver: Receiver<Task>) {
    for task in receiver.iter() {
        if panic::catch_unwind(AssertUnwindSafe(task)).is_err() {
            tracing::warn!("designated task panicked; continuing with the next task");
        }
    }
    tracing::debug!("designated thread exiting");
}

impl DesignatedExecutor for DesignatedThread {
    fn execute(&self, task: Task) -> Result<(), ExecutorError> {
        self.worker()?
            .sender
            .send(task)
            .map_err(|_| ExecutorError::Shutdown)
    }

    fn is_designated_thread(&self) -> bool {
        self.worker
            .get()
            .is_some_and(|worker| worker.thread == thread::current().id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        sync::{Arc, Mutex},
        time::Duration,
    };

    #[test]
    fn test_tasks_run_in_fifo_order_on_one_thread() {
        let executor = DesignatedThread::with_name("fifo-test");
        let seen = Arc::new(Mutex::new(Vec::new()));
        let (done_tx, done_rx) = crossbeam_channel::bounded(1);

        for i in 0..100 {
            let seen = Arc::clone(&seen);
            executor
                .execute(Box::new(move || {
                    let name = thread::current().name().map(str::to_owned);
                    seen.lock().unwrap().push((i, name));
                }))
                .unwrap();
        }
        executor
            .execute(Box::new(move || done_tx.send(()).unwrap()))
            .unwrap();
        done_rx.recv_timeout(Duration::from_secs(5)).unwrap();

        let seen = seen.lock().unwrap();
        let order: Vec<usize> = seen.iter().map(|(i, _)| *i).collect();
        assert_eq!(order, (0..100).collect::<Vec<_>>());
        assert!(
            seen.iter()
                .all(|(_, name)| name.as_deref() == Some("fifo-test"))
        );
    }

    #[test]
    fn test_thread_starts_lazily() {
        let executor = DesignatedThread::new();
        assert!(!executor.is_started());
        assert!(!executor.is_designated_thread());
        executor.execute(Box::new(|| {})).unwrap();
        assert!(executor.is_started());
        assert!(!executor.is_designated_thread());
    }

    #[test]
    fn test_is_designated_thread_inside_task() {
        let executor = Arc::new(DesignatedThread::new());
        let inner = Arc::clone(&executor);
        let (tx, rx) = crossbeam_channel::bounded(1);
        executor
            .execute(Box::new(move || {
                tx.send(inner.is_designated_thread()).unwrap();
            }))
            .unwrap();
        assert!(rx.recv_timeout(Duration::from_secs(5)).unwrap());
    }

    #[test]
    fn test_panicking_task_does_not_stop_thread() {
        let executor = DesignatedThread::new();
        let (tx, rx) = crossbeam_channel::bounded(1);
        executor.execute(Box::new(|| panic!("boom"))).unwrap();
        executor
            .execute(Box::new(move || tx.send(()).unwrap()))
            .unwrap();
        assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok());
    }
}
