//! The designated executor behind the deferred policies.

use crate::error::ExecutorError;

/// A unit of work handed to an executor.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// A single-threaded FIFO executor.
///
/// Every task submitted to one executor runs on the same thread, one at a
/// time, in submission order. Deferred dispatch relies on this to keep all
/// listener calls of a given role off each other's toes.
pub trait DesignatedExecutor: Send + Sync {
    /// Queues `task` behind every task submitted before it.
    fn execute(&self, task: Task) -> Result<(), ExecutorError>;

    /// Returns `true` when called from the executor's own thread.
    fn is_designated_thread(&self) -> bool;
}
