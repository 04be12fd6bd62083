//! Synchronous stand-in for the designated executor.

use chorus_core::{DesignatedExecutor, ExecutorError, Task};

/// A [`DesignatedExecutor`] that runs every task immediately on the calling
/// thread.
///
/// Useful in tests and in single-threaded programs: deferred dispatch then
/// behaves like direct dispatch, with the deferred policies' error handling.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineExecutor;

impl DesignatedExecutor for InlineExecutor {
    fn execute(&self, task: Task) -> Result<(), ExecutorError> {
        task();
        Ok(())
    }

    fn is_designated_thread(&self) -> bool {
        false
    }
}
