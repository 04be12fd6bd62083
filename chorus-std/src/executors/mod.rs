//! Standard designated executors.

pub mod designated;
pub mod inline;

pub use designated::DesignatedThread;
pub use inline::InlineExecutor;
