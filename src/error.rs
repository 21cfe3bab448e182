//! Errors returned by navigation state operations.

use thiserror::Error;

/// A rejected navigation operation. The state that returned it is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    /// The nodes handed to `set` or `append` were empty or not loaded.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// `remove` asked for more nodes than exist after the current one.
    #[error("cannot remove {requested} nodes, only {available} are ahead of the current node")]
    OutOfRange {
        /// Number of nodes requested for removal.
        requested: usize,
        /// Number of nodes after the current node.
        available: usize,
    },
}
