use cubefold_runtime::server::{IoError, LaunchError, ResourceLimitError};
use thiserror::Error;

/// Errors returned by a reduction.
#[derive(Error, Clone)]
pub enum ReduceError {
    /// Not even one unit can keep its value in shared memory.
    #[error("The reduced value doesn't fit in the shared memory of a cube\n{0}")]
    Configuration(#[from] ResourceLimitError),

    /// A kernel of the reduction failed.
    #[error("A reduce kernel failed\n{0}")]
    Launch(#[from] LaunchError),

    /// A buffer of the reduction couldn't be allocated, read or released.
    #[error("A reduce buffer failed\n{0}")]
    Io(#[from] IoError),

    /// The requested strategy can't run on the device.
    #[error("Invalid reduce strategy: {reason}")]
    InvalidStrategy {
        /// Why the strategy was rejected.
        reason: String,
    },
}

impl core::fmt::Debug for ReduceError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_fmt(format_args!("{self}"))
    }
}
