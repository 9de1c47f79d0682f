mod base;

pub use base::*;

/// Allocation tracking on top of a storage.
mod memory_manage;
pub use memory_manage::*;
