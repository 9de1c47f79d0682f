/// Device limits overrides.
pub mod device;
/// Launch logging config module.
pub mod launch;
/// Memory logging config module.
pub mod memory;

mod base;
mod logger;

pub use base::*;
pub use logger::*;
