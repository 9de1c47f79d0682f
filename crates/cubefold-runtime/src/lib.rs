#![warn(missing_docs)]

//! cubefold runtime crate: the device model kernels are written against, memory management
//! for device buffers, and the configuration and logging shared by every runtime.

#[macro_use]
extern crate derive_new;

mod base;
pub use base::*;

mod properties;
pub use properties::*;

/// Compute client module.
pub mod client;
/// Configuration module.
pub mod config;
/// Kernel and unit execution model.
pub mod kernel;
/// Server logging.
pub mod logging;
/// Memory management module.
pub mod memory_management;
/// Runtime trait.
pub mod runtime;
/// Compute server module.
pub mod server;
/// Compute storage module.
pub mod storage;
/// Launch validation against hardware limits.
pub mod validation;
