//! Tree reduction of work ranges over the cubes of a compute device.
//!
//! ```
//! # #[cfg(feature = "cpu")]
//! # {
//! use cubefold::prelude::*;
//!
//! struct Squares;
//!
//! impl ReduceFunctor for Squares {
//!     type Value = u64;
//!
//!     fn init(&self, value: &mut u64) {
//!         *value = 0;
//!     }
//!
//!     fn accumulate(&self, index: usize, value: &mut u64) {
//!         *value += (index * index) as u64;
//!     }
//!
//!     fn join(&self, value: &mut u64, other: &u64) {
//!         *value += *other;
//!     }
//! }
//!
//! let client = CpuRuntime::client(&CpuDevice);
//! let value = reduce::<CpuRuntime, _>(&client, 10, &Squares, None).unwrap();
//!
//! assert_eq!(value, 285);
//! # }
//! ```

pub use cubefold_common as common;
pub use cubefold_reduce as reduce;
pub use cubefold_runtime as runtime;

#[cfg(feature = "cpu")]
pub use cubefold_cpu as cpu;

/// The types needed to write and run a reduction.
pub mod prelude {
    pub use cubefold_reduce::{
        ArgMax, ArgMin, Max, Mean, Min, Prod, ReduceError, ReduceFunctor, ReduceInstruction,
        ReduceStrategy, Sum, reduce, reduce_slice, reduce_with_finalize,
    };
    pub use cubefold_runtime::{client::ComputeClient, config::GlobalConfig, runtime::Runtime};

    #[cfg(feature = "cpu")]
    pub use cubefold_cpu::{CpuDevice, CpuRuntime};
}
