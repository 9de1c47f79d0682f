//! CPU runtime for cubefold.
//!
//! Every cube of a launch is executed by one worker thread, which spawns one scoped thread per
//! unit of the cube so that units can block on the cube barrier like they would on a device.

#[macro_use]
extern crate derive_new;

#[cfg(test)]
mod tests {
    pub type TestRuntime = crate::CpuRuntime;

    pub use half::f16;

    cubefold_reduce::testgen_reduce!([f16, f32]);
}

pub mod compute;
pub mod device;
pub mod runtime;

pub use device::CpuDevice;
pub use runtime::*;
