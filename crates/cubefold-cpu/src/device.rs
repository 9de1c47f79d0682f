use cubefold_common::device::Device;

/// The host CPU, seen as a single device.
#[derive(Clone, PartialEq, Eq, Default, Hash)]
pub struct CpuDevice;

impl core::fmt::Debug for CpuDevice {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Cpu")
    }
}

impl Device for CpuDevice {}
