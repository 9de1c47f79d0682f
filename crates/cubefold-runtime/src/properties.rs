use cubefold_common::backtrace::BackTrace;
use serde::{Deserialize, Serialize};

use crate::{memory_management::MemoryDeviceProperties, server::ResourceLimitError};

/// Properties of the hardware a runtime executes cubes on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HardwareProperties {
    /// Maximum number of units a single cube can hold.
    pub max_units_per_cube: u32,
    /// Maximum number of cubes a single launch can hold.
    pub max_cube_count: u32,
    /// Number of units executing in lock-step, `None` when the hardware offers no such
    /// guarantee and every exchange through shared memory needs a barrier.
    pub plane_size: Option<u32>,
    /// Shared memory available to a single cube, in bytes.
    pub max_shared_memory_size: usize,
    /// Number of shared memory banks accessed in parallel.
    pub shared_memory_banks: u32,
}

/// Properties of a device: hardware limits and memory limits.
#[derive(Debug, Clone, new)]
pub struct DeviceProperties {
    /// The hardware limits.
    pub hardware: HardwareProperties,
    /// The memory limits.
    pub memory: MemoryDeviceProperties,
}

impl HardwareProperties {
    /// The maximum number of units a cube can hold when every unit keeps `footprint` bytes of
    /// shared memory.
    ///
    /// The result is a power of two, so that it can be halved repeatedly down to a single unit.
    /// Fails when not even one unit fits in shared memory.
    pub fn reduction_unit_max(&self, footprint: usize) -> Result<u32, ResourceLimitError> {
        let footprint = footprint.max(1);
        let fit_in_shared = self.max_shared_memory_size / footprint;

        if fit_in_shared == 0 {
            return Err(ResourceLimitError::SharedMemory {
                requested: footprint,
                max: self.max_shared_memory_size,
                backtrace: BackTrace::capture(),
            });
        }

        let units = fit_in_shared.min(self.max_units_per_cube.max(1) as usize) as u32;

        Ok(prev_power_of_two(units))
    }

    /// The maximum number of cubes a launch can hold, rounded down to a power of two.
    pub fn cube_count_max(&self) -> u32 {
        prev_power_of_two(self.max_cube_count.max(1))
    }

    /// Whether the first `active_units` units of a cube must synchronize before exchanging
    /// data through shared memory.
    pub fn requires_sync(&self, active_units: u32) -> bool {
        requires_sync(self.plane_size, active_units)
    }
}

/// Whether the first `active_units` units of a cube span more than one plane.
///
/// Without lock-step planes every exchange requires a barrier.
pub fn requires_sync(plane_size: Option<u32>, active_units: u32) -> bool {
    match plane_size {
        Some(plane_size) => plane_size < active_units,
        None => true,
    }
}

/// Largest power of two smaller or equal to `value`, zero stays zero.
pub fn prev_power_of_two(value: u32) -> u32 {
    match value {
        0 => 0,
        value => 1 << (u32::BITS - 1 - value.leading_zeros()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn properties() -> HardwareProperties {
        HardwareProperties {
            max_units_per_cube: 1024,
            max_cube_count: 65535,
            plane_size: Some(32),
            max_shared_memory_size: 48 * 1024,
            shared_memory_banks: 32,
        }
    }

    #[test]
    fn prev_power_of_two_rounds_down() {
        assert_eq!(prev_power_of_two(0), 0);
        assert_eq!(prev_power_of_two(1), 1);
        assert_eq!(prev_power_of_two(6), 4);
        assert_eq!(prev_power_of_two(64), 64);
        assert_eq!(prev_power_of_two(65535), 32768);
        assert_eq!(prev_power_of_two(u32::MAX), 1 << 31);
    }

    #[test]
    fn unit_max_bounded_by_units_per_cube() {
        assert_eq!(properties().reduction_unit_max(4).unwrap(), 1024);
    }

    #[test]
    fn unit_max_bounded_by_shared_memory() {
        // 48 KiB / 132 bytes = 372 slots, rounded to 256.
        assert_eq!(properties().reduction_unit_max(132).unwrap(), 256);
    }

    #[test]
    fn unit_max_rejects_oversized_values() {
        let err = properties().reduction_unit_max(64 * 1024).unwrap_err();

        assert!(matches!(
            err,
            ResourceLimitError::SharedMemory {
                requested: 65536,
                max: 49152,
                ..
            }
        ));
    }

    #[test]
    fn cube_count_max_is_power_of_two() {
        assert_eq!(properties().cube_count_max(), 32768);
    }

    #[test]
    fn sync_only_across_planes() {
        let props = properties();

        assert!(props.requires_sync(64));
        assert!(props.requires_sync(33));
        assert!(!props.requires_sync(32));
        assert!(!props.requires_sync(2));
        assert!(requires_sync(None, 1));
    }
}
