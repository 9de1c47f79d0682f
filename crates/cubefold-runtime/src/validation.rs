use cubefold_common::{backtrace::BackTrace, word::WORD_SIZE};

use crate::{
    HardwareProperties,
    server::{CubeCount, CubeDim, LaunchError, ResourceLimitError},
};

/// Validate the total units of a cube fits within the hardware limits.
pub fn validate_units(properties: &HardwareProperties, dim: CubeDim) -> Result<(), LaunchError> {
    let requested = dim.num_elems();
    let max = properties.max_units_per_cube;
    if requested == 0 || requested > max {
        Err(ResourceLimitError::Units {
            requested,
            max,
            backtrace: BackTrace::capture(),
        }
        .into())
    } else {
        Ok(())
    }
}

/// Validate the number of cubes of a launch fits within the hardware limits.
pub fn validate_cube_count(
    properties: &HardwareProperties,
    count: CubeCount,
) -> Result<(), LaunchError> {
    let requested = count.num_cubes();
    let max = properties.max_cube_count;
    if requested == 0 || requested > max {
        Err(ResourceLimitError::CubeCount {
            requested,
            max,
            backtrace: BackTrace::capture(),
        }
        .into())
    } else {
        Ok(())
    }
}

/// Validate the shared memory of a cube fits within the hardware limits.
pub fn validate_shared_memory(
    properties: &HardwareProperties,
    shared_words: usize,
) -> Result<(), LaunchError> {
    let requested = shared_words * WORD_SIZE;
    let max = properties.max_shared_memory_size;
    if requested > max {
        Err(ResourceLimitError::SharedMemory {
            requested,
            max,
            backtrace: BackTrace::capture(),
        }
        .into())
    } else {
        Ok(())
    }
}

/// Validate a whole launch.
pub fn validate_launch(
    properties: &HardwareProperties,
    count: CubeCount,
    dim: CubeDim,
    shared_words: usize,
) -> Result<(), LaunchError> {
    validate_units(properties, dim)?;
    validate_cube_count(properties, count)?;
    validate_shared_memory(properties, shared_words)
}
