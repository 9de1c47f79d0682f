use cubefold_runtime::HardwareProperties;
use serde::{Deserialize, Serialize};

use crate::ReduceError;

/// Forces the shape of a reduction instead of letting it be derived from the work count.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum ReduceStrategy {
    /// A single cube of `cube_dim` units reduces everything and finalizes.
    SingleCube {
        /// Units in the cube.
        cube_dim: u32,
    },
    /// `cube_count` cubes of the maximum number of units each write a partial value, then a
    /// single cube of `cube_count` units merges the partial values and finalizes.
    MultiCube {
        /// Cubes of the first launch.
        cube_count: u32,
    },
}

impl ReduceStrategy {
    /// Checks the strategy can run on the device when a cube holds at most `max_units` units.
    pub fn validate(
        self,
        properties: &HardwareProperties,
        max_units: u32,
    ) -> Result<Self, ReduceError> {
        match self {
            ReduceStrategy::SingleCube { cube_dim } => {
                if cube_dim == 0 || cube_dim > max_units {
                    return Err(ReduceError::InvalidStrategy {
                        reason: format!(
                            "A single cube must hold between 1 and {max_units} units, got {cube_dim}"
                        ),
                    });
                }
            }
            ReduceStrategy::MultiCube { cube_count } => {
                // The merge launch uses one unit per cube.
                let max = properties.max_cube_count.min(max_units);
                if cube_count == 0 || cube_count > max {
                    return Err(ReduceError::InvalidStrategy {
                        reason: format!(
                            "Multiple cubes must be between 1 and {max} cubes, got {cube_count}"
                        ),
                    });
                }
            }
        }

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn properties() -> HardwareProperties {
        HardwareProperties {
            max_units_per_cube: 64,
            max_cube_count: 16,
            plane_size: None,
            max_shared_memory_size: 1024,
            shared_memory_banks: 32,
        }
    }

    #[test]
    fn single_cube_is_bounded_by_max_units() {
        let properties = properties();

        assert!(ReduceStrategy::SingleCube { cube_dim: 32 }
            .validate(&properties, 32)
            .is_ok());
        assert!(ReduceStrategy::SingleCube { cube_dim: 33 }
            .validate(&properties, 32)
            .is_err());
        assert!(ReduceStrategy::SingleCube { cube_dim: 0 }
            .validate(&properties, 32)
            .is_err());
    }

    #[test]
    fn multi_cube_is_bounded_by_cube_count_and_max_units() {
        let properties = properties();

        assert!(ReduceStrategy::MultiCube { cube_count: 16 }
            .validate(&properties, 64)
            .is_ok());
        assert!(ReduceStrategy::MultiCube { cube_count: 17 }
            .validate(&properties, 64)
            .is_err());
        assert!(matches!(
            ReduceStrategy::MultiCube { cube_count: 9 }.validate(&properties, 8),
            Err(ReduceError::InvalidStrategy { .. })
        ));
    }
}
