use cubefold_runtime::{
    HardwareProperties,
    server::{CubeCount, CubeDim},
};

use crate::{ReduceError, ReduceStrategy, SlotLayout};

/// Which execution path a reduction takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReducePath {
    /// One launch of a single cube.
    SingleCube,
    /// One launch writing a partial value per cube, then one launch merging them.
    MultiCube,
}

/// The launch shape of a reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReduceConfig {
    /// The execution path.
    pub path: ReducePath,
    /// Cubes of the first launch.
    pub cube_count: u32,
    /// Units per cube of the first launch.
    pub cube_dim: u32,
    /// Layout of the values in shared memory.
    pub layout: SlotLayout,
}

impl ReduceConfig {
    /// Partitions `work_count` indices for the device, or applies the forced strategy.
    ///
    /// Fails with [ReduceError::Configuration] when a single slot doesn't fit in shared memory.
    pub fn generate(
        properties: &HardwareProperties,
        work_count: usize,
        layout: SlotLayout,
        strategy: Option<ReduceStrategy>,
    ) -> Result<Self, ReduceError> {
        let max_units = properties.reduction_unit_max(layout.slot_bytes())?;

        let config = match strategy {
            None => {
                let (path, cube_count, cube_dim) =
                    partition(work_count, max_units, properties.cube_count_max());
                Self {
                    path,
                    cube_count,
                    cube_dim,
                    layout,
                }
            }
            Some(strategy) => match strategy.validate(properties, max_units)? {
                ReduceStrategy::SingleCube { cube_dim } => Self {
                    path: ReducePath::SingleCube,
                    cube_count: 1,
                    cube_dim,
                    layout,
                },
                ReduceStrategy::MultiCube { cube_count } => Self {
                    path: ReducePath::MultiCube,
                    cube_count,
                    cube_dim: max_units,
                    layout,
                },
            },
        };

        log::debug!("Reduce of {work_count} indices with {config:?}");

        Ok(config)
    }

    /// Cube count of the first launch.
    pub fn launch_count(&self) -> CubeCount {
        CubeCount::new_1d(self.cube_count)
    }

    /// Cube dim of the first launch.
    pub fn launch_dim(&self) -> CubeDim {
        CubeDim::new_1d(self.cube_dim)
    }

    /// Shared memory words of a cube of the first launch.
    pub fn shared_words(&self) -> usize {
        self.layout.words(self.cube_dim)
    }
}

/// Picks the path, the cube count and the units per cube for `work_count` indices.
///
/// `max_units` and `max_cubes` must be powers of two. Work that fits in one cube runs on a single
/// cube whose unit count is halved until nearly every unit has an index. Larger work runs on
/// cubes of `max_units` units, whose count is halved the same way. The merge launch uses one
/// unit per cube, so there are never more cubes than `max_units`.
pub fn partition(work_count: usize, max_units: u32, max_cubes: u32) -> (ReducePath, u32, u32) {
    let max_units = max_units.max(1);

    if work_count <= max_units as usize {
        let mut units = max_units;
        while units > 1 && work_count <= (units >> 1) as usize {
            units >>= 1;
        }

        (ReducePath::SingleCube, 1, units)
    } else {
        let mut cubes = max_cubes.clamp(1, max_units);
        while cubes > 1 && work_count <= max_units as usize * (cubes >> 1) as usize {
            cubes >>= 1;
        }

        (ReducePath::MultiCube, cubes, max_units)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn small_work_halves_units() {
        assert_eq!(partition(5, 64, 64), (ReducePath::SingleCube, 1, 8));
        assert_eq!(partition(4, 64, 64), (ReducePath::SingleCube, 1, 4));
        assert_eq!(partition(1, 64, 64), (ReducePath::SingleCube, 1, 1));
    }

    #[test]
    fn empty_work_runs_one_unit() {
        assert_eq!(partition(0, 64, 64), (ReducePath::SingleCube, 1, 1));
    }

    #[test]
    fn threshold_stays_on_a_single_cube() {
        assert_eq!(partition(63, 64, 64), (ReducePath::SingleCube, 1, 64));
        assert_eq!(partition(64, 64, 64), (ReducePath::SingleCube, 1, 64));
        assert_eq!(partition(65, 64, 64), (ReducePath::MultiCube, 2, 64));
    }

    #[test]
    fn large_work_halves_cubes() {
        assert_eq!(partition(1000, 64, 64), (ReducePath::MultiCube, 16, 64));
        assert_eq!(partition(1024, 64, 64), (ReducePath::MultiCube, 16, 64));
        assert_eq!(partition(1025, 64, 64), (ReducePath::MultiCube, 32, 64));
        assert_eq!(partition(1_000_000, 64, 64), (ReducePath::MultiCube, 64, 64));
    }

    #[test]
    fn cubes_never_exceed_max_units() {
        assert_eq!(partition(1_000_000, 8, 1024), (ReducePath::MultiCube, 8, 8));
    }

    #[test]
    fn single_cube_device() {
        assert_eq!(partition(1000, 64, 1), (ReducePath::MultiCube, 1, 64));
    }

    #[test]
    fn generate_uses_shared_memory_limit() {
        let properties = HardwareProperties {
            max_units_per_cube: 1024,
            max_cube_count: 100,
            plane_size: Some(32),
            max_shared_memory_size: 33 * 4 * 16,
            shared_memory_banks: 32,
        };
        let layout = SlotLayout::new::<[u32; 32]>(32);

        let config = ReduceConfig::generate(&properties, 10_000, layout, None).unwrap();

        assert_eq!(config.path, ReducePath::MultiCube);
        assert_eq!(config.cube_dim, 16);
        assert_eq!(config.cube_count, 16);
        assert_eq!(config.shared_words(), 33 * 16);
    }

    #[test]
    fn generate_fails_when_a_slot_does_not_fit() {
        let properties = HardwareProperties {
            max_units_per_cube: 64,
            max_cube_count: 64,
            plane_size: None,
            max_shared_memory_size: 16,
            shared_memory_banks: 32,
        };
        let layout = SlotLayout::new::<[u32; 8]>(32);

        let result = ReduceConfig::generate(&properties, 10, layout, None);

        assert!(matches!(result, Err(ReduceError::Configuration(_))));
    }

    #[test]
    fn generate_applies_forced_strategy() {
        let properties = HardwareProperties {
            max_units_per_cube: 64,
            max_cube_count: 64,
            plane_size: None,
            max_shared_memory_size: 48 * 1024,
            shared_memory_banks: 32,
        };
        let layout = SlotLayout::new::<u64>(32);

        let config = ReduceConfig::generate(
            &properties,
            10,
            layout,
            Some(ReduceStrategy::MultiCube { cube_count: 1 }),
        )
        .unwrap();

        assert_eq!(config.path, ReducePath::MultiCube);
        assert_eq!(config.cube_count, 1);
        assert_eq!(config.cube_dim, 64);
    }
}
