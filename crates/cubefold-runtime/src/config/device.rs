/// Overrides of the limits a runtime reports for its devices.
///
/// Every field left empty keeps the runtime default.
#[derive(Default, Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DeviceConfig {
    /// Maximum number of units in a cube.
    #[serde(default)]
    pub max_units_per_cube: Option<u32>,

    /// Maximum number of cubes in a launch.
    #[serde(default)]
    pub max_cube_count: Option<u32>,

    /// Maximum shared memory of a cube, in bytes.
    #[serde(default)]
    pub max_shared_memory_size: Option<usize>,

    /// Number of shared memory banks.
    #[serde(default)]
    pub shared_memory_banks: Option<u32>,

    /// Maximum global memory, in bytes.
    #[serde(default)]
    pub max_memory: Option<u64>,

    /// Number of OS threads executing cubes, for runtimes that simulate a device.
    #[serde(default)]
    pub worker_count: Option<usize>,
}
