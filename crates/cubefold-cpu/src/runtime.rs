use std::sync::Arc;

use cubefold_runtime::{
    ComputeRuntime, DeviceProperties, HardwareProperties,
    client::ComputeClient,
    config::GlobalConfig,
    memory_management::{MemoryDeviceProperties, MemoryManagement},
    runtime::Runtime,
    storage::{ComputeStorage, WordStorage},
};
use sysinfo::System;

use crate::{
    compute::{scheduler::Scheduler, server::CpuServer},
    device::CpuDevice,
};

/// Default number of units in a cube of the CPU device.
pub const DEFAULT_MAX_UNITS_PER_CUBE: u32 = 64;
/// Default number of cubes in a launch of the CPU device.
pub const DEFAULT_MAX_CUBE_COUNT: u32 = 64;
/// Default shared memory of a cube of the CPU device, in bytes.
pub const DEFAULT_MAX_SHARED_MEMORY_SIZE: usize = 48 * 1024;
/// Default number of shared memory banks of the CPU device.
pub const DEFAULT_SHARED_MEMORY_BANKS: u32 = 32;

/// Options used to create a CPU client.
pub struct RuntimeOptions {
    /// Logging configuration and device limits overrides.
    pub config: Arc<GlobalConfig>,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            config: GlobalConfig::get(),
        }
    }
}

/// Runtime executing cubes on the threads of the host.
#[derive(Debug)]
pub struct CpuRuntime;

static RUNTIME: ComputeRuntime<CpuDevice, Server> = ComputeRuntime::new();

type Server = CpuServer;

/// Creates a new client for the CPU device, not shared with [CpuRuntime::client].
pub fn create_client(options: RuntimeOptions) -> ComputeClient<Server> {
    let device = &options.config.device;

    let max_memory = device.max_memory.unwrap_or_else(|| {
        let system = System::new_all();
        system
            .cgroup_limits()
            .map(|g| g.total_memory)
            .unwrap_or(system.total_memory())
    });
    let hardware = HardwareProperties {
        max_units_per_cube: device
            .max_units_per_cube
            .unwrap_or(DEFAULT_MAX_UNITS_PER_CUBE),
        max_cube_count: device.max_cube_count.unwrap_or(DEFAULT_MAX_CUBE_COUNT),
        // Units of a cube are OS threads, nothing runs in lock-step.
        plane_size: None,
        max_shared_memory_size: device
            .max_shared_memory_size
            .unwrap_or(DEFAULT_MAX_SHARED_MEMORY_SIZE),
        shared_memory_banks: device
            .shared_memory_banks
            .unwrap_or(DEFAULT_SHARED_MEMORY_BANKS),
    };
    let mem_properties = MemoryDeviceProperties {
        max_memory,
        alignment: WordStorage::ALIGNMENT as u64,
    };
    let scheduler = match device.worker_count {
        Some(count) => Scheduler::new(count),
        None => Scheduler::default(),
    };

    log::debug!(
        "Creating cpu client with {hardware:?}, {} workers",
        scheduler.worker_count()
    );

    let memory_management = MemoryManagement::new(WordStorage::default(), mem_properties.clone());
    let server = CpuServer::new(memory_management, scheduler, hardware.plane_size);

    ComputeClient::new(
        server,
        DeviceProperties::new(hardware, mem_properties),
        options.config,
    )
}

impl Runtime for CpuRuntime {
    type Server = CpuServer;
    type Device = CpuDevice;

    fn client(device: &Self::Device) -> ComputeClient<Self::Server> {
        RUNTIME.client(device, move || create_client(RuntimeOptions::default()))
    }

    fn name(_client: &ComputeClient<Self::Server>) -> &'static str {
        "cpu"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubefold_runtime::config::device::DeviceConfig;

    #[test]
    fn config_overrides_device_limits() {
        let config = GlobalConfig {
            device: DeviceConfig {
                max_units_per_cube: Some(8),
                max_cube_count: Some(4),
                max_memory: Some(4096),
                worker_count: Some(2),
                ..Default::default()
            },
            ..Default::default()
        };

        let client = create_client(RuntimeOptions {
            config: Arc::new(config),
        });
        let properties = client.properties();

        assert_eq!(properties.hardware.max_units_per_cube, 8);
        assert_eq!(properties.hardware.max_cube_count, 4);
        assert_eq!(properties.hardware.plane_size, None);
        assert_eq!(
            properties.hardware.max_shared_memory_size,
            DEFAULT_MAX_SHARED_MEMORY_SIZE
        );
        assert_eq!(properties.memory.max_memory, 4096);
        assert_eq!(properties.memory.alignment, 4);
    }

    #[test]
    fn clients_of_the_runtime_are_shared() {
        let client = CpuRuntime::client(&CpuDevice);
        let handle = client.allocate(4, 1, "shared").unwrap();

        let other = CpuRuntime::client(&CpuDevice);
        assert!(other.binding(&handle).is_ok());

        other.dealloc(handle).unwrap();
        assert_eq!(CpuRuntime::name(&client), "cpu");
    }
}
