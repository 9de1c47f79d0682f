use super::DummyServer;
use cubefold_runtime::client::ComputeClient;
use cubefold_runtime::config::GlobalConfig;
use cubefold_runtime::memory_management::{MemoryDeviceProperties, MemoryManagement};
use cubefold_runtime::storage::WordStorage;
use cubefold_runtime::{ComputeRuntime, DeviceProperties, HardwareProperties};
use std::sync::Arc;

/// The dummy device.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct DummyDevice;

pub type DummyClient = ComputeClient<DummyServer>;

static RUNTIME: ComputeRuntime<DummyDevice, DummyServer> = ComputeRuntime::new();

pub const MAX_MEMORY: u64 = 1024;

pub fn init_client() -> DummyClient {
    let mem_properties = MemoryDeviceProperties {
        max_memory: MAX_MEMORY,
        alignment: 4,
    };
    let hardware = HardwareProperties {
        max_units_per_cube: 1,
        max_cube_count: 8,
        plane_size: None,
        max_shared_memory_size: 64,
        shared_memory_banks: 32,
    };
    let memory_management = MemoryManagement::new(WordStorage::default(), mem_properties.clone());
    let server = DummyServer::new(memory_management);

    ComputeClient::new(
        server,
        DeviceProperties::new(hardware, mem_properties),
        Arc::new(GlobalConfig::default()),
    )
}

pub fn test_client(device: &DummyDevice) -> DummyClient {
    RUNTIME.client(device, init_client)
}
