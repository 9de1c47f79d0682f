use cubefold_runtime::{
    kernel::Kernel,
    memory_management::{MemoryManagement, MemoryUsage},
    server::{ComputeServer, CubeCount, CubeDim, Handle, IoError, LaunchError},
    storage::{GlobalMemory, WordStorage},
};

use super::scheduler::Scheduler;

/// Compute server of the CPU device.
#[derive(Debug)]
pub struct CpuServer {
    memory_management: spin::Mutex<MemoryManagement<WordStorage>>,
    scheduler: Scheduler,
    plane_size: Option<u32>,
}

impl CpuServer {
    pub fn new(
        memory_management: MemoryManagement<WordStorage>,
        scheduler: Scheduler,
        plane_size: Option<u32>,
    ) -> Self {
        Self {
            memory_management: spin::Mutex::new(memory_management),
            scheduler,
            plane_size,
        }
    }
}

impl ComputeServer for CpuServer {
    fn allocate(&self, size: usize, tag: &str) -> Result<Handle, IoError> {
        let storage = self.memory_management.lock().alloc(size, tag)?;
        Ok(Handle::new(storage))
    }

    fn dealloc(&self, handle: Handle) -> Result<(), IoError> {
        let tag = self.memory_management.lock().dealloc(&handle.storage)?;
        log::trace!("Released {tag} ({} bytes)", handle.size());
        Ok(())
    }

    fn binding(&self, handle: &Handle) -> Result<GlobalMemory, IoError> {
        self.memory_management
            .lock()
            .get_resource(&handle.storage)
    }

    fn execute(
        &self,
        kernel: &dyn Kernel,
        count: CubeCount,
        dim: CubeDim,
        shared_words: usize,
    ) -> Result<(), LaunchError> {
        // The memory lock is not held while units run.
        self.scheduler
            .dispatch_execute(kernel, count, dim, shared_words, self.plane_size)
    }

    fn memory_usage(&self) -> MemoryUsage {
        self.memory_management.lock().memory_usage()
    }
}
