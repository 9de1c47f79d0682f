use cubefold_common::word::AtomicWord;
use cubefold_runtime::{
    kernel::{CubeBarrier, Kernel, UnitContext},
    memory_management::{MemoryManagement, MemoryUsage},
    server::{ComputeServer, CubeCount, CubeDim, Handle, IoError, LaunchError},
    storage::{GlobalMemory, WordStorage},
};

/// The dummy server runs every cube one after the other on the calling thread.
///
/// Cubes hold a single unit, so no barrier ever has to wait for another thread.
#[derive(Debug)]
pub struct DummyServer {
    memory_management: spin::Mutex<MemoryManagement<WordStorage>>,
}

impl DummyServer {
    pub fn new(memory_management: MemoryManagement<WordStorage>) -> Self {
        Self {
            memory_management: spin::Mutex::new(memory_management),
        }
    }
}

impl ComputeServer for DummyServer {
    fn allocate(&self, size: usize, tag: &str) -> Result<Handle, IoError> {
        let storage = self.memory_management.lock().alloc(size, tag)?;
        Ok(Handle::new(storage))
    }

    fn dealloc(&self, handle: Handle) -> Result<(), IoError> {
        self.memory_management.lock().dealloc(&handle.storage)?;
        Ok(())
    }

    fn binding(&self, handle: &Handle) -> Result<GlobalMemory, IoError> {
        self.memory_management.lock().get_resource(&handle.storage)
    }

    fn execute(
        &self,
        kernel: &dyn Kernel,
        count: CubeCount,
        dim: CubeDim,
        shared_words: usize,
    ) -> Result<(), LaunchError> {
        let barrier = CubeBarrier::new(1);

        for cube_pos in 0..count.num_cubes() {
            let shared: Vec<AtomicWord> = (0..shared_words).map(|_| AtomicWord::new(0)).collect();
            for unit_pos in 0..dim.num_elems() {
                let unit = UnitContext::new(unit_pos, cube_pos, dim, count, None, &shared, &barrier);
                kernel.execute(&unit);
            }
        }

        Ok(())
    }

    fn memory_usage(&self) -> MemoryUsage {
        self.memory_management.lock().memory_usage()
    }
}
