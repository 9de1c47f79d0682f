use crate::{
    DeviceProperties,
    config::GlobalConfig,
    kernel::Kernel,
    logging::{LaunchRecord, ServerLogger},
    memory_management::MemoryUsage,
    server::{ComputeServer, CubeCount, CubeDim, Handle, IoError, LaunchError},
    storage::GlobalMemory,
    validation::validate_launch,
};
use cubefold_common::{
    backtrace::BackTrace,
    word::{Word, from_words},
};
use std::{sync::Arc, time::Instant};

/// The ComputeClient is the entry point to require tasks from the ComputeServer.
/// It should be obtained for a specific device via the Compute struct.
#[derive(Debug)]
pub struct ComputeClient<Server: ComputeServer> {
    server: Arc<Server>,
    properties: Arc<DeviceProperties>,
    logger: Arc<spin::Mutex<ServerLogger>>,
}

impl<S> Clone for ComputeClient<S>
where
    S: ComputeServer,
{
    fn clone(&self) -> Self {
        Self {
            server: self.server.clone(),
            properties: self.properties.clone(),
            logger: self.logger.clone(),
        }
    }
}

impl<Server> ComputeClient<Server>
where
    Server: ComputeServer,
{
    /// Create a new client with the given server and the config its logger reads from.
    pub fn new(server: Server, properties: DeviceProperties, config: Arc<GlobalConfig>) -> Self {
        Self {
            server: Arc::new(server),
            properties: Arc::new(properties),
            logger: Arc::new(spin::Mutex::new(ServerLogger::new(config))),
        }
    }

    /// Get the features supported by the compute server.
    pub fn properties(&self) -> &DeviceProperties {
        &self.properties
    }

    /// Allocates `count` values of `size` bytes each, zeroed.
    pub fn allocate(&self, size: usize, count: usize, tag: &str) -> Result<Handle, IoError> {
        let bytes = size.checked_mul(count).ok_or_else(|| IoError::BufferTooBig {
            size: u64::MAX,
            available: self.properties.memory.max_memory,
            backtrace: BackTrace::capture(),
        })?;
        let handle = self.server.allocate(bytes, tag)?;

        self.logger.lock().log_memory(|| {
            format!(
                "alloc {tag} {} bytes ({} values of {size} bytes)",
                handle.size(),
                count
            )
        });

        Ok(handle)
    }

    /// Releases the memory behind the handle.
    pub fn dealloc(&self, handle: Handle) -> Result<(), IoError> {
        let size = handle.size();
        self.server.dealloc(handle)?;
        self.logger
            .lock()
            .log_memory(|| format!("dealloc {size} bytes"));

        Ok(())
    }

    /// A view on the memory behind the handle, to be captured by kernels.
    pub fn binding(&self, handle: &Handle) -> Result<GlobalMemory, IoError> {
        self.server.binding(handle)
    }

    /// Given a handle, returns owned resource as words.
    pub fn read_one(&self, handle: &Handle) -> Result<Vec<Word>, IoError> {
        self.server.read(handle)
    }

    /// Reads the value stored at the start of the handle.
    pub fn read_value<V: bytemuck::Pod>(&self, handle: &Handle) -> Result<V, IoError> {
        let words = self.read_one(handle)?;
        Ok(from_words(&words))
    }

    /// Executes the `kernel` over `count` cubes of `dim` units, each cube owning
    /// `shared_words` words of shared memory.
    ///
    /// The launch is validated against the device limits before anything runs, and returns
    /// once every unit is done.
    pub fn launch(
        &self,
        kernel: &dyn Kernel,
        count: CubeCount,
        dim: CubeDim,
        shared_words: usize,
    ) -> Result<(), LaunchError> {
        validate_launch(&self.properties.hardware, count, dim, shared_words)?;

        let record = LaunchRecord::new(kernel.name(), count, dim, shared_words);
        let profile = self.logger.lock().profile_launches();

        if profile {
            let start = Instant::now();
            self.server.execute(kernel, count, dim, shared_words)?;
            self.logger
                .lock()
                .log_launch(&record, Some(start.elapsed()));
        } else {
            self.server.execute(kernel, count, dim, shared_words)?;

            let mut logger = self.logger.lock();
            if logger.launch_activated() {
                logger.log_launch(&record, None);
            }
        }

        Ok(())
    }

    /// Get the current memory usage of this client.
    pub fn memory_usage(&self) -> MemoryUsage {
        self.server.memory_usage()
    }
}
