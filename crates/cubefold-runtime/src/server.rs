use crate::{
    kernel::Kernel,
    memory_management::MemoryUsage,
    storage::{GlobalMemory, StorageHandle},
};
use cubefold_common::{backtrace::BackTrace, word::Word};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The compute server is responsible for handling resources and computations over resources.
///
/// Servers are shared between threads through the [ComputeClient](crate::client::ComputeClient),
/// which is also the only place launches are validated and logged.
pub trait ComputeServer: Send + Sync + core::fmt::Debug + 'static {
    /// Reserves `size` bytes of zeroed global memory.
    fn allocate(&self, size: usize, tag: &str) -> Result<Handle, IoError>;

    /// Releases the memory behind the handle.
    fn dealloc(&self, handle: Handle) -> Result<(), IoError>;

    /// A view on the memory behind the handle that kernels can capture.
    fn binding(&self, handle: &Handle) -> Result<GlobalMemory, IoError>;

    /// Copies the memory behind the handle back to the host.
    fn read(&self, handle: &Handle) -> Result<Vec<Word>, IoError> {
        Ok(self.binding(handle)?.to_vec())
    }

    /// Executes the kernel on `count` cubes of `dim` units, giving every cube `shared_words`
    /// words of shared memory. Returns once every unit is done.
    fn execute(
        &self,
        kernel: &dyn Kernel,
        count: CubeCount,
        dim: CubeDim,
        shared_words: usize,
    ) -> Result<(), LaunchError>;

    /// The current memory usage of the server.
    fn memory_usage(&self) -> MemoryUsage;
}

/// Server handle containing the memory handle.
#[derive(new, Debug, PartialEq, Eq)]
pub struct Handle {
    /// The storage backing this handle.
    pub storage: StorageHandle,
}

impl Handle {
    /// The size of the memory behind the handle, in bytes.
    pub fn size(&self) -> usize {
        self.storage.size
    }
}

/// Number of units in a cube.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct CubeDim {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl CubeDim {
    /// Create a new cube dim with x = y = z = 1.
    pub const fn new_single() -> Self {
        Self { x: 1, y: 1, z: 1 }
    }

    /// Create a new cube dim with the given x, and y = z = 1.
    pub const fn new_1d(x: u32) -> Self {
        Self { x, y: 1, z: 1 }
    }

    /// Create a new cube dim with the given x, y and z.
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    /// Total numbers of units in the cube.
    pub const fn num_elems(&self) -> u32 {
        self.x * self.y * self.z
    }
}

impl Default for CubeDim {
    fn default() -> Self {
        Self::new_single()
    }
}

/// Number of cubes in a launch.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct CubeCount {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl CubeCount {
    /// Create a cube count for a single cube.
    pub const fn new_single() -> Self {
        Self { x: 1, y: 1, z: 1 }
    }

    /// Create a cube count for a 1D launch.
    pub const fn new_1d(x: u32) -> Self {
        Self { x, y: 1, z: 1 }
    }

    /// Create a cube count for a 3D launch.
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    /// Total numbers of cubes in the launch.
    pub const fn num_cubes(&self) -> u32 {
        self.x * self.y * self.z
    }
}

/// Kernel Launch Errors.
#[derive(Error, Clone)]
pub enum LaunchError {
    /// Too many resources were requested
    #[error("Too many resources were requested during launch\n{0}")]
    TooManyResources(#[from] ResourceLimitError),

    /// A unit did not complete.
    #[error(
        "An unknown error happened during launch\nCaused by:\n  {reason}\nBacktrace\n{backtrace}"
    )]
    Unknown {
        /// The caused of the unknown error.
        reason: String,
        /// The backtrace for this error.
        backtrace: BackTrace,
    },

    /// Can't launch because of an IO Error.
    #[error("An io error happened during launch\nCaused by:\n  {0}")]
    IoError(#[from] IoError),
}

/// Resource limit errors.
#[derive(Error, Clone)]
pub enum ResourceLimitError {
    /// Shared memory exceeds maximum
    #[error(
        "Too much shared memory requested.\nRequested {requested} bytes, maximum {max} bytes available.\nBacktrace\n{backtrace}"
    )]
    SharedMemory {
        /// Value requested
        requested: usize,
        /// Maximum value
        max: usize,
        /// The backtrace for this error.
        backtrace: BackTrace,
    },
    /// Total units exceeds maximum
    #[error(
        "Total unit count exceeds maximum.\nRequested {requested} units, max units is {max}.\nBacktrace\n{backtrace}"
    )]
    Units {
        /// Requested value
        requested: u32,
        /// Maximum value
        max: u32,
        /// The backtrace for this error.
        backtrace: BackTrace,
    },
    /// Cube count exceeds maximum
    #[error(
        "Cube count exceeds maximum.\nRequested {requested} cubes, max is {max}.\nBacktrace\n{backtrace}"
    )]
    CubeCount {
        /// Requested value
        requested: u32,
        /// Maximum value
        max: u32,
        /// The backtrace for this error.
        backtrace: BackTrace,
    },
}

/// Error returned from `allocate`/`read`/`dealloc` functions.
#[derive(Error, Clone)]
pub enum IoError {
    /// Buffer size exceeds the max available
    #[error("can't allocate buffer of size: {size}, {available} bytes available\n{backtrace}")]
    BufferTooBig {
        /// The size of the buffer in bytes.
        size: u64,
        /// The bytes still available on the device.
        available: u64,
        /// The captured backtrace.
        backtrace: BackTrace,
    },

    /// Handle wasn't found in the memory pool
    #[error("couldn't find resource for that handle\n{backtrace}")]
    InvalidHandle {
        /// The backtrace.
        backtrace: BackTrace,
    },
}

impl core::fmt::Debug for LaunchError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_fmt(format_args!("{self}"))
    }
}

impl core::fmt::Debug for ResourceLimitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_fmt(format_args!("{self}"))
    }
}

impl core::fmt::Debug for IoError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_fmt(format_args!("{self}"))
    }
}
