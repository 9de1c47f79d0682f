use super::{MemoryDeviceProperties, MemoryUsage};
use crate::{
    server::IoError,
    storage::{ComputeStorage, StorageHandle, StorageId},
};
use cubefold_common::backtrace::BackTrace;
use hashbrown::HashMap;

/// Allocation recorded by the memory management.
#[derive(Debug)]
struct Allocation {
    size: u64,
    tag: String,
}

/// Keeps track of every allocation made in the storage and enforces the device memory limit.
///
/// Allocations are never pooled: memory released by `dealloc` goes straight back to the storage,
/// so nothing is cached from one call to the next.
pub struct MemoryManagement<Storage> {
    storage: Storage,
    properties: MemoryDeviceProperties,
    allocations: HashMap<StorageId, Allocation>,
    usage: MemoryUsage,
}

impl<Storage: ComputeStorage> core::fmt::Debug for MemoryManagement<Storage> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MemoryManagement")
            .field("storage", &self.storage)
            .field("properties", &self.properties)
            .field("usage", &self.usage)
            .finish()
    }
}

impl<Storage: ComputeStorage> MemoryManagement<Storage> {
    /// Creates the memory management from device limits.
    pub fn new(storage: Storage, properties: MemoryDeviceProperties) -> Self {
        Self {
            storage,
            properties,
            allocations: HashMap::new(),
            usage: MemoryUsage::default(),
        }
    }

    /// Allocates `size` bytes, rounded up to the device alignment.
    ///
    /// The tag is kept for diagnostics only.
    pub fn alloc(&mut self, size: usize, tag: &str) -> Result<StorageHandle, IoError> {
        let aligned = (size as u64)
            .max(1)
            .next_multiple_of(self.properties.alignment.max(1));
        let available = self
            .properties
            .max_memory
            .saturating_sub(self.usage.bytes_in_use);

        if aligned > available {
            return Err(IoError::BufferTooBig {
                size: aligned,
                available,
                backtrace: BackTrace::capture(),
            });
        }

        let handle = self.storage.alloc(aligned as usize);
        let size = handle.size as u64;

        self.usage.register_alloc(size);
        self.allocations.insert(
            handle.id,
            Allocation {
                size,
                tag: tag.to_string(),
            },
        );

        Ok(handle)
    }

    /// Releases an allocation, returning its tag.
    pub fn dealloc(&mut self, handle: &StorageHandle) -> Result<String, IoError> {
        let allocation = self
            .allocations
            .remove(&handle.id)
            .ok_or_else(|| IoError::InvalidHandle {
                backtrace: BackTrace::capture(),
            })?;

        self.storage.dealloc(handle.id);
        self.usage.register_dealloc(allocation.size);

        Ok(allocation.tag)
    }

    /// Returns the resource from the storage at the specified handle.
    pub fn get_resource(&self, handle: &StorageHandle) -> Result<Storage::Resource, IoError> {
        self.storage
            .get(handle)
            .ok_or_else(|| IoError::InvalidHandle {
                backtrace: BackTrace::capture(),
            })
    }

    /// The tag an allocation was made with.
    pub fn tag(&self, handle: &StorageHandle) -> Option<&str> {
        self.allocations
            .get(&handle.id)
            .map(|allocation| allocation.tag.as_str())
    }

    /// Get the current memory usage.
    pub fn memory_usage(&self) -> MemoryUsage {
        self.usage
    }
}
