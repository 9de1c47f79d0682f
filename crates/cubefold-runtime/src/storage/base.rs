use core::sync::atomic::{AtomicU64, Ordering};
use cubefold_common::word::{AtomicWord, Word, load_value, store_value};
use std::sync::Arc;

/// Storage unique identifier.
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct StorageId {
    value: u64,
}

impl StorageId {
    /// Create a new unique id.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let value = COUNTER.fetch_add(1, Ordering::Relaxed);
        if value == u64::MAX {
            core::panic!("Memory ID overflowed");
        }
        Self { value }
    }
}

impl Default for StorageId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for StorageId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "StorageId({})", self.value)
    }
}

/// A handle to a chunk of storage.
#[derive(new, Clone, Debug, PartialEq, Eq)]
pub struct StorageHandle {
    /// Storage id.
    pub id: StorageId,
    /// The size of the chunk in bytes.
    pub size: usize,
}

/// Storage types are responsible for allocating and deallocating memory.
pub trait ComputeStorage: Send + core::fmt::Debug {
    /// The resource associated type determines the way data is implemented and how
    /// it can be accessed by kernels.
    type Resource: Send + Sync;

    /// The alignment memory is allocated with, in bytes.
    const ALIGNMENT: usize;

    /// Returns the underlying resource for a specified storage handle.
    fn get(&self, handle: &StorageHandle) -> Option<Self::Resource>;

    /// Allocates `size` units of memory and returns a handle to it.
    fn alloc(&mut self, size: usize) -> StorageHandle;

    /// Deallocates the memory pointed by the given storage id, returns false when the id is
    /// unknown.
    fn dealloc(&mut self, id: StorageId) -> bool;
}

/// Global memory: words reachable by every unit of every cube of a launch.
///
/// Cloning is cheap and shares the same words. Accesses are relaxed; a launch boundary orders
/// the writes of one launch before the reads of the next one.
#[derive(Clone)]
pub struct GlobalMemory {
    words: Arc<[AtomicWord]>,
}

impl GlobalMemory {
    /// Zeroed memory of `len` words.
    pub fn zeroed(len: usize) -> Self {
        Self {
            words: (0..len).map(|_| AtomicWord::new(0)).collect(),
        }
    }

    /// Number of words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the memory holds no word.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Reads the word at `index`.
    pub fn load_word(&self, index: usize) -> Word {
        self.words[index].load(Ordering::Relaxed)
    }

    /// Writes the word at `index`.
    pub fn store_word(&self, index: usize, word: Word) {
        self.words[index].store(word, Ordering::Relaxed)
    }

    /// Reads a value starting at word `offset`.
    pub fn load<V: bytemuck::Pod>(&self, offset: usize) -> V {
        load_value(&self.words[offset..])
    }

    /// Writes a value starting at word `offset`.
    pub fn store<V: bytemuck::Pod>(&self, offset: usize, value: &V) {
        store_value(&self.words[offset..], value)
    }

    /// Copies every word to the host.
    pub fn to_vec(&self) -> Vec<Word> {
        self.words
            .iter()
            .map(|word| word.load(Ordering::Relaxed))
            .collect()
    }
}

impl core::fmt::Debug for GlobalMemory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GlobalMemory")
            .field("len", &self.words.len())
            .finish()
    }
}
