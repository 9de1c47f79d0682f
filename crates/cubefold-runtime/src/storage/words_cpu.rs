use super::{ComputeStorage, GlobalMemory, StorageHandle, StorageId};
use cubefold_common::word::{WORD_SIZE, word_count_for};
use hashbrown::HashMap;

/// The storage of a host-backed device: every allocation is a block of words.
#[derive(Default)]
pub struct WordStorage {
    memory: HashMap<StorageId, GlobalMemory>,
}

impl core::fmt::Debug for WordStorage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WordStorage")
            .field("allocations", &self.memory.len())
            .finish()
    }
}

impl ComputeStorage for WordStorage {
    type Resource = GlobalMemory;

    const ALIGNMENT: usize = WORD_SIZE;

    fn get(&self, handle: &StorageHandle) -> Option<Self::Resource> {
        self.memory.get(&handle.id).cloned()
    }

    fn alloc(&mut self, size: usize) -> StorageHandle {
        let id = StorageId::new();
        let words = GlobalMemory::zeroed(word_count_for(size));
        let handle = StorageHandle::new(id, words.len() * WORD_SIZE);

        self.memory.insert(id, words);
        handle
    }

    fn dealloc(&mut self, id: StorageId) -> bool {
        self.memory.remove(&id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_alloc_and_dealloc() {
        let mut storage = WordStorage::default();
        let handle_1 = storage.alloc(64);

        assert_eq!(handle_1.size, 64);
        assert!(storage.get(&handle_1).is_some());
        assert!(storage.dealloc(handle_1.id));
        assert!(storage.get(&handle_1).is_none());
        assert!(!storage.dealloc(handle_1.id));
    }

    #[test]
    fn test_sizes_are_word_aligned() {
        let mut storage = WordStorage::default();

        assert_eq!(storage.alloc(6).size, 8);
        assert_eq!(storage.alloc(0).size, WORD_SIZE);
    }

    #[test]
    fn test_memory_starts_zeroed() {
        let mut storage = WordStorage::default();
        let handle = storage.alloc(16);
        let memory = storage.get(&handle).unwrap();

        assert_eq!(memory.to_vec(), vec![0; 4]);
    }
}
