//! Device memory, shared or global, is addressed as a sequence of 32-bit words.
//!
//! Values are plain-data blocks ([Pod]) that get reinterpreted as words only at the copy
//! boundary, so that a value can be moved one word per unit.

use bytemuck::Pod;
use core::sync::atomic::{AtomicU32, Ordering};

/// A single memory word.
pub type Word = u32;

/// A memory word that can be written concurrently by many units.
///
/// Accesses are relaxed: ordering between units is provided by barriers and launch boundaries.
pub type AtomicWord = AtomicU32;

/// Size of a [Word] in bytes.
pub const WORD_SIZE: usize = core::mem::size_of::<Word>();

/// Number of words needed to hold `size` bytes.
///
/// Zero-sized data still occupies one word.
pub const fn word_count_for(size: usize) -> usize {
    let count = size.div_ceil(WORD_SIZE);
    if count == 0 { 1 } else { count }
}

/// Number of words needed to hold a value of type `V`.
pub const fn word_count<V>() -> usize {
    word_count_for(core::mem::size_of::<V>())
}

/// Reads a value from the leading words of `words`.
pub fn load_value<V: Pod>(words: &[AtomicWord]) -> V {
    debug_assert!(words.len() >= word_count::<V>());

    let mut value = V::zeroed();
    let bytes = bytemuck::bytes_of_mut(&mut value);

    for (chunk, word) in bytes.chunks_mut(WORD_SIZE).zip(words) {
        let word = word.load(Ordering::Relaxed).to_ne_bytes();
        chunk.copy_from_slice(&word[..chunk.len()]);
    }

    value
}

/// Writes a value into the leading words of `words`, zero filling the last partial word.
pub fn store_value<V: Pod>(words: &[AtomicWord], value: &V) {
    debug_assert!(words.len() >= word_count::<V>());

    for (chunk, word) in bytemuck::bytes_of(value).chunks(WORD_SIZE).zip(words) {
        word.store(pack(chunk), Ordering::Relaxed);
    }
}

/// Reads a value from host words, as returned when device memory is read back.
pub fn from_words<V: Pod>(words: &[Word]) -> V {
    debug_assert!(words.len() >= word_count::<V>());

    let mut value = V::zeroed();
    let bytes = bytemuck::bytes_of_mut(&mut value);

    for (chunk, word) in bytes.chunks_mut(WORD_SIZE).zip(words) {
        chunk.copy_from_slice(&word.to_ne_bytes()[..chunk.len()]);
    }

    value
}

fn pack(chunk: &[u8]) -> Word {
    let mut bytes = [0u8; WORD_SIZE];
    bytes[..chunk.len()].copy_from_slice(chunk);
    Word::from_ne_bytes(bytes)
}
