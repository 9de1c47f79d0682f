use cubefold_common::word::{WORD_SIZE, word_count};

/// How values are laid out in shared memory and in the partial result buffer: one slot per unit
/// (or per cube), each slot holding a whole value.
///
/// A slot is padded with one extra word when its word count is a multiple of the number of
/// shared memory banks, so that units reading their own slot hit different banks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotLayout {
    /// Words used by a value, at least one.
    pub value_words: usize,
    /// Words between the start of two consecutive slots.
    pub slot_words: usize,
}

impl SlotLayout {
    /// The layout of values of type `V` on a device with `banks` shared memory banks.
    pub fn new<V>(banks: u32) -> Self {
        Self::from_words(word_count::<V>(), banks)
    }

    /// The layout of values of `value_words` words.
    pub fn from_words(value_words: usize, banks: u32) -> Self {
        let value_words = value_words.max(1);
        let padded = banks > 0 && value_words % banks as usize == 0;

        Self {
            value_words,
            slot_words: value_words + padded as usize,
        }
    }

    /// The size of a slot in bytes.
    pub fn slot_bytes(&self) -> usize {
        self.slot_words * WORD_SIZE
    }

    /// The word offset of slot `index`.
    pub fn offset(&self, index: u32) -> usize {
        index as usize * self.slot_words
    }

    /// Words needed to hold `slots` slots.
    pub fn words(&self, slots: u32) -> usize {
        slots as usize * self.slot_words
    }
}
