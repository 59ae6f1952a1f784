//! Fixed-capacity bitmap pool of listener slot ids.
//!
//! Every word before the `hint` index is full, so the first free id is always
//! found by scanning forward from the hint. Allocation after sequential release
//! therefore touches a single word in the common case.

use ripple_core::SlotError;

const WORD_BITS: usize = u64::BITS as usize;

/// Hands out and reclaims slot ids in `0..capacity`.
#[derive(Debug, Clone)]
pub struct SlotAllocator {
    words: Vec<u64>,
    capacity: usize,
    hint: usize,
    len: usize,
}

impl SlotAllocator {
    /// Create an allocator for ids `0..capacity`.
    ///
    /// Storage is rounded up to whole 64-bit words; the padding bits are marked
    /// occupied so they are never handed out.
    pub fn new(capacity: usize) -> Self {
        let word_count = capacity.div_ceil(WORD_BITS);
        let mut words = vec![0u64; word_count];
        let tail = capacity % WORD_BITS;
        if tail != 0 {
            if let Some(last) = words.last_mut() {
                *last = !0u64 << tail;
            }
        }
        Self {
            words,
            capacity,
            hint: 0,
            len: 0,
        }
    }

    /// Maximum number of simultaneously live ids.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of live ids.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no id is live.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether every id is live.
    pub fn is_full(&self) -> bool {
        self.len == self.capacity
    }

    /// Number of ids that can still be allocated.
    pub fn available(&self) -> usize {
        self.capacity - self.len
    }

    /// Occupies and returns the smallest free id.
    pub fn allocate(&mut self) -> Result<usize, SlotError> {
        let index = self.first_free_word().ok_or(SlotError::CapacityExceeded {
            capacity: self.capacity,
        })?;
        let word = &mut self.words[index];
        let bit = (!*word).trailing_zeros() as usize;
        *word |= 1u64 << bit;
        self.hint = index;
        self.len += 1;
        Ok(index * WORD_BITS + bit)
    }

    /// The id [`allocate`](Self::allocate) would return, without occupying it.
    pub fn peek(&self) -> Option<usize> {
        let index = self.first_free_word()?;
        Some(index * WORD_BITS + (!self.words[index]).trailing_zeros() as usize)
    }

    /// Frees `slot`.
    ///
    /// `slot` must have been returned by [`allocate`](Self::allocate) and not yet
    /// released. Releasing a free id is a contract violation; it is caught by a
    /// debug assertion and otherwise leaves the id free.
    pub fn release(&mut self, slot: usize) -> Result<(), SlotError> {
        self.check_range(slot)?;
        let index = slot / WORD_BITS;
        let mask = 1u64 << (slot % WORD_BITS);
        debug_assert!(self.words[index] & mask != 0, "slot {slot} released twice");
        if self.words[index] & mask != 0 {
            self.words[index] &= !mask;
            self.len -= 1;
        }
        self.hint = self.hint.min(index);
        Ok(())
    }

    /// Whether `slot` is currently live.
    pub fn occupied(&self, slot: usize) -> Result<bool, SlotError> {
        self.check_range(slot)?;
        Ok(self.words[slot / WORD_BITS] & (1u64 << (slot % WORD_BITS)) != 0)
    }

    fn first_free_word(&self) -> Option<usize> {
        self.words
            .iter()
            .skip(self.hint)
            .position(|word| *word != u64::MAX)
            .map(|offset| self.hint + offset)
    }

    fn check_range(&self, slot: usize) -> Result<(), SlotError> {
        if slot >= self.capacity {
            return Err(SlotError::OutOfRange {
                slot,
                capacity: self.capacity,
            });
        }
        Ok(())
    }
}
