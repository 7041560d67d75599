//! Fixed-length bit vector for per-state and per-choice flags.
//!
//! Used for the Markovian choice/state flags, initial and deadlock states, and
//! the per-label state sets of a [`StateLabeling`][crate::labeling::StateLabeling].

use std::fmt;

/// A bit vector of fixed logical length backed by `u64` words.
///
/// Unlike a growable set, every index in `0..len()` is meaningful: a cleared
/// bit means "false" for that state or choice. Bits beyond `len()` are always
/// kept at zero.
#[derive(Clone, Default, Eq, PartialEq, Hash)]
pub struct BitVector {
    words: Vec<u64>,
    len: usize,
}

impl BitVector {
    const BITS_PER_WORD: usize = 64;

    /// Creates a bit vector of the given length with all bits cleared.
    pub fn new(len: usize) -> Self {
        Self::filled(len, false)
    }

    /// Creates a bit vector of the given length with all bits set to `value`.
    pub fn filled(len: usize, value: bool) -> Self {
        let fill = if value { u64::MAX } else { 0 };
        let mut bv = Self {
            words: vec![fill; Self::words_for(len)],
            len,
        };
        bv.clear_tail();
        bv
    }

    /// Creates a bit vector of the given length with exactly the given bits set.
    pub fn from_indices(len: usize, indices: impl IntoIterator<Item = usize>) -> Self {
        let mut bv = Self::new(len);
        for index in indices {
            bv.set(index, true);
        }
        bv
    }

    #[inline]
    fn words_for(bits: usize) -> usize {
        (bits + Self::BITS_PER_WORD - 1) / Self::BITS_PER_WORD
    }

    #[inline]
    fn word_and_bit(index: usize) -> (usize, usize) {
        (index / Self::BITS_PER_WORD, index % Self::BITS_PER_WORD)
    }

    fn clear_tail(&mut self) {
        let rem = self.len % Self::BITS_PER_WORD;
        if rem != 0 {
            if let Some(last) = self.words.last_mut() {
                *last &= (1u64 << rem) - 1;
            }
        }
    }

    /// Returns the logical length.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the logical length is zero.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the bit at the given index.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    #[inline]
    pub fn get(&self, index: usize) -> bool {
        assert!(index < self.len, "Bit index {} out of bounds (len = {})", index, self.len);
        let (w, b) = Self::word_and_bit(index);
        (self.words[w] >> b) & 1 == 1
    }

    /// Sets the bit at the given index.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    #[inline]
    pub fn set(&mut self, index: usize, value: bool) {
        assert!(index < self.len, "Bit index {} out of bounds (len = {})", index, self.len);
        let (w, b) = Self::word_and_bit(index);
        if value {
            self.words[w] |= 1u64 << b;
        } else {
            self.words[w] &= !(1u64 << b);
        }
    }

    /// Appends one bit at the end, growing the logical length by one.
    pub fn push(&mut self, value: bool) {
        let index = self.len;
        self.len += 1;
        if Self::words_for(self.len) > self.words.len() {
            self.words.push(0);
        }
        self.set(index, value);
    }

    /// Returns the number of set bits.
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Returns true if no bit is set.
    pub fn none(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Returns an iterator over the indices of all set bits, in increasing order.
    pub fn iter_ones(&self) -> Ones<'_> {
        Ones {
            words: &self.words,
            word_idx: 0,
            current_word: self.words.first().copied().unwrap_or(0),
        }
    }
}

impl fmt::Debug for BitVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitVector(len={}, ones={:?})", self.len, self.iter_ones().collect::<Vec<_>>())
    }
}

impl fmt::Display for BitVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.len {
            write!(f, "{}", if self.get(i) { '1' } else { '0' })?;
        }
        Ok(())
    }
}

/// Iterator over set bits in a [`BitVector`].
pub struct Ones<'a> {
    words: &'a [u64],
    word_idx: usize,
    current_word: u64,
}

impl Iterator for Ones<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current_word != 0 {
                let bit_idx = self.current_word.trailing_zeros() as usize;
                self.current_word &= self.current_word - 1; // Clear lowest set bit
                return Some(self.word_idx * BitVector::BITS_PER_WORD + bit_idx);
            }

            self.word_idx += 1;
            if self.word_idx >= self.words.len() {
                return None;
            }
            self.current_word = self.words[self.word_idx];
        }
    }
}
