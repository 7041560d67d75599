/// Finalizer of the [SplitMix64][splitmix] generator.
///
/// ```text
/// z = (z ^ (z >> 30)) * 0xbf58476d1ce4e5b9
/// z = (z ^ (z >> 27)) * 0x94d049bb133111eb
/// z ^ (z >> 31)
/// ```
///
/// [splitmix]: https://prng.di.unimi.it/splitmix64.c
pub fn mix64(x: u64) -> u64 {
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Combines an accumulated hash with the next word.
pub fn combine(seed: u64, word: u64) -> u64 {
    mix64(seed.rotate_left(5) ^ word.wrapping_add(0x9e37_79b9_7f4a_7c15))
}

/// Hashes a sequence of words together with its bit length.
///
/// The length is folded in first, so encodings that only differ in trailing
/// zero words still hash apart.
pub fn hash_words(bit_len: usize, words: &[u64]) -> u64 {
    words
        .iter()
        .fold(mix64(bit_len as u64), |acc, &w| combine(acc, w))
}

pub trait MyHash {
    /// Fast 64-bit hash, computed once per lookup.
    fn hash(&self) -> u64;
}
