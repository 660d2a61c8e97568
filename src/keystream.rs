//! Per-block keystream generator.
//!
//! Every block in a save file is scrambled against its own keystream, seeded
//! with the block's 32-bit key.  The generator is a plain xorshift over a
//! 32-bit word, emitting the state one little-endian byte at a time and
//! advancing the word after every fourth byte.
//!
//! # Self-warming
//! Construction advances the raw seed once per set bit in its binary
//! representation before any output is produced.  This matches the on-disk
//! format exactly; without it every stream would begin with the seed itself.
//!
//! # Determinism
//! Two generators built from the same seed yield identical streams forever.
//! Decryption and encryption rely on this: both sides replay the same bytes
//! in the same order, so XOR-ing twice is the identity.

/// Key-seeded keystream state: a 32-bit word plus a byte cursor into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XorShift32 {
    state:   u32,
    counter: u8, // 0..=3, byte position within `state`
}

impl XorShift32 {
    /// Build a generator from a block key, applying the self-warming rounds.
    pub fn new(seed: u32) -> Self {
        let mut state = seed;
        for _ in 0..seed.count_ones() {
            state = advance(state);
        }
        Self { state, counter: 0 }
    }

    /// Emit byte `counter` of the current state (little-endian order), then
    /// step the cursor; after the fourth byte the state word is advanced.
    pub fn next_byte(&mut self) -> u8 {
        let byte = (self.state >> (u32::from(self.counter) << 3)) as u8;
        if self.counter == 3 {
            self.state = advance(self.state);
            self.counter = 0;
        } else {
            self.counter += 1;
        }
        byte
    }

    /// Emit four bytes and combine them little-endian into a 32-bit word.
    pub fn next_word(&mut self) -> u32 {
        u32::from(self.next_byte())
            | u32::from(self.next_byte()) << 8
            | u32::from(self.next_byte()) << 16
            | u32::from(self.next_byte()) << 24
    }
}

/// One xorshift step.  All arithmetic is plain wrapping 32-bit.
fn advance(mut state: u32) -> u32 {
    state ^= state << 2;
    state ^= state >> 15;
    state ^= state << 13;
    state
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = XorShift32::new(0xDEADBEEF);
        let mut b = XorShift32::new(0xDEADBEEF);
        for _ in 0..1000 {
            assert_eq!(a.next_byte(), b.next_byte());
        }
    }

    #[test]
    fn word_is_four_bytes_little_endian() {
        let mut bytes = XorShift32::new(0x12345678);
        let mut words = XorShift32::new(0x12345678);
        let expected = u32::from(bytes.next_byte())
            | u32::from(bytes.next_byte()) << 8
            | u32::from(bytes.next_byte()) << 16
            | u32::from(bytes.next_byte()) << 24;
        assert_eq!(words.next_word(), expected);
    }

    #[test]
    fn distinct_seeds_diverge() {
        let mut a = XorShift32::new(1);
        let mut b = XorShift32::new(2);
        let sa: Vec<u8> = (0..64).map(|_| a.next_byte()).collect();
        let sb: Vec<u8> = (0..64).map(|_| b.next_byte()).collect();
        assert_ne!(sa, sb);
    }

    #[test]
    fn warming_consumes_one_round_per_set_bit() {
        // Seed 0 has no set bits: the state is emitted unwarmed, so the
        // first four bytes are the seed itself.
        let mut zero = XorShift32::new(0);
        assert_eq!(zero.next_word(), 0);
        // Any seed with set bits must not leak itself as the first word.
        let mut warm = XorShift32::new(0x8000_0001);
        assert_ne!(warm.next_word(), 0x8000_0001);
    }
}
