//! Tie-break generator for equally desirable samples.

/// Source of tie-break values, drawn once per ingested row.
///
/// The accumulator takes this as an explicit dependency so that a scan can
/// be replayed with exactly the same sample selection.
pub trait TieBreak {
    /// Returns the tie-break value for the next row.
    fn next_hash(&mut self) -> u32;
}

/// 32-bit linear congruential generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lcg {
    state: u32,
}

impl Lcg {
    const MULTIPLIER: u32 = 1_103_515_245;
    const INCREMENT: u32 = 12_345;

    /// Creates a generator from a raw seed.
    #[must_use]
    pub const fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Derives the seed from the index geometry and the estimated row count.
    ///
    /// Only the low 32 bits of the estimate take part.
    #[must_use]
    pub fn for_index(column_count: usize, estimated_rows: u64) -> Self {
        let seed = 0x689e_962d_u32.wrapping_mul(column_count as u32)
            ^ 0xd094_4565_u32.wrapping_mul(estimated_rows as u32);
        Self::new(seed)
    }

    /// Current state, i.e. the last value handed out.
    #[must_use]
    pub const fn state(&self) -> u32 {
        self.state
    }
}

impl TieBreak for Lcg {
    fn next_hash(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT);
        self.state
    }
}
