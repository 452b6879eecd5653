//! Nullable random: a scripted `RngCore`.

use rand::RngCore;

/// Returns pre-configured 64-bit values in order, cycling when exhausted.
pub struct NullRandom {
    values: Vec<u64>,
    index: usize,
}

impl NullRandom {
    /// Create with a sequence of raw values. An empty sequence yields zeros.
    pub fn new(values: Vec<u64>) -> Self {
        Self { values, index: 0 }
    }

    /// Create with a single value that will be returned for every call.
    pub fn constant(value: u64) -> Self {
        Self::new(vec![value])
    }

    /// Script the results of successive `gen_range(0..total)` calls.
    ///
    /// `rand` maps a 64-bit draw `v` onto `[0, total)` as the high half of
    /// `v * total`, so the smallest `v` with that high half equal to `roll` is
    /// `ceil(roll * 2^64 / total)`.
    pub fn rolls(total: u64, rolls: &[u64]) -> Self {
        let values = rolls
            .iter()
            .map(|&roll| {
                assert!(total > 0 && roll < total, "roll {roll} outside [0, {total})");
                let scaled = (u128::from(roll) << 64).div_ceil(u128::from(total));
                scaled as u64
            })
            .collect();
        Self::new(values)
    }
}

impl RngCore for NullRandom {
    fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        if self.values.is_empty() {
            return 0;
        }
        let value = self.values[self.index % self.values.len()];
        self.index += 1;
        value
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.next_u64().to_be_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}
