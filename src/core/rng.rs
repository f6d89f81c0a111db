use crate::core::base::*;

const PCG32_DEFAULT_STATE: u64 = 0x853c49e6748fea9b;
const PCG32_DEFAULT_STREAM: u64 = 0xda3e39cb94b95bdb;
const PCG32_MULT: u64 = 0x5851f42d4c957f2d;

/// PCG32 generator. Each pixel gets its own sequence so that parallel
/// workers never share generator state.
#[derive(Debug, PartialEq, Clone)]
pub struct RNG {
    state: u64,
    inc: u64,
}

impl RNG {
    pub fn new() -> Self {
        RNG {
            state: PCG32_DEFAULT_STATE,
            inc: PCG32_DEFAULT_STREAM,
        }
    }

    pub fn new_sequence(initseq: u64) -> Self {
        let mut r = Self::new();
        r.set_sequence(initseq);
        return r;
    }

    /// Sequence keyed on a pixel and a per-render seed.
    pub fn for_pixel(x: usize, y: usize, seed: u64) -> Self {
        let key = ((y as u64) << 32) ^ (x as u64) ^ seed.rotate_left(17);
        Self::new_sequence(key)
    }

    pub fn set_sequence(&mut self, initseq: u64) {
        self.state = 0;
        self.inc = (initseq << 1) | 1;
        self.uniform_uint32();
        self.state = self.state.wrapping_add(PCG32_DEFAULT_STATE);
        self.uniform_uint32();
    }

    #[inline]
    pub fn uniform_uint32(&mut self) -> u32 {
        let old = self.state;
        self.state = old.wrapping_mul(PCG32_MULT).wrapping_add(self.inc);
        let xorshifted = ((old >> 18) ^ old) >> 27;
        let xorshifted = xorshifted as u32;
        let rot = (old >> 59) as u32;
        return xorshifted.rotate_right(rot);
    }

    /// Uniform sample in [0, 1).
    #[inline]
    pub fn uniform_float(&mut self) -> Float {
        let f = self.uniform_uint32() as Float * 2.3283064365386963e-10;
        return Float::min(ONE_MINUS_EPSILON, f);
    }
}

impl Default for RNG {
    fn default() -> Self {
        Self::new()
    }
}
