use crate::core::base::*;

use std::sync::atomic::{AtomicU64, Ordering};

/// Advisory completion fraction of the running render, always in [0, 1].
///
/// Written by the engine, read by anyone. There is no ordering guarantee
/// relative to other state: a reader may see a slightly stale value.
#[derive(Debug, Default)]
pub struct ProgressChannel {
    bits: AtomicU64,
}

impl ProgressChannel {
    pub fn new() -> Self {
        ProgressChannel::default()
    }

    pub fn reset(&self) {
        self.bits.store(0.0_f64.to_bits(), Ordering::Relaxed);
    }

    /// Stores `fraction` clamped into [0, 1]; NaN is stored as 0.
    pub fn set(&self, fraction: Float) {
        let f = if fraction.is_nan() {
            0.0
        } else {
            Float::clamp(fraction, 0.0, 1.0)
        };
        self.bits.store(f.to_bits(), Ordering::Relaxed);
    }

    /// Raises the stored fraction to `fraction` if it is larger. Safe to
    /// call from many workers at once; the value never moves backwards.
    pub fn advance(&self, fraction: Float) {
        if fraction.is_nan() {
            return;
        }
        let f = Float::clamp(fraction, 0.0, 1.0);
        // Non-negative floats order the same as their bit patterns.
        self.bits.fetch_max(f.to_bits(), Ordering::Relaxed);
    }

    /// Advances to `done / total`; an empty job counts as complete.
    pub fn set_counts(&self, done: u64, total: u64) {
        if total == 0 {
            self.advance(1.0);
        } else {
            self.advance(done as Float / total as Float);
        }
    }

    pub fn get(&self) -> Float {
        Float::from_bits(self.bits.load(Ordering::Relaxed))
    }
}
