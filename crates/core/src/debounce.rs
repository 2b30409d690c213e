//! Consecutive-frame gesture debouncing
//!
//! One counter per actionable gesture. Only the current frame's gesture can
//! hold a non-zero count: observing a gesture zeroes every other counter, and
//! observing no gesture zeroes all of them.

use crate::gesture::Gesture;

/// Consecutive frames required before a gesture is confirmed.
pub const DEFAULT_THRESHOLD: u32 = 30;

/// Per-gesture run-length counters with a confirmation threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Debouncer {
    counts: [u32; Gesture::COUNT],
    threshold: u32,
}

impl Debouncer {
    /// Create a debouncer. A threshold of 0 is treated as 1.
    pub fn new(threshold: u32) -> Self {
        Self {
            counts: [0; Gesture::COUNT],
            threshold: threshold.max(1),
        }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Feed one frame's classification.
    ///
    /// Returns the gesture on the frame its counter reaches the threshold;
    /// that counter is zeroed in the same call, so a held gesture confirms
    /// again every `threshold` frames.
    pub fn observe(&mut self, gesture: Option<Gesture>) -> Option<Gesture> {
        let Some(gesture) = gesture else {
            self.reset();
            return None;
        };

        let slot = gesture.index();
        for (i, count) in self.counts.iter_mut().enumerate() {
            if i != slot {
                *count = 0;
            }
        }

        self.counts[slot] = self.counts[slot].saturating_add(1);
        if self.counts[slot] >= self.threshold {
            self.counts[slot] = 0;
            Some(gesture)
        } else {
            None
        }
    }

    /// Current run length for `gesture`.
    pub fn count(&self, gesture: Gesture) -> u32 {
        self.counts[gesture.index()]
    }

    /// All counters, indexed by [`Gesture::index`].
    pub fn counts(&self) -> &[u32; Gesture::COUNT] {
        &self.counts
    }

    /// Zero every counter.
    pub fn reset(&mut self) {
        self.counts = [0; Gesture::COUNT];
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}
