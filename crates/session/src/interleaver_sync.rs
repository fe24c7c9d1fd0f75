//! Interleaver sync state machine
//!
//! The physical layer knows where a frame starts but not which frame of an
//! interleave batch it is. While searching, the receiver test-decodes the
//! oldest sub-frame of the deinterleaved window after every new frame; the
//! first time that decode checks out, the window is aligned with a batch.
//! From then on a full window is decoded every `depth` frames.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InterleaverState {
    #[default]
    Search,
    Synced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct InterleaverSync {
    pub state: InterleaverState,
    /// Frames since the last full-window decode
    pub frame_count: usize,
    /// Frames absorbed into the window since physical sync was found
    pub absorbed: usize,
}

impl InterleaverSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether this frame should be used for an alignment trial
    pub fn wants_trial(&self, depth: usize) -> bool {
        self.state == InterleaverState::Search && self.absorbed + 1 >= depth
    }

    /// Apply the outcome of an alignment trial
    pub fn after_trial(self, aligned: bool, depth: usize) -> Self {
        if aligned {
            Self {
                state: InterleaverState::Synced,
                frame_count: depth,
                ..self
            }
        } else {
            self
        }
    }

    /// Whether the window holds a complete aligned batch
    pub fn window_ready(&self, depth: usize) -> bool {
        self.state == InterleaverState::Synced && self.frame_count == depth
    }

    /// Mark the window as decoded
    pub fn consume(self) -> Self {
        Self {
            frame_count: 0,
            ..self
        }
    }

    /// Advance after a demodulated frame
    pub fn tick(self) -> Self {
        Self {
            frame_count: self.frame_count + 1,
            absorbed: self.absorbed + 1,
            ..self
        }
    }

    /// Back to search after the physical layer lost sync
    pub fn reset(self) -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trial_waits_for_full_window() {
        let mut s = InterleaverSync::new();
        assert!(!s.wants_trial(4));
        for _ in 0..3 {
            s = s.tick();
        }
        assert!(s.wants_trial(4));
        assert!(InterleaverSync::new().wants_trial(1));
    }

    #[test]
    fn test_failed_trial_stays_searching() {
        let s = InterleaverSync::new().tick().after_trial(false, 2);
        assert_eq!(s.state, InterleaverState::Search);
        assert!(!s.window_ready(2));
    }

    #[test]
    fn test_decode_cadence() {
        let depth = 3;
        let mut s = InterleaverSync::new().tick().tick().after_trial(true, depth);
        assert!(s.window_ready(depth));
        s = s.consume().tick();

        let mut ready = Vec::new();
        for _ in 0..6 {
            ready.push(s.window_ready(depth));
            if s.window_ready(depth) {
                s = s.consume();
            }
            s = s.tick();
        }
        assert_eq!(ready, vec![false, false, true, false, false, true]);
        assert!(!s.wants_trial(depth));
    }

    #[test]
    fn test_reset() {
        let s = InterleaverSync::new().tick().after_trial(true, 1).reset();
        assert_eq!(s, InterleaverSync::new());
    }
}
