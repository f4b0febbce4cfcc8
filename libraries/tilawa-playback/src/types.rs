//! Core types for playback sequencing

use serde::{Deserialize, Serialize};

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    /// No track loaded
    Stopped,

    /// Loading the selected track
    Loading,

    /// Currently playing
    Playing,

    /// Paused mid-track
    Paused,
}

/// Inclusive track-index window within which playback wraps while
/// looping is enabled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopRange {
    /// First track of the loop
    pub start: u32,

    /// Last track of the loop
    pub end: u32,
}

impl LoopRange {
    /// Build a range from two bounds, swapping them when given in
    /// descending order so `start <= end` always holds.
    pub fn new(a: u32, b: u32) -> Self {
        if a > b {
            Self { start: b, end: a }
        } else {
            Self { start: a, end: b }
        }
    }

    /// Whether the index lies inside the range
    pub fn contains(self, index: u32) -> bool {
        index >= self.start && index <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loop_range_orders_bounds() {
        let range = LoopRange::new(7, 3);
        assert_eq!(range.start, 3);
        assert_eq!(range.end, 7);

        let range = LoopRange::new(3, 7);
        assert_eq!(range.start, 3);
        assert_eq!(range.end, 7);
    }

    #[test]
    fn loop_range_contains_is_inclusive() {
        let range = LoopRange::new(3, 7);
        assert!(range.contains(3));
        assert!(range.contains(5));
        assert!(range.contains(7));
        assert!(!range.contains(2));
        assert!(!range.contains(8));
    }

    #[test]
    fn single_track_range() {
        let range = LoopRange::new(4, 4);
        assert_eq!(range.start, 4);
        assert_eq!(range.end, 4);
        assert!(range.contains(4));
        assert!(!range.contains(5));
    }
}
