//! Playback events
//!
//! Event-based communication for UI and engine synchronization. The
//! sequencer queues events as its state changes; the application drains
//! them and performs the matching side effects (loading audio, syncing
//! the displayed track label and selector, updating captions).

use crate::types::PlaybackState;
use serde::{Deserialize, Serialize};

/// Events emitted by the playback sequencer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PlaybackEvent {
    /// The current track index changed; the new track should be loaded
    /// and started, and the displayed label and selection synced
    TrackChanged {
        /// Index of the new current track
        index: u32,
    },

    /// Playback state changed
    StateChanged {
        /// The new playback state
        state: PlaybackState,
    },

    /// Looping was enabled or disabled
    LoopingChanged {
        /// New looping flag
        enabled: bool,
    },

    /// The loop range changed (bounds already ordered)
    LoopRangeChanged {
        /// First track of the loop
        start: u32,
        /// Last track of the loop
        end: u32,
    },
}
