//! Tilawa - Playback Sequencing
//!
//! Platform-agnostic playback sequencing for the Tilawa player.
//!
//! This crate provides:
//! - Current-track bookkeeping over a fixed, numbered track set
//! - Track-end advance with plain wraparound or loop-range wraparound
//! - Loop range with ordered bounds (reversed input is swapped)
//! - Explicit track selection that leaves loop state untouched
//! - Playback state machine (stopped/loading/playing/paused)
//! - Event queue for UI and engine synchronization
//!
//! # Architecture
//!
//! `tilawa-playback` has no audio or terminal dependencies; it is the
//! state machine only. The application drains [`PlaybackEvent`]s and
//! performs the side effects: deriving the asset path for a new index,
//! loading and starting audio, and syncing displayed labels.
//!
//! # Example
//!
//! ```rust
//! use tilawa_core::PlaybackSettings;
//! use tilawa_playback::{PlaybackEvent, Sequencer};
//!
//! let mut sequencer = Sequencer::new(PlaybackSettings {
//!     total_tracks: 15,
//!     looping_supported: true,
//! });
//!
//! sequencer.set_loop_range(3, 7).unwrap();
//! sequencer.set_looping(true).unwrap();
//! sequencer.select_track(7).unwrap();
//!
//! // Reaching the loop end wraps back to the loop start
//! assert_eq!(sequencer.handle_track_end(), 3);
//!
//! for event in sequencer.drain_events() {
//!     if let PlaybackEvent::TrackChanged { index } = event {
//!         // load `audio/tiktokQuran{index}.mp3` and play it
//!         let _ = index;
//!     }
//! }
//! ```

#![forbid(unsafe_code)]

mod error;
mod events;
mod sequencer;
pub mod types;

// Public exports
pub use error::{PlaybackError, Result};
pub use events::PlaybackEvent;
pub use sequencer::Sequencer;
pub use types::{LoopRange, PlaybackState};
