//! Playback sequencing over the numbered track set
//!
//! The sequencer owns the player state record: current track index,
//! loop range, looping flag, and playback state. Transitions queue
//! [`PlaybackEvent`]s; the application drains them and performs the
//! side effects (derive the asset path, load and start audio, sync the
//! displayed label and selections).
//!
//! One implementation covers both player configurations: the track
//! count and looping capability come from
//! [`tilawa_core::PlaybackSettings`].

use crate::error::{PlaybackError, Result};
use crate::events::PlaybackEvent;
use crate::types::{LoopRange, PlaybackState};
use tilawa_core::PlaybackSettings;

/// Track index and loop state machine
///
/// Indices are 1-based: valid tracks are `1..=total_tracks`. The loop
/// range starts as the whole set and always satisfies `start <= end`.
#[derive(Debug)]
pub struct Sequencer {
    settings: PlaybackSettings,
    current_index: u32,
    loop_range: LoopRange,
    looping: bool,
    state: PlaybackState,
    pending_events: Vec<PlaybackEvent>,
}

impl Sequencer {
    /// Create a sequencer positioned on track 1 with looping off and
    /// the loop range spanning the whole track set
    pub fn new(settings: PlaybackSettings) -> Self {
        Self {
            settings,
            current_index: 1,
            loop_range: LoopRange::new(1, settings.total_tracks),
            looping: false,
            state: PlaybackState::Stopped,
            pending_events: Vec::new(),
        }
    }

    // ===== State Queries =====

    /// Index of the current track
    pub fn current_index(&self) -> u32 {
        self.current_index
    }

    /// Current loop range (always ordered)
    pub fn loop_range(&self) -> LoopRange {
        self.loop_range
    }

    /// Whether looping is currently enabled
    pub fn is_looping(&self) -> bool {
        self.looping
    }

    /// Current playback state
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Number of tracks in the set
    pub fn total_tracks(&self) -> u32 {
        self.settings.total_tracks
    }

    /// Whether this configuration has loop controls
    pub fn looping_supported(&self) -> bool {
        self.settings.looping_supported
    }

    // ===== Track Transitions =====

    /// Advance after the current track finished
    ///
    /// With looping enabled the loop range overrides total-track
    /// wraparound: reaching `loop_end` returns to `loop_start`. With
    /// looping off (or unsupported) the set wraps from the last track
    /// back to 1. Returns the new index.
    pub fn handle_track_end(&mut self) -> u32 {
        let next = if self.looping {
            if self.current_index >= self.loop_range.end {
                self.loop_range.start
            } else {
                self.current_index + 1
            }
        } else if self.current_index >= self.settings.total_tracks {
            1
        } else {
            self.current_index + 1
        };

        self.change_track(next);
        next
    }

    /// Jump directly to a chosen track
    ///
    /// Loop range and looping flag are left untouched, even when the
    /// chosen track lies outside the loop range.
    pub fn select_track(&mut self, index: u32) -> Result<()> {
        self.check_track_index(index)?;
        self.change_track(index);
        Ok(())
    }

    // ===== Loop Controls =====

    /// Replace the loop range with two candidate bounds
    ///
    /// Bounds given in descending order are swapped so the stored range
    /// is always ordered; the returned range carries the ordering the
    /// selections should display. If looping is enabled and the current
    /// track falls outside the new range, playback relocates to the new
    /// loop start immediately.
    pub fn set_loop_range(&mut self, start: u32, end: u32) -> Result<LoopRange> {
        self.check_looping_supported()?;
        self.check_loop_bound(start)?;
        self.check_loop_bound(end)?;

        let range = LoopRange::new(start, end);
        self.loop_range = range;
        tracing::debug!(start = range.start, end = range.end, "loop range changed");
        self.pending_events.push(PlaybackEvent::LoopRangeChanged {
            start: range.start,
            end: range.end,
        });

        if self.looping && !range.contains(self.current_index) {
            self.change_track(range.start);
        }

        Ok(range)
    }

    /// Enable or disable looping
    pub fn set_looping(&mut self, enabled: bool) -> Result<()> {
        self.check_looping_supported()?;

        if self.looping != enabled {
            self.looping = enabled;
            tracing::debug!(enabled, "looping toggled");
            self.pending_events
                .push(PlaybackEvent::LoopingChanged { enabled });
        }
        Ok(())
    }

    /// Flip the looping flag, returning the new value
    pub fn toggle_looping(&mut self) -> Result<bool> {
        self.set_looping(!self.looping)?;
        Ok(self.looping)
    }

    // ===== Playback State =====

    /// Record that the current track started loading
    pub fn track_loading(&mut self) {
        self.transition(PlaybackState::Loading);
    }

    /// Record that audio for the current track is running
    pub fn track_started(&mut self) {
        self.transition(PlaybackState::Playing);
    }

    /// Pause playback
    pub fn pause(&mut self) -> Result<()> {
        if self.state != PlaybackState::Playing {
            return Err(PlaybackError::InvalidOperation(format!(
                "cannot pause from {:?}",
                self.state
            )));
        }
        self.transition(PlaybackState::Paused);
        Ok(())
    }

    /// Resume paused playback
    pub fn resume(&mut self) -> Result<()> {
        if self.state != PlaybackState::Paused {
            return Err(PlaybackError::InvalidOperation(format!(
                "cannot resume from {:?}",
                self.state
            )));
        }
        self.transition(PlaybackState::Playing);
        Ok(())
    }

    /// Stop playback, keeping the current index
    pub fn stop(&mut self) {
        self.transition(PlaybackState::Stopped);
    }

    // ===== Events =====

    /// Take all queued events, oldest first
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.pending_events)
    }

    // ===== Internals =====

    fn change_track(&mut self, index: u32) {
        self.current_index = index;
        tracing::debug!(index, "track changed");
        self.pending_events
            .push(PlaybackEvent::TrackChanged { index });
    }

    fn transition(&mut self, state: PlaybackState) {
        if self.state != state {
            self.state = state;
            self.pending_events
                .push(PlaybackEvent::StateChanged { state });
        }
    }

    fn check_track_index(&self, index: u32) -> Result<()> {
        if index < 1 || index > self.settings.total_tracks {
            return Err(PlaybackError::InvalidTrackIndex {
                index,
                total: self.settings.total_tracks,
            });
        }
        Ok(())
    }

    fn check_loop_bound(&self, bound: u32) -> Result<()> {
        if bound < 1 || bound > self.settings.total_tracks {
            return Err(PlaybackError::InvalidLoopBound {
                bound,
                total: self.settings.total_tracks,
            });
        }
        Ok(())
    }

    fn check_looping_supported(&self) -> Result<()> {
        if !self.settings.looping_supported {
            return Err(PlaybackError::LoopingUnsupported);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn looping_sequencer() -> Sequencer {
        Sequencer::new(PlaybackSettings {
            total_tracks: 15,
            looping_supported: true,
        })
    }

    fn plain_sequencer() -> Sequencer {
        Sequencer::new(PlaybackSettings {
            total_tracks: 13,
            looping_supported: false,
        })
    }

    #[test]
    fn starts_on_track_one_with_full_range() {
        let sequencer = looping_sequencer();
        assert_eq!(sequencer.current_index(), 1);
        assert_eq!(sequencer.loop_range(), LoopRange::new(1, 15));
        assert!(!sequencer.is_looping());
        assert_eq!(sequencer.state(), PlaybackState::Stopped);
    }

    #[test]
    fn advance_increments_and_wraps_at_total() {
        let mut sequencer = plain_sequencer();
        assert_eq!(sequencer.handle_track_end(), 2);

        for _ in 0..10 {
            sequencer.handle_track_end();
        }
        assert_eq!(sequencer.current_index(), 12);
        assert_eq!(sequencer.handle_track_end(), 13);
        assert_eq!(sequencer.handle_track_end(), 1);
    }

    #[test]
    fn advance_with_looping_off_ignores_loop_range() {
        let mut sequencer = looping_sequencer();
        sequencer.set_loop_range(3, 7).unwrap();
        sequencer.select_track(7).unwrap();

        assert_eq!(sequencer.handle_track_end(), 8);
    }

    #[test]
    fn loop_advance_wraps_at_loop_end() {
        let mut sequencer = looping_sequencer();
        sequencer.set_loop_range(3, 7).unwrap();
        sequencer.set_looping(true).unwrap();

        sequencer.select_track(7).unwrap();
        assert_eq!(sequencer.handle_track_end(), 3);

        sequencer.select_track(4).unwrap();
        assert_eq!(sequencer.handle_track_end(), 5);
    }

    #[test]
    fn reversed_loop_bounds_are_swapped() {
        let mut sequencer = looping_sequencer();
        let range = sequencer.set_loop_range(9, 4).unwrap();

        assert_eq!(range, LoopRange::new(4, 9));
        assert_eq!(sequencer.loop_range(), LoopRange::new(4, 9));
    }

    #[test]
    fn select_track_validates_bounds() {
        let mut sequencer = looping_sequencer();
        assert!(matches!(
            sequencer.select_track(0),
            Err(PlaybackError::InvalidTrackIndex { index: 0, total: 15 })
        ));
        assert!(matches!(
            sequencer.select_track(16),
            Err(PlaybackError::InvalidTrackIndex { index: 16, .. })
        ));
        assert_eq!(sequencer.current_index(), 1);
    }

    #[test]
    fn select_track_leaves_loop_state_untouched() {
        let mut sequencer = looping_sequencer();
        sequencer.set_loop_range(3, 7).unwrap();
        sequencer.set_looping(true).unwrap();

        sequencer.select_track(12).unwrap();

        assert_eq!(sequencer.current_index(), 12);
        assert_eq!(sequencer.loop_range(), LoopRange::new(3, 7));
        assert!(sequencer.is_looping());
    }

    #[test]
    fn range_excluding_current_relocates_to_loop_start() {
        let mut sequencer = looping_sequencer();
        sequencer.set_looping(true).unwrap();
        sequencer.select_track(2).unwrap();
        sequencer.drain_events();

        sequencer.set_loop_range(5, 8).unwrap();

        assert_eq!(sequencer.current_index(), 5);
        let events = sequencer.drain_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, PlaybackEvent::TrackChanged { index: 5 })));
    }

    #[test]
    fn range_excluding_current_without_looping_stays_put() {
        let mut sequencer = looping_sequencer();
        sequencer.select_track(2).unwrap();

        sequencer.set_loop_range(5, 8).unwrap();

        assert_eq!(sequencer.current_index(), 2);
    }

    #[test]
    fn loop_controls_rejected_without_support() {
        let mut sequencer = plain_sequencer();

        assert!(matches!(
            sequencer.set_looping(true),
            Err(PlaybackError::LoopingUnsupported)
        ));
        assert!(matches!(
            sequencer.set_loop_range(2, 5),
            Err(PlaybackError::LoopingUnsupported)
        ));
        assert!(!sequencer.is_looping());
        assert_eq!(sequencer.loop_range(), LoopRange::new(1, 13));
    }

    #[test]
    fn loop_bounds_validated_against_track_count() {
        let mut sequencer = looping_sequencer();
        assert!(matches!(
            sequencer.set_loop_range(0, 5),
            Err(PlaybackError::InvalidLoopBound { bound: 0, .. })
        ));
        assert!(matches!(
            sequencer.set_loop_range(2, 16),
            Err(PlaybackError::InvalidLoopBound { bound: 16, .. })
        ));
    }

    #[test]
    fn toggle_looping_flips_and_reports() {
        let mut sequencer = looping_sequencer();
        assert!(sequencer.toggle_looping().unwrap());
        assert!(!sequencer.toggle_looping().unwrap());
    }

    #[test]
    fn track_changes_queue_events() {
        let mut sequencer = looping_sequencer();
        sequencer.select_track(3).unwrap();
        sequencer.handle_track_end();

        let events = sequencer.drain_events();
        let indices: Vec<u32> = events
            .iter()
            .filter_map(|e| match e {
                PlaybackEvent::TrackChanged { index } => Some(*index),
                _ => None,
            })
            .collect();
        assert_eq!(indices, vec![3, 4]);

        assert!(sequencer.drain_events().is_empty());
    }

    #[test]
    fn state_transitions_follow_lifecycle() {
        let mut sequencer = looping_sequencer();

        sequencer.track_loading();
        assert_eq!(sequencer.state(), PlaybackState::Loading);

        sequencer.track_started();
        assert_eq!(sequencer.state(), PlaybackState::Playing);

        sequencer.pause().unwrap();
        assert_eq!(sequencer.state(), PlaybackState::Paused);

        sequencer.resume().unwrap();
        assert_eq!(sequencer.state(), PlaybackState::Playing);

        sequencer.stop();
        assert_eq!(sequencer.state(), PlaybackState::Stopped);
    }

    #[test]
    fn pause_requires_playing() {
        let mut sequencer = looping_sequencer();
        assert!(sequencer.pause().is_err());

        sequencer.track_started();
        assert!(sequencer.pause().is_ok());
        assert!(sequencer.pause().is_err());
    }

    #[test]
    fn resume_requires_paused() {
        let mut sequencer = looping_sequencer();
        assert!(sequencer.resume().is_err());
    }

    #[test]
    fn repeated_state_has_no_duplicate_events() {
        let mut sequencer = looping_sequencer();
        sequencer.track_started();
        sequencer.drain_events();

        sequencer.track_started();
        assert!(sequencer.drain_events().is_empty());
    }
}
