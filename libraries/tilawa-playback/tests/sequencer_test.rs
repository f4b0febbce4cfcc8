//! Integration tests for the playback sequencer
//!
//! Walks the sequencer through whole listening sessions for both player
//! configurations and checks the emitted events along the way.

use tilawa_core::PlaybackSettings;
use tilawa_playback::{LoopRange, PlaybackEvent, PlaybackState, Sequencer};

fn looping_player() -> Sequencer {
    Sequencer::new(PlaybackSettings {
        total_tracks: 15,
        looping_supported: true,
    })
}

fn plain_player() -> Sequencer {
    Sequencer::new(PlaybackSettings {
        total_tracks: 13,
        looping_supported: false,
    })
}

fn track_changes(events: &[PlaybackEvent]) -> Vec<u32> {
    events
        .iter()
        .filter_map(|e| match e {
            PlaybackEvent::TrackChanged { index } => Some(*index),
            _ => None,
        })
        .collect()
}

#[test]
fn plain_player_cycles_through_all_thirteen_tracks() {
    let mut sequencer = plain_player();

    let mut visited = vec![sequencer.current_index()];
    for _ in 0..13 {
        visited.push(sequencer.handle_track_end());
    }

    assert_eq!(
        visited,
        vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 1]
    );
}

#[test]
fn loop_session_walkthrough() {
    let mut sequencer = looping_player();
    sequencer.set_loop_range(3, 7).unwrap();
    sequencer.set_looping(true).unwrap();
    sequencer.select_track(3).unwrap();
    sequencer.drain_events();

    let mut visited = Vec::new();
    for _ in 0..6 {
        visited.push(sequencer.handle_track_end());
    }

    assert_eq!(visited, vec![4, 5, 6, 7, 3, 4]);
    assert_eq!(track_changes(&sequencer.drain_events()), visited);
}

#[test]
fn swapped_range_change_relocates_current_track() {
    let mut sequencer = looping_player();
    sequencer.set_looping(true).unwrap();
    sequencer.select_track(10).unwrap();
    sequencer.drain_events();

    // Bounds arrive reversed; they are stored swapped and the current
    // track (10) falls outside (2, 8), so playback relocates to 2.
    let range = sequencer.set_loop_range(8, 2).unwrap();

    assert_eq!(range, LoopRange::new(2, 8));
    assert_eq!(sequencer.current_index(), 2);

    let events = sequencer.drain_events();
    assert!(events
        .iter()
        .any(|e| matches!(e, PlaybackEvent::LoopRangeChanged { start: 2, end: 8 })));
    assert!(events
        .iter()
        .any(|e| matches!(e, PlaybackEvent::TrackChanged { index: 2 })));
}

#[test]
fn selection_above_loop_end_wraps_into_range_on_advance() {
    let mut sequencer = looping_player();
    sequencer.set_loop_range(3, 7).unwrap();
    sequencer.set_looping(true).unwrap();

    // Explicit selection may leave the range; the next advance applies
    // the loop rule: 12 >= 7, so playback returns to the loop start.
    sequencer.select_track(12).unwrap();
    assert_eq!(sequencer.handle_track_end(), 3);
}

#[test]
fn selection_below_loop_start_steps_toward_range() {
    let mut sequencer = looping_player();
    sequencer.set_loop_range(5, 9).unwrap();
    sequencer.set_looping(true).unwrap();

    sequencer.select_track(2).unwrap();

    // Below the range the loop rule just increments until the range is
    // reached.
    assert_eq!(sequencer.handle_track_end(), 3);
    assert_eq!(sequencer.handle_track_end(), 4);
    assert_eq!(sequencer.handle_track_end(), 5);
}

#[test]
fn disabling_looping_restores_plain_wraparound() {
    let mut sequencer = looping_player();
    sequencer.set_loop_range(3, 7).unwrap();
    sequencer.set_looping(true).unwrap();
    sequencer.select_track(7).unwrap();

    sequencer.set_looping(false).unwrap();

    assert_eq!(sequencer.handle_track_end(), 8);

    sequencer.select_track(15).unwrap();
    assert_eq!(sequencer.handle_track_end(), 1);
}

#[test]
fn playback_lifecycle_emits_state_events() {
    let mut sequencer = looping_player();

    sequencer.track_loading();
    sequencer.track_started();
    sequencer.pause().unwrap();
    sequencer.resume().unwrap();
    sequencer.stop();

    let states: Vec<PlaybackState> = sequencer
        .drain_events()
        .iter()
        .filter_map(|e| match e {
            PlaybackEvent::StateChanged { state } => Some(*state),
            _ => None,
        })
        .collect();

    assert_eq!(
        states,
        vec![
            PlaybackState::Loading,
            PlaybackState::Playing,
            PlaybackState::Paused,
            PlaybackState::Playing,
            PlaybackState::Stopped,
        ]
    );
}

#[test]
fn single_track_loop_repeats_it() {
    let mut sequencer = looping_player();
    sequencer.set_loop_range(4, 4).unwrap();
    sequencer.set_looping(true).unwrap();
    sequencer.select_track(4).unwrap();

    assert_eq!(sequencer.handle_track_end(), 4);
    assert_eq!(sequencer.handle_track_end(), 4);
}
