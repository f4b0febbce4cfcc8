//! Player application
//!
//! Wires the sequencer, track loader, output engine, analyser and
//! frame renderers together and runs the input/render loop.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use anyhow::Result;
use tracing::{debug, warn};

use tilawa_audio::effects::CompressorSettings;
use tilawa_audio::{rms_level, Analyser, AnalyserConfig, NormalizerController};
use tilawa_core::PlayerConfig;
use tilawa_playback::{PlaybackEvent, PlaybackState, Sequencer};

use crate::engine::{EngineCommand, EngineEvent, OutputEngine};
use crate::loader::{LoadRequest, TrackLoader};
use crate::render::{meter_percent, MeterTask, SpectrumTask};
use crate::ui::{FrameView, MeterView, PlayerInput, TerminalSession};

const HELP_LINE: &str = "left/right track   digits+enter goto   space pause   l loop   [ ] { } loop range   n normalizer   up/down target   q quit";

/// Step applied to the normalizer target per key press
const TARGET_STEP: f32 = 0.1;

/// Top-level player
pub struct App {
    config: PlayerConfig,
    sequencer: Sequencer,
    normalizer: NormalizerController,
    analyser: Arc<Mutex<Analyser>>,
    engine: OutputEngine,
    loader: TrackLoader,
    spectrum: SpectrumTask,
    meter: MeterTask,
    /// Scratch copy of the analyser bins, refreshed once per frame
    bins: Vec<u8>,
    /// Digits typed toward a direct track jump, committed with enter
    pending_track: String,
    /// Transient message shown on the status row until the next track
    /// load clears it
    notice: Option<String>,
}

impl App {
    /// Build the full playback pipeline from configuration
    pub fn new(config: PlayerConfig) -> Result<Self> {
        let analyser = Arc::new(Mutex::new(Analyser::new(AnalyserConfig::default())));
        let (engine, gain) = OutputEngine::new(Arc::clone(&analyser), CompressorSettings::new())?;
        let normalizer = NormalizerController::new(&config.normalizer, gain);
        let sequencer = Sequencer::new(config.playback);
        let loader = TrackLoader::new()?;
        let bin_count = analyser
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .bin_count();

        Ok(Self {
            config,
            sequencer,
            normalizer,
            analyser,
            engine,
            loader,
            spectrum: SpectrumTask::new(),
            meter: MeterTask::new(),
            bins: vec![0; bin_count],
            pending_track: String::new(),
            notice: None,
        })
    }

    /// Run the player until the user quits
    ///
    /// Starts both renderers, kicks off the first track, then loops:
    /// poll input for up to one frame budget, apply pending engine and
    /// sequencer events, paint. The renderers stop when the loop ends.
    pub fn run(&mut self) -> Result<()> {
        let mut session = TerminalSession::new()?;
        self.spectrum.start();
        self.meter.start();

        self.request_track(self.sequencer.current_index());
        let frame_budget = Duration::from_millis(u64::from(1000 / self.config.ui.frame_rate.max(1)));

        loop {
            match session.poll_input(frame_budget)? {
                Some(PlayerInput::Quit) => break,
                Some(input) => self.handle_input(input),
                None => {}
            }

            self.poll_engine();
            self.drain_sequencer_events();
            self.poll_loader();
            self.render_frame(&mut session)?;
        }

        self.spectrum.stop();
        self.meter.stop();
        Ok(())
    }

    fn handle_input(&mut self, input: PlayerInput) {
        match input {
            PlayerInput::Digit(digit) => {
                if self.pending_track.len() < 3 {
                    self.pending_track.push(digit);
                }
            }
            PlayerInput::CommitTrack => {
                let entry = std::mem::take(&mut self.pending_track);
                if !entry.is_empty() {
                    if let Some(notice) = commit_track_entry(&entry, &mut self.sequencer) {
                        self.notice = Some(notice);
                    }
                }
            }
            other => {
                let rms = rms_level(&self.bins);
                if let Some(command) =
                    apply_input(other, &mut self.sequencer, &mut self.normalizer, rms)
                {
                    if let Err(error) = self.engine.send(command) {
                        warn!("audio engine rejected {command:?}: {error}");
                    }
                }
            }
        }
    }

    fn drain_sequencer_events(&mut self) {
        for event in self.sequencer.drain_events() {
            match event {
                PlaybackEvent::TrackChanged { index } => self.request_track(index),
                PlaybackEvent::StateChanged { state } => debug!(?state, "playback state"),
                PlaybackEvent::LoopingChanged { enabled } => debug!(enabled, "looping"),
                PlaybackEvent::LoopRangeChanged { start, end } => debug!(start, end, "loop range"),
            }
        }
    }

    /// Kick off loading for `index`; playback starts when the decoded
    /// track comes back
    ///
    /// The old track is dropped first so it stops sounding right away,
    /// and stays silent if the new one fails to load.
    fn request_track(&mut self, index: u32) {
        self.engine.clear();
        self.sequencer.track_loading();
        self.notice = None;
        let request = LoadRequest {
            track_index: index,
            path: self.config.track_path(index),
            target_sample_rate: self.engine.sample_rate(),
        };
        if !self.loader.request(request) {
            self.notice = Some(format!("track {index} could not be queued"));
            self.sequencer.stop();
        }
    }

    fn poll_loader(&mut self) {
        while let Some(result) = self.loader.poll_ready() {
            if result.track_index != self.sequencer.current_index() {
                debug!(index = result.track_index, "dropping stale load result");
                continue;
            }
            match result.samples {
                Ok(samples) => {
                    self.engine.install(result.track_index, samples);
                    if let Err(error) = self.engine.send(EngineCommand::Play) {
                        warn!("cannot start track {}: {error}", result.track_index);
                        self.notice = Some(format!("track {} failed to start", result.track_index));
                        self.sequencer.stop();
                    }
                }
                Err(message) => {
                    warn!(index = result.track_index, "track failed to load: {message}");
                    self.notice = Some(format!("track {} failed: {message}", result.track_index));
                    self.sequencer.stop();
                }
            }
        }
    }

    fn poll_engine(&mut self) {
        while let Some(event) = self.engine.poll_event() {
            match event {
                EngineEvent::TrackStarted(index) => {
                    debug!(index, "track started");
                    self.sequencer.track_started();
                }
                EngineEvent::TrackFinished(index) => {
                    debug!(index, "track finished");
                    self.sequencer.handle_track_end();
                }
                EngineEvent::Error(message) => {
                    warn!("audio stream error: {message}");
                    self.notice = Some(message);
                }
            }
        }
    }

    fn render_frame(&mut self, session: &mut TerminalSession) -> Result<()> {
        {
            let analyser = self.analyser.lock().unwrap_or_else(PoisonError::into_inner);
            analyser.byte_frequency_bins(&mut self.bins);
        }
        let rms = rms_level(&self.bins);
        self.normalizer.update(rms);

        let (width, _) = session.size()?;
        let columns = self.spectrum.render(&self.bins, width as usize);
        let meter_width = (width as usize).saturating_sub(20).max(10);
        let meter = self.meter.render(rms, meter_width).map(|filled| MeterView {
            filled,
            width: meter_width,
            percent: meter_percent(rms),
        });

        let mut header = format!(
            "Track {} / {}   {}",
            self.sequencer.current_index(),
            self.sequencer.total_tracks(),
            state_label(self.sequencer.state())
        );
        if !self.pending_track.is_empty() {
            header.push_str(&format!("   goto {}_", self.pending_track));
        }
        let status = match &self.notice {
            Some(notice) => notice.clone(),
            None => status_line(&self.sequencer, &self.normalizer),
        };

        let view = FrameView {
            header: &header,
            spectrum: columns.as_deref(),
            meter,
            status: &status,
            help: HELP_LINE,
        };
        session.draw(&view)
    }
}

/// Apply a key action to the player state
///
/// Returns the transport command the audio engine should receive, if
/// any. Track changes go through the sequencer's event queue instead,
/// so loading stays in one place.
fn apply_input(
    input: PlayerInput,
    sequencer: &mut Sequencer,
    normalizer: &mut NormalizerController,
    rms: f32,
) -> Option<EngineCommand> {
    match input {
        PlayerInput::NextTrack => {
            let next = (sequencer.current_index() + 1).min(sequencer.total_tracks());
            select_if_new(sequencer, next);
            None
        }
        PlayerInput::PreviousTrack => {
            let previous = sequencer.current_index().saturating_sub(1).max(1);
            select_if_new(sequencer, previous);
            None
        }
        PlayerInput::TogglePause => match sequencer.state() {
            PlaybackState::Playing => {
                sequencer.pause().ok()?;
                Some(EngineCommand::Pause)
            }
            PlaybackState::Paused => {
                sequencer.resume().ok()?;
                Some(EngineCommand::Play)
            }
            PlaybackState::Stopped | PlaybackState::Loading => None,
        },
        PlayerInput::ToggleLooping => {
            if let Err(error) = sequencer.toggle_looping() {
                warn!("looping unavailable: {error}");
            }
            None
        }
        PlayerInput::LoopStartDown
        | PlayerInput::LoopStartUp
        | PlayerInput::LoopEndDown
        | PlayerInput::LoopEndUp => {
            let range = sequencer.loop_range();
            let total = sequencer.total_tracks();
            let (start, end) = match input {
                PlayerInput::LoopStartDown => (range.start.saturating_sub(1).max(1), range.end),
                PlayerInput::LoopStartUp => ((range.start + 1).min(total), range.end),
                PlayerInput::LoopEndDown => (range.start, range.end.saturating_sub(1).max(1)),
                _ => (range.start, (range.end + 1).min(total)),
            };
            if let Err(error) = sequencer.set_loop_range(start, end) {
                warn!("loop range unavailable: {error}");
            }
            None
        }
        PlayerInput::ToggleNormalizer => {
            normalizer.toggle();
            None
        }
        PlayerInput::TargetUp => {
            normalizer.set_target_level(normalizer.target_level() + TARGET_STEP);
            normalizer.update(rms);
            None
        }
        PlayerInput::TargetDown => {
            normalizer.set_target_level(normalizer.target_level() - TARGET_STEP);
            normalizer.update(rms);
            None
        }
        PlayerInput::Quit | PlayerInput::Digit(_) | PlayerInput::CommitTrack => None,
    }
}

/// Jump to a typed track entry, returning a status notice on failure
fn commit_track_entry(entry: &str, sequencer: &mut Sequencer) -> Option<String> {
    let Ok(index) = entry.parse::<u32>() else {
        return Some(format!("invalid track entry {entry}"));
    };
    if index == sequencer.current_index() {
        return None;
    }
    if let Err(error) = sequencer.select_track(index) {
        warn!("cannot select track {index}: {error}");
        return Some(format!("no track {index}"));
    }
    None
}

fn select_if_new(sequencer: &mut Sequencer, index: u32) {
    if index != sequencer.current_index() {
        if let Err(error) = sequencer.select_track(index) {
            warn!("cannot select track {index}: {error}");
        }
    }
}

fn state_label(state: PlaybackState) -> &'static str {
    match state {
        PlaybackState::Stopped => "Stopped",
        PlaybackState::Loading => "Loading",
        PlaybackState::Playing => "Playing",
        PlaybackState::Paused => "Paused",
    }
}

/// Loop and normalizer summary for the status row
fn status_line(sequencer: &Sequencer, normalizer: &NormalizerController) -> String {
    let range = sequencer.loop_range();
    let loop_part = if sequencer.looping_supported() {
        format!(
            "Loop: {} {}-{}",
            if sequencer.is_looping() { "ON" } else { "OFF" },
            range.start,
            range.end
        )
    } else {
        "Loop: unavailable".to_string()
    };
    format!(
        "{loop_part}   Normalizer: {} target {:.1}",
        if normalizer.is_enabled() { "ON" } else { "OFF" },
        normalizer.target_level()
    )
}
