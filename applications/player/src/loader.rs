//! Background track loader
//!
//! Decoding a track takes file I/O plus a full decode pass, far too
//! long for either the audio callback or the frame loop. A dedicated
//! thread takes load requests and hands back decoded buffers; the frame
//! loop polls for results between frames.

use std::path::PathBuf;
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};
use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError, TrySendError};

use crate::decode;

/// Request to load a track
#[derive(Debug, Clone)]
pub struct LoadRequest {
    /// Track number, echoed back in the result
    pub track_index: u32,
    /// Path to the audio file
    pub path: PathBuf,
    /// Output device rate the samples must be converted to
    pub target_sample_rate: u32,
}

/// Result of loading a track
pub struct LoadResult {
    /// Track number from the request
    pub track_index: u32,
    /// Decoded stereo samples, or the failure rendered for display
    pub samples: std::result::Result<Vec<f32>, String>,
}

/// Background track loader thread
pub struct TrackLoader {
    request_tx: Sender<LoadRequest>,
    result_rx: Receiver<LoadResult>,
    _thread: JoinHandle<()>,
}

impl TrackLoader {
    /// Spawn the loader thread
    pub fn new() -> Result<Self> {
        let (request_tx, request_rx) = bounded::<LoadRequest>(4);
        let (result_tx, result_rx) = bounded::<LoadResult>(4);

        let thread = thread::Builder::new()
            .name("track-loader".to_string())
            .spawn(move || loader_thread(&request_rx, &result_tx))
            .context("failed to spawn track loader thread")?;

        Ok(Self {
            request_tx,
            result_rx,
            _thread: thread,
        })
    }

    /// Queue a load request (non-blocking)
    ///
    /// Returns false if the request queue is full or the loader thread
    /// is gone.
    pub fn request(&self, request: LoadRequest) -> bool {
        match self.request_tx.try_send(request) {
            Ok(()) => true,
            Err(TrySendError::Full(request)) => {
                tracing::warn!("load queue full, dropping track {}", request.track_index);
                false
            }
            Err(TrySendError::Disconnected(_)) => {
                tracing::warn!("track loader thread is gone");
                false
            }
        }
    }

    /// Poll for a finished load (non-blocking)
    pub fn poll_ready(&self) -> Option<LoadResult> {
        match self.result_rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                tracing::warn!("track loader thread is gone");
                None
            }
        }
    }
}

/// Loader thread body, runs until the request channel closes
fn loader_thread(request_rx: &Receiver<LoadRequest>, result_tx: &Sender<LoadResult>) {
    while let Ok(request) = request_rx.recv() {
        tracing::debug!(
            "loading track {} from {}",
            request.track_index,
            request.path.display()
        );

        let samples = decode::load_track(&request.path, request.target_sample_rate)
            .map_err(|e| e.to_string());

        let result = LoadResult {
            track_index: request.track_index,
            samples,
        };
        if result_tx.send(result).is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn wait_for_result(loader: &TrackLoader) -> LoadResult {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(result) = loader.poll_ready() {
                return result;
            }
            assert!(Instant::now() < deadline, "loader did not respond");
            thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn failed_load_reports_the_error() {
        let loader = TrackLoader::new().unwrap();
        assert!(loader.request(LoadRequest {
            track_index: 2,
            path: "/nonexistent/tiktokQuran2.mp3".into(),
            target_sample_rate: 44100,
        }));

        let result = wait_for_result(&loader);
        assert_eq!(result.track_index, 2);
        assert!(result.samples.is_err());
    }

    #[test]
    fn results_come_back_in_request_order() {
        let loader = TrackLoader::new().unwrap();
        for index in [5, 9] {
            assert!(loader.request(LoadRequest {
                track_index: index,
                path: format!("/nonexistent/tiktokQuran{index}.mp3").into(),
                target_sample_rate: 48000,
            }));
        }

        assert_eq!(wait_for_result(&loader).track_index, 5);
        assert_eq!(wait_for_result(&loader).track_index, 9);
    }

    #[test]
    fn idle_loader_has_nothing_ready() {
        let loader = TrackLoader::new().unwrap();
        assert!(loader.poll_ready().is_none());
    }
}
