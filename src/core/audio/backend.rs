//=========================================================================
// Audio Backend
//=========================================================================
//
// The device-facing half of the audio system.
//
// The `AudioManager` owns policy (volumes, mute, which voices belong to
// which sound id, which track is current). A backend only knows how to
// decode bytes, start and stop voices, and drive streamed music tracks.
//
// Voices:  decoded in memory, many may overlap, finish on their own
// Tracks:  opened from a URL, decoded while playing, one gain each
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

//=== AudioError ==========================================================

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("audio output unavailable: {0}")]
    Unavailable(String),

    #[error("failed to decode sound {id}: {reason}")]
    Decode { id: String, reason: String },

    #[error("playback failed: {0}")]
    Playback(String),

    #[error("failed to fetch audio: {0}")]
    Fetch(#[from] crate::core::assets::AssetError),
}

//=== SoundBuffer =========================================================

/// Fully decoded PCM, interleaved `f32` samples.
#[derive(Debug, Clone, PartialEq)]
pub struct SoundBuffer {
    pub channels: u16,
    pub sample_rate: u32,
    pub samples: Arc<[f32]>,
}

impl SoundBuffer {
    pub fn new(channels: u16, sample_rate: u32, samples: Vec<f32>) -> Self {
        Self {
            channels,
            sample_rate,
            samples: samples.into(),
        }
    }

    /// Playback length at normal rate.
    pub fn duration(&self) -> Duration {
        if self.channels == 0 || self.sample_rate == 0 {
            return Duration::ZERO;
        }
        let frames = self.samples.len() as f64 / f64::from(self.channels);
        Duration::from_secs_f64(frames / f64::from(self.sample_rate))
    }
}

//=== Handles =============================================================

/// One playing instance of a decoded sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VoiceHandle(pub u64);

/// One opened music track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrackHandle(pub u64);

/// Per-voice playback settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceParams {
    /// Final linear gain, already multiplied through master and category.
    pub gain: f32,
    pub looping: bool,
    pub playback_rate: f32,
}

//=== AudioBackend ========================================================

pub trait AudioBackend {
    //--- Sound Effects ----------------------------------------------------

    fn decode(&mut self, id: &str, bytes: &[u8]) -> Result<SoundBuffer, AudioError>;

    fn start_voice(&mut self, buffer: &SoundBuffer, params: VoiceParams) -> Result<VoiceHandle, AudioError>;

    /// Stopping a finished or unknown voice is a no-op.
    fn stop_voice(&mut self, voice: VoiceHandle);

    /// True once a non-looping voice has played to the end, or after it
    /// was stopped.
    fn is_voice_finished(&self, voice: VoiceHandle) -> bool;

    //--- Music ------------------------------------------------------------

    /// Registers a streamed track. Nothing is decoded until it plays.
    fn open_track(&mut self, url: &str, looping: bool) -> Result<TrackHandle, AudioError>;

    /// Starts or resumes `track`; `from_start` rewinds first.
    fn play_track(&mut self, track: TrackHandle, from_start: bool) -> Result<(), AudioError>;

    fn pause_track(&mut self, track: TrackHandle);

    fn set_track_gain(&mut self, track: TrackHandle, gain: f32);

    //--- Lifecycle --------------------------------------------------------

    /// Releases the output device. Further calls are no-ops.
    fn close(&mut self);

    fn is_closed(&self) -> bool;
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory backend recording every call, shared with the test body
    //! through `Rc<RefCell<_>>`.

    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    pub struct VoiceRecord {
        pub params: VoiceParams,
        pub stopped: bool,
        pub finished: bool,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct TrackRecord {
        pub url: String,
        pub looping: bool,
        pub playing: bool,
        pub gain: f32,
        pub rewinds: u32,
    }

    #[derive(Debug, Default)]
    pub struct FakeState {
        pub voices: HashMap<u64, VoiceRecord>,
        pub tracks: HashMap<u64, TrackRecord>,
        pub decoded: Vec<String>,
        pub closed: bool,
        next_id: u64,
    }

    impl FakeState {
        /// Marks a voice as having played to its natural end.
        pub fn finish_voice(&mut self, id: u64) {
            if let Some(voice) = self.voices.get_mut(&id) {
                voice.finished = true;
            }
        }

        pub fn live_voices(&self) -> usize {
            self.voices.values().filter(|v| !v.stopped && !v.finished).count()
        }

        pub fn track_by_url(&self, url: &str) -> Option<&TrackRecord> {
            self.tracks.values().find(|t| t.url == url)
        }
    }

    #[derive(Debug, Default, Clone)]
    pub struct FakeBackend {
        pub state: Rc<RefCell<FakeState>>,
    }

    impl FakeBackend {
        pub fn new() -> (Self, Rc<RefCell<FakeState>>) {
            let backend = Self::default();
            let state = backend.state.clone();
            (backend, state)
        }
    }

    impl AudioBackend for FakeBackend {
        fn decode(&mut self, id: &str, bytes: &[u8]) -> Result<SoundBuffer, AudioError> {
            if bytes.starts_with(b"BAD") {
                return Err(AudioError::Decode {
                    id: id.to_string(),
                    reason: "bad header".into(),
                });
            }
            self.state.borrow_mut().decoded.push(id.to_string());
            Ok(SoundBuffer::new(1, 8_000, vec![0.0; bytes.len()]))
        }

        fn start_voice(&mut self, _buffer: &SoundBuffer, params: VoiceParams) -> Result<VoiceHandle, AudioError> {
            let mut state = self.state.borrow_mut();
            state.next_id += 1;
            let id = state.next_id;
            state.voices.insert(
                id,
                VoiceRecord {
                    params,
                    stopped: false,
                    finished: false,
                },
            );
            Ok(VoiceHandle(id))
        }

        fn stop_voice(&mut self, voice: VoiceHandle) {
            if let Some(record) = self.state.borrow_mut().voices.get_mut(&voice.0) {
                record.stopped = true;
            }
        }

        fn is_voice_finished(&self, voice: VoiceHandle) -> bool {
            self.state
                .borrow()
                .voices
                .get(&voice.0)
                .map(|v| v.finished || v.stopped)
                .unwrap_or(true)
        }

        fn open_track(&mut self, url: &str, looping: bool) -> Result<TrackHandle, AudioError> {
            let mut state = self.state.borrow_mut();
            state.next_id += 1;
            let id = state.next_id;
            state.tracks.insert(
                id,
                TrackRecord {
                    url: url.to_string(),
                    looping,
                    playing: false,
                    gain: 1.0,
                    rewinds: 0,
                },
            );
            Ok(TrackHandle(id))
        }

        fn play_track(&mut self, track: TrackHandle, from_start: bool) -> Result<(), AudioError> {
            let mut state = self.state.borrow_mut();
            let record = state
                .tracks
                .get_mut(&track.0)
                .ok_or_else(|| AudioError::Playback("unknown track".into()))?;
            if record.url.contains("unplayable") {
                return Err(AudioError::Playback("unsupported format".into()));
            }
            record.playing = true;
            if from_start {
                record.rewinds += 1;
            }
            Ok(())
        }

        fn pause_track(&mut self, track: TrackHandle) {
            if let Some(record) = self.state.borrow_mut().tracks.get_mut(&track.0) {
                record.playing = false;
            }
        }

        fn set_track_gain(&mut self, track: TrackHandle, gain: f32) {
            if let Some(record) = self.state.borrow_mut().tracks.get_mut(&track.0) {
                record.gain = gain;
            }
        }

        fn close(&mut self) {
            self.state.borrow_mut().closed = true;
        }

        fn is_closed(&self) -> bool {
            self.state.borrow().closed
        }
    }
}
