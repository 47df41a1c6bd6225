//=========================================================================
// Audio Manager
//=========================================================================
//
// Sound effects, streamed music and the volume policy around them.
//
// Architecture:
//   init / begin_load → AssetLoader (fetch on workers) → backend.decode
//                                                          ↓
//   play_sound(id) → backend.start_voice(gain = vol × master × sfx)
//   play_music(id) → backend.play_track, gain = track × master × music
//
// Without a backend (no output device, feature disabled) every call is a
// silent no-op. After destroy() the same holds, and loads still in flight
// are discarded when they land.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;

use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};

//=== Internal Dependencies ===============================================

use super::backend::{AudioBackend, AudioError, SoundBuffer, TrackHandle, VoiceHandle, VoiceParams};
use super::preferences::{clamp_volume, AudioPreferences};
use crate::core::assets::{self, AssetError, AssetLoader, Loaded};
use crate::core::storage::SharedStore;

//=== AudioAsset ==========================================================

/// A named sound effect to fetch and decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioAsset {
    pub id: String,
    pub url: String,
}

impl AudioAsset {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
        }
    }
}

//=== MusicTrack ==========================================================

#[derive(Debug, Clone)]
struct MusicTrack {
    handle: TrackHandle,
    /// Per-track base volume, multiplied into every applied gain.
    volume: f32,
}

//=== AudioManager ========================================================

pub struct AudioManager {
    backend: Option<Box<dyn AudioBackend>>,
    store: SharedStore,
    prefs: AudioPreferences,

    sounds: HashMap<String, SoundBuffer>,
    voices: HashMap<String, Vec<VoiceHandle>>,
    music: HashMap<String, MusicTrack>,
    current_music: Option<String>,

    loader: AssetLoader<Vec<u8>>,
    destroyed: bool,
}

impl AudioManager {
    /// Builds a manager over `backend`, restoring preferences from `store`.
    pub fn new(backend: Option<Box<dyn AudioBackend>>, store: SharedStore) -> Self {
        let prefs = AudioPreferences::load(&*store);
        if backend.is_none() {
            warn!(target: "audio", "No audio output available; audio calls will be ignored");
        }
        debug!(target: "audio", "Restored preferences {:?}", prefs);

        Self {
            backend,
            store,
            prefs,
            sounds: HashMap::new(),
            voices: HashMap::new(),
            music: HashMap::new(),
            current_music: None,
            loader: AssetLoader::new(),
            destroyed: false,
        }
    }

    /// Builds a manager on the platform's default output device, if the
    /// crate was built with one and a device can be opened.
    pub fn with_default_output(store: SharedStore) -> Self {
        Self::new(default_backend(), store)
    }

    fn active(&self) -> bool {
        !self.destroyed && self.backend.is_some()
    }

    //--- Loading ----------------------------------------------------------

    /// Fetches every asset concurrently and decodes them as they land.
    /// Failures are logged per asset. Returns how many decoded.
    pub fn init(&mut self, batch: &[AudioAsset]) -> usize {
        if !self.active() {
            return 0;
        }
        self.begin_load(batch);
        let results = self.loader.wait_all();
        let loaded = self.decode_all(results);
        info!(target: "audio", "Loaded {}/{} sound(s)", loaded, batch.len());
        loaded
    }

    /// Fetches and decodes one sound on the calling thread.
    pub fn load_sound(&mut self, id: &str, url: &str) -> Result<(), AudioError> {
        if !self.active() {
            return Ok(());
        }
        let fetched = assets::fetch_bytes(url);
        self.decode_one(id, fetched)
    }

    /// Starts fetching `batch` on worker threads without blocking.
    pub fn begin_load(&mut self, batch: &[AudioAsset]) {
        if !self.active() {
            return;
        }
        for asset in batch {
            let url = asset.url.clone();
            self.loader.spawn(asset.id.clone(), move || assets::fetch_bytes(&url));
        }
    }

    /// Decodes every fetch that completed since the last call.
    pub fn poll_loads(&mut self) -> usize {
        if !self.active() {
            return 0;
        }
        let results = self.loader.drain();
        self.decode_all(results)
    }

    pub fn pending_loads(&self) -> usize {
        self.loader.pending()
    }

    /// Registers a streamed music track. Nothing is decoded until it plays.
    pub fn load_music(&mut self, id: &str, url: &str, volume: f32, looping: bool) {
        if !self.active() {
            return;
        }
        let volume = clamp_volume(volume, 0.7);
        let gain = self.music_gain(volume);
        let Some(backend) = self.backend.as_mut() else {
            return;
        };

        match backend.open_track(url, looping) {
            Ok(handle) => {
                backend.set_track_gain(handle, gain);
                if let Some(previous) = self.music.insert(id.to_string(), MusicTrack { handle, volume }) {
                    backend.pause_track(previous.handle);
                    if self.current_music.as_deref() == Some(id) {
                        self.current_music = None;
                    }
                }
            }
            Err(err) => error!(target: "audio", "Failed to open music '{}' from {}: {}", id, url, err),
        }
    }

    //--- Sound Effects ----------------------------------------------------

    /// Starts a new voice of `id`. Returns `None` when muted, unknown, or
    /// without output.
    pub fn play_sound(&mut self, id: &str, volume: f32, looping: bool, playback_rate: f32) -> Option<VoiceHandle> {
        if !self.active() {
            return None;
        }
        if self.prefs.muted {
            debug!(target: "audio", "Muted, not playing '{}'", id);
            return None;
        }
        let Some(buffer) = self.sounds.get(id) else {
            warn!(target: "audio", "Sound '{}' not found", id);
            return None;
        };

        let params = VoiceParams {
            gain: clamp_volume(volume, 1.0) * self.prefs.master_volume * self.prefs.sfx_volume,
            looping,
            playback_rate: if playback_rate.is_finite() && playback_rate > 0.0 {
                playback_rate
            } else {
                1.0
            },
        };

        let backend = self.backend.as_mut()?;
        match backend.start_voice(buffer, params) {
            Ok(voice) => {
                self.voices.entry(id.to_string()).or_default().push(voice);
                Some(voice)
            }
            Err(err) => {
                warn!(target: "audio", "Failed to play sound '{}': {}", id, err);
                None
            }
        }
    }

    /// Stops and forgets every voice of `id`.
    pub fn stop_sound(&mut self, id: &str) {
        let Some(voices) = self.voices.remove(id) else {
            return;
        };
        if let Some(backend) = self.backend.as_mut() {
            for voice in voices {
                backend.stop_voice(voice);
            }
        }
    }

    /// Drops voices that finished on their own. Call once per frame.
    pub fn update(&mut self) {
        let Some(backend) = self.backend.as_ref() else {
            return;
        };
        self.voices.retain(|_, voices| {
            voices.retain(|voice| !backend.is_voice_finished(*voice));
            !voices.is_empty()
        });
    }

    pub fn active_voices(&self, id: &str) -> usize {
        self.voices.get(id).map(Vec::len).unwrap_or(0)
    }

    pub fn active_voice_count(&self) -> usize {
        self.voices.values().map(Vec::len).sum()
    }

    //--- Music ------------------------------------------------------------

    /// Plays `id` from the start, stopping any other track. Playing the
    /// current track again is a no-op.
    pub fn play_music(&mut self, id: &str) {
        if !self.active() || self.current_music.as_deref() == Some(id) {
            return;
        }
        self.stop_music();

        let Some(track) = self.music.get(id) else {
            warn!(target: "audio", "Music track '{}' not found", id);
            return;
        };
        let handle = track.handle;
        let gain = self.music_gain(track.volume);
        let Some(backend) = self.backend.as_mut() else {
            return;
        };

        backend.set_track_gain(handle, gain);
        match backend.play_track(handle, true) {
            Ok(()) => {
                debug!(target: "audio", "Playing music '{}'", id);
                self.current_music = Some(id.to_string());
            }
            Err(err) => error!(target: "audio", "Failed to play music track '{}': {}", id, err),
        }
    }

    pub fn stop_music(&mut self) {
        let Some(id) = self.current_music.take() else {
            return;
        };
        if let (Some(track), Some(backend)) = (self.music.get(&id), self.backend.as_mut()) {
            backend.pause_track(track.handle);
        }
    }

    pub fn pause_music(&mut self) {
        if let Some(handle) = self.current_track() {
            if let Some(backend) = self.backend.as_mut() {
                backend.pause_track(handle);
            }
        }
    }

    pub fn resume_music(&mut self) {
        let Some(handle) = self.current_track() else {
            return;
        };
        if let Some(backend) = self.backend.as_mut() {
            if let Err(err) = backend.play_track(handle, false) {
                error!(target: "audio", "Failed to resume music track: {}", err);
            }
        }
    }

    pub fn current_music(&self) -> Option<&str> {
        self.current_music.as_deref()
    }

    //--- Volume -----------------------------------------------------------

    pub fn set_master_volume(&mut self, volume: f32) {
        self.prefs.master_volume = clamp_volume(volume, self.prefs.master_volume);
        self.apply_music_gain();
        self.persist();
    }

    pub fn set_sfx_volume(&mut self, volume: f32) {
        self.prefs.sfx_volume = clamp_volume(volume, self.prefs.sfx_volume);
        self.persist();
    }

    pub fn set_music_volume(&mut self, volume: f32) {
        self.prefs.music_volume = clamp_volume(volume, self.prefs.music_volume);
        self.apply_music_gain();
        self.persist();
    }

    /// Silences music (without stopping it) and blocks new effects.
    pub fn mute(&mut self) {
        self.prefs.muted = true;
        self.apply_music_gain();
        self.persist();
    }

    pub fn unmute(&mut self) {
        self.prefs.muted = false;
        self.apply_music_gain();
        self.persist();
    }

    /// Flips the mute state and returns the new value.
    pub fn toggle_mute(&mut self) -> bool {
        if self.prefs.muted {
            self.unmute();
        } else {
            self.mute();
        }
        self.prefs.muted
    }

    pub fn is_muted(&self) -> bool {
        self.prefs.muted
    }

    pub fn master_volume(&self) -> f32 {
        self.prefs.master_volume
    }

    pub fn sfx_volume(&self) -> f32 {
        self.prefs.sfx_volume
    }

    pub fn music_volume(&self) -> f32 {
        self.prefs.music_volume
    }

    pub fn preferences(&self) -> AudioPreferences {
        self.prefs
    }

    pub fn has_sound(&self, id: &str) -> bool {
        self.sounds.contains_key(id)
    }

    pub fn has_music(&self, id: &str) -> bool {
        self.music.contains_key(id)
    }

    //--- Teardown ---------------------------------------------------------

    /// Stops everything and releases the output. Idempotent.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }

        let ids: Vec<String> = self.voices.keys().cloned().collect();
        for id in ids {
            self.stop_sound(&id);
        }
        self.stop_music();
        self.loader.cancel();
        self.destroyed = true;

        if let Some(backend) = self.backend.as_mut() {
            if !backend.is_closed() {
                backend.close();
            }
        }
        info!(target: "audio", "Audio manager destroyed");
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    //--- Internal Helpers -------------------------------------------------

    fn music_gain(&self, track_volume: f32) -> f32 {
        if self.prefs.muted {
            0.0
        } else {
            track_volume * self.prefs.master_volume * self.prefs.music_volume
        }
    }

    fn apply_music_gain(&mut self) {
        let gains: Vec<(TrackHandle, f32)> = self
            .music
            .values()
            .map(|track| (track.handle, self.music_gain(track.volume)))
            .collect();
        if let Some(backend) = self.backend.as_mut() {
            for (handle, gain) in gains {
                backend.set_track_gain(handle, gain);
            }
        }
    }

    fn current_track(&self) -> Option<TrackHandle> {
        self.current_music
            .as_ref()
            .and_then(|id| self.music.get(id))
            .map(|track| track.handle)
    }

    fn persist(&self) {
        if let Err(err) = self.prefs.save(&*self.store) {
            warn!(target: "audio", "Failed to save audio preferences: {}", err);
        }
    }

    fn decode_all(&mut self, results: Vec<Loaded<Vec<u8>>>) -> usize {
        let mut decoded = 0;
        for Loaded { id, result } in results {
            if self.decode_one(&id, result).is_ok() {
                decoded += 1;
            }
        }
        decoded
    }

    fn decode_one(&mut self, id: &str, fetched: Result<Vec<u8>, AssetError>) -> Result<(), AudioError> {
        let bytes = fetched.map_err(|err| {
            error!(target: "audio", "Failed to load sound '{}': {}", id, err);
            AudioError::from(err)
        })?;
        self.decode_bytes(id, &bytes)
    }

    fn decode_bytes(&mut self, id: &str, bytes: &[u8]) -> Result<(), AudioError> {
        let Some(backend) = self.backend.as_mut() else {
            return Ok(());
        };
        match backend.decode(id, bytes) {
            Ok(buffer) => {
                self.sounds.insert(id.to_string(), buffer);
                Ok(())
            }
            Err(err) => {
                error!(target: "audio", "Failed to decode sound '{}': {}", id, err);
                Err(err)
            }
        }
    }
}

//=== Default Output ======================================================

#[cfg(feature = "rodio-backend")]
fn default_backend() -> Option<Box<dyn AudioBackend>> {
    match super::rodio_backend::RodioBackend::try_default() {
        Ok(backend) => Some(Box::new(backend)),
        Err(err) => {
            warn!(target: "audio", "Could not open audio output: {}", err);
            None
        }
    }
}

#[cfg(not(feature = "rodio-backend"))]
fn default_backend() -> Option<Box<dyn AudioBackend>> {
    None
}

//=========================================================================
// Tests
//=========================================================================
