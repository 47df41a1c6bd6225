//=========================================================================
// Rodio Backend
//=========================================================================
//
// `AudioBackend` over the default output device.
//
// Each voice gets its own `Sink` so overlapping plays of one sound mix
// independently. Music tracks hold at most one sink; rewinding rebuilds
// it from a fresh decoder over the fetched bytes.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;
use std::io::Cursor;

use log::{debug, info};
use rodio::buffer::SamplesBuffer;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};

//=== Internal Dependencies ===============================================

use super::backend::{AudioBackend, AudioError, SoundBuffer, TrackHandle, VoiceHandle, VoiceParams};
use crate::core::assets;

//=========================================================================

struct Track {
    url: String,
    looping: bool,
    gain: f32,
    bytes: Option<Vec<u8>>,
    sink: Option<Sink>,
}

pub struct RodioBackend {
    output: Option<(OutputStream, OutputStreamHandle)>,
    voices: HashMap<u64, Sink>,
    tracks: HashMap<u64, Track>,
    next_id: u64,
}

impl RodioBackend {
    pub fn try_default() -> Result<Self, AudioError> {
        let output = OutputStream::try_default().map_err(|err| AudioError::Unavailable(err.to_string()))?;
        info!(target: "audio", "Opened default audio output");
        Ok(Self {
            output: Some(output),
            voices: HashMap::new(),
            tracks: HashMap::new(),
            next_id: 0,
        })
    }

    fn handle(&self) -> Result<&OutputStreamHandle, AudioError> {
        self.output
            .as_ref()
            .map(|(_, handle)| handle)
            .ok_or_else(|| AudioError::Unavailable("output closed".into()))
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn new_sink(&self) -> Result<Sink, AudioError> {
        Sink::try_new(self.handle()?).map_err(|err| AudioError::Playback(err.to_string()))
    }
}

impl AudioBackend for RodioBackend {
    fn decode(&mut self, id: &str, bytes: &[u8]) -> Result<SoundBuffer, AudioError> {
        let decoder = Decoder::new(Cursor::new(bytes.to_vec())).map_err(|err| AudioError::Decode {
            id: id.to_string(),
            reason: err.to_string(),
        })?;
        let channels = decoder.channels();
        let sample_rate = decoder.sample_rate();
        let samples: Vec<f32> = decoder.convert_samples().collect();
        debug!(target: "audio", "Decoded '{}': {} samples @ {} Hz", id, samples.len(), sample_rate);
        Ok(SoundBuffer::new(channels, sample_rate, samples))
    }

    fn start_voice(&mut self, buffer: &SoundBuffer, params: VoiceParams) -> Result<VoiceHandle, AudioError> {
        let sink = self.new_sink()?;
        sink.set_volume(params.gain);
        sink.set_speed(params.playback_rate);

        let source = SamplesBuffer::new(buffer.channels, buffer.sample_rate, buffer.samples.to_vec());
        if params.looping {
            sink.append(source.repeat_infinite());
        } else {
            sink.append(source);
        }

        let id = self.next_id();
        self.voices.insert(id, sink);
        Ok(VoiceHandle(id))
    }

    fn stop_voice(&mut self, voice: VoiceHandle) {
        if let Some(sink) = self.voices.remove(&voice.0) {
            sink.stop();
        }
    }

    fn is_voice_finished(&self, voice: VoiceHandle) -> bool {
        self.voices.get(&voice.0).map(Sink::empty).unwrap_or(true)
    }

    fn open_track(&mut self, url: &str, looping: bool) -> Result<TrackHandle, AudioError> {
        let id = self.next_id();
        self.tracks.insert(
            id,
            Track {
                url: url.to_string(),
                looping,
                gain: 1.0,
                bytes: None,
                sink: None,
            },
        );
        Ok(TrackHandle(id))
    }

    fn play_track(&mut self, track: TrackHandle, from_start: bool) -> Result<(), AudioError> {
        let unknown = || AudioError::Playback("unknown track".into());
        if let (false, Some(existing)) = (from_start, self.tracks.get(&track.0).and_then(|t| t.sink.as_ref())) {
            existing.play();
            return Ok(());
        }

        let sink = self.new_sink()?;
        let entry = self.tracks.get_mut(&track.0).ok_or_else(unknown)?;

        if entry.bytes.is_none() {
            entry.bytes = Some(assets::fetch_bytes(&entry.url)?);
        }
        let bytes = entry.bytes.clone().unwrap_or_default();
        let reason = |err: rodio::decoder::DecoderError| AudioError::Decode {
            id: entry.url.clone(),
            reason: err.to_string(),
        };

        if entry.looping {
            sink.append(Decoder::new_looped(Cursor::new(bytes)).map_err(reason)?);
        } else {
            sink.append(Decoder::new(Cursor::new(bytes)).map_err(reason)?);
        }
        sink.set_volume(entry.gain);

        if let Some(previous) = entry.sink.replace(sink) {
            previous.stop();
        }
        Ok(())
    }

    fn pause_track(&mut self, track: TrackHandle) {
        if let Some(sink) = self.tracks.get(&track.0).and_then(|t| t.sink.as_ref()) {
            sink.pause();
        }
    }

    fn set_track_gain(&mut self, track: TrackHandle, gain: f32) {
        if let Some(entry) = self.tracks.get_mut(&track.0) {
            entry.gain = gain;
            if let Some(sink) = &entry.sink {
                sink.set_volume(gain);
            }
        }
    }

    fn close(&mut self) {
        for (_, sink) in self.voices.drain() {
            sink.stop();
        }
        for track in self.tracks.values_mut() {
            if let Some(sink) = track.sink.take() {
                sink.stop();
            }
        }
        self.output = None;
    }

    fn is_closed(&self) -> bool {
        self.output.is_none()
    }
}
