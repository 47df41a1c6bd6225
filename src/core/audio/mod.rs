//=========================================================================
// Audio
//=========================================================================
//
//   backend         device boundary (decode, voices, streamed tracks)
//   preferences     persisted volume/mute settings
//   audio_manager   policy: volumes, mute, current music, voice tracking
//   rodio_backend   default output device (feature `rodio-backend`)
//
//=========================================================================

//=== Module Declarations =================================================

mod audio_manager;
mod backend;
mod preferences;

#[cfg(feature = "rodio-backend")]
mod rodio_backend;

//=== Public API ==========================================================

pub use audio_manager::{AudioAsset, AudioManager};
pub use backend::{AudioBackend, AudioError, SoundBuffer, TrackHandle, VoiceHandle, VoiceParams};
pub use preferences::{AudioPreferences, PREFERENCES_KEY};

#[cfg(feature = "rodio-backend")]
pub use rodio_backend::RodioBackend;

#[cfg(test)]
pub(crate) use backend::testing;
