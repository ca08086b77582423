//! Playback primitives for both narration backends.
//!
//! [`player::AudioEngine`] wraps a `rodio` output stream and plays local wav
//! files with true pause/resume; the engine is injectable, so tests can use
//! a simulated backend instead of a real device. [`external::ExternalLauncher`]
//! covers the mp3 path by delegating to the host's default file-association
//! handler, where the only remaining control is killing the process.

pub mod external;
pub mod player;

pub use external::ExternalLauncher;
pub use player::{AudioEngine, AudioPlayerError, ManagedSink, RodioEngine};
