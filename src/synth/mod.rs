//! Speech-synthesis provider boundary.
//!
//! The controller talks to a [`SpeechSynthesizer`], so tests can substitute
//! a mock provider and assert on the request it receives. The default
//! implementation shells out to an external TTS engine, see
//! [`command::CommandSynthesizer`].

pub mod command;

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

pub use command::CommandSynthesizer;

pub const ERROR_ENGINE_UNAVAILABLE: &str = "ENGINE_UNAVAILABLE";
pub const ERROR_PROCESS_FAILED: &str = "PROCESS_FAILED";
pub const ERROR_IO: &str = "IO_ERROR";
pub const ERROR_INTERNAL: &str = "INTERNAL_ERROR";

#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("no speech engine available: {0}")]
    EngineUnavailable(String),
    #[error("failed to spawn speech engine: {0}")]
    SpawnFailure(#[from] std::io::Error),
    #[error("speech engine exited with status {status}: {stderr}")]
    EngineFailure { status: i32, stderr: String },
    #[error("{0}")]
    Other(String),
}

impl SynthesisError {
    /// Stable code for the error, usable across process boundaries.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EngineUnavailable(_) => ERROR_ENGINE_UNAVAILABLE,
            Self::SpawnFailure(_) => ERROR_IO,
            Self::EngineFailure { .. } => ERROR_PROCESS_FAILED,
            Self::Other(_) => ERROR_INTERNAL,
        }
    }
}

/// One synthesis call: the narration payload plus delivery parameters.
///
/// `speed` is carried as metadata for engines that honour a rate knob;
/// whether it affects the produced audio is provider-dependent.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SynthesisRequest {
    pub text: String,
    pub language: String,
    pub slow: bool,
    pub speed: f32,
    pub output_path: PathBuf,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct SynthesisResponse {
    pub output_path: PathBuf,
    pub duration_ms: u128,
    pub stderr: Option<String>,
}

pub trait SpeechSynthesizer: Send + Sync {
    fn synthesize(&self, request: &SynthesisRequest) -> Result<SynthesisResponse, SynthesisError>;
}
