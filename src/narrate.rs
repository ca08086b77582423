//! Turns extracted document text into spoken audio and manages playback.
//!
//! A [`NarrationController`] is configured once (rate multiplier, language),
//! then [`NarrationController::narrate`] runs the whole pipeline: extract,
//! synthesize, persist, play. The call blocks until playback ends while
//! [`NarrationController::pause`], [`NarrationController::resume`] and
//! [`NarrationController::stop`] may be invoked from any other thread.
//!
//! Pause is only symmetric on the wav path. An mp3 narration is delegated to
//! the host's default player, which offers no transport control, so pausing
//! it kills the player and the session is over (see [`crate::playback`]).

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{info, warn};
use serde::Serialize;
use thiserror::Error;

use crate::audio::{AudioEngine, ExternalLauncher, RodioEngine};
use crate::doc::{DocumentReader, PageOutcome, PageSelection};
use crate::playback::{PlaybackSession, PlaybackState};
use crate::synth::{CommandSynthesizer, SpeechSynthesizer, SynthesisError, SynthesisRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Mp3,
    Wav,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
        }
    }
}

#[derive(Debug, Error)]
pub enum NarrateError {
    #[error("no narration language configured")]
    LanguageNotSet,
    #[error("speech synthesis failed: {0}")]
    Synthesis(#[from] SynthesisError),
}

/// What a narration call did, page by page and through playback.
#[derive(Debug, Serialize)]
pub struct NarrationReport {
    pub audio_path: PathBuf,
    pub pages_requested: usize,
    pub outcomes: Vec<PageOutcome>,
    pub playback: PlaybackState,
}

pub struct NarrationController {
    speed: f32,
    language: Option<String>,
    paused: Arc<AtomicBool>,
    stop_requested: Arc<AtomicBool>,
    synthesizer: Box<dyn SpeechSynthesizer>,
    engine: Arc<dyn AudioEngine>,
    launcher: Arc<ExternalLauncher>,
}

impl Default for NarrationController {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl NarrationController {
    pub fn new(speed: f32) -> Self {
        Self::with_parts(
            speed,
            Box::new(CommandSynthesizer),
            Arc::new(RodioEngine),
            Arc::new(ExternalLauncher),
        )
    }

    fn with_parts(
        speed: f32,
        synthesizer: Box<dyn SpeechSynthesizer>,
        engine: Arc<dyn AudioEngine>,
        launcher: Arc<ExternalLauncher>,
    ) -> Self {
        Self {
            speed,
            language: None,
            paused: Arc::new(AtomicBool::new(false)),
            stop_requested: Arc::new(AtomicBool::new(false)),
            synthesizer,
            engine,
            launcher,
        }
    }

    /// Sets the language for speech synthesis. There is no default: a
    /// narration attempted before this call fails with
    /// [`NarrateError::LanguageNotSet`].
    pub fn set_language(&mut self, language: impl Into<String>) {
        self.language = Some(language.into());
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Narrates the entire document at `path`.
    pub fn narrate(
        &self,
        path: impl AsRef<Path>,
        output_format: OutputFormat,
    ) -> Result<NarrationReport, NarrateError> {
        self.narrate_pages(path, PageSelection::All, output_format)
    }

    /// Narrates the selected pages of the document at `path`.
    ///
    /// Extraction failures degrade to empty segments and are recorded in the
    /// report; only a missing language or a synthesis failure abort the call.
    /// Blocks until playback ends, polling the session cooperatively.
    pub fn narrate_pages(
        &self,
        path: impl AsRef<Path>,
        selection: PageSelection,
        output_format: OutputFormat,
    ) -> Result<NarrationReport, NarrateError> {
        let path = path.as_ref();
        let language = self
            .language
            .clone()
            .ok_or(NarrateError::LanguageNotSet)?;

        let mut reader = DocumentReader::open(path);
        if let Some(err) = reader.open_error() {
            warn!(
                "narrating {} without readable content: {err}",
                path.display()
            );
        }
        let indices = selection.resolve(&reader);
        info!(
            "extracting {} pages from {}",
            indices.len(),
            path.display()
        );
        let extraction = reader.read_pages(&indices, |progress| {
            info!(
                "processing page {} of {} ({:.2}%)",
                progress.processed, progress.total, progress.percent
            );
        });
        reader.close();

        let output_path = path.with_extension(output_format.extension());
        let request = SynthesisRequest {
            text: extraction.text,
            language,
            slow: false,
            speed: self.speed,
            output_path: output_path.clone(),
        };
        self.synthesizer.synthesize(&request)?;

        self.paused.store(false, Ordering::SeqCst);
        self.stop_requested.store(false, Ordering::SeqCst);

        let mut session = match output_format {
            OutputFormat::Wav => PlaybackSession::mixer(
                Arc::clone(&self.engine),
                &output_path,
                Arc::clone(&self.paused),
                Arc::clone(&self.stop_requested),
            ),
            OutputFormat::Mp3 => PlaybackSession::external(
                Arc::clone(&self.launcher),
                &output_path,
                Arc::clone(&self.paused),
                Arc::clone(&self.stop_requested),
            ),
        };
        let playback = session.wait(None);
        info!(
            "narration of {} ended with playback {playback:?}",
            path.display()
        );

        Ok(NarrationReport {
            audio_path: output_path,
            pages_requested: indices.len(),
            outcomes: extraction.outcomes,
            playback,
        })
    }

    /// Signals the playback loop to pause. Non-blocking; destructive for
    /// mp3 narrations, which cannot be resumed.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    /// Clears the pause intent so the playback loop resumes the sink.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    /// Requests cancellation of the active narration.
    pub fn stop(&self) {
        self.stop_requested.store(true, Ordering::SeqCst);
    }
}
