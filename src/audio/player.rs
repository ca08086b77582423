use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use rodio::{Decoder, OutputStream, Sink};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, Serialize)]
pub enum AudioPlayerError {
    #[error("no se pudo abrir el archivo de audio {0}: {1}")]
    Io(PathBuf, String),
    #[error("el archivo de audio está corrupto: {0}")]
    Decode(String),
    #[error("no se encontró dispositivo de reproducción")]
    Device,
    #[error("no se pudo lanzar el reproductor externo: {0}")]
    Launch(String),
}

/// A started playback that can be driven from the thread that created it.
///
/// Not `Send`: the rodio output stream must stay on the thread that opened
/// the device, so the playback loop owns its sink for its whole life.
pub trait ManagedSink {
    fn pause(&self);
    fn resume(&self);
    fn stop(&self);
    fn is_finished(&self) -> bool;
}

/// Opens audio files for playback. Injectable so tests can run without a
/// real output device.
pub trait AudioEngine: Send + Sync {
    fn start(&self, path: &Path) -> Result<Box<dyn ManagedSink>, AudioPlayerError>;
}

pub struct RodioEngine;

struct RodioSink {
    // keeps the device stream alive as long as the sink plays
    _stream: OutputStream,
    sink: Sink,
}

impl AudioEngine for RodioEngine {
    fn start(&self, path: &Path) -> Result<Box<dyn ManagedSink>, AudioPlayerError> {
        let file = File::open(path)
            .map_err(|err| AudioPlayerError::Io(path.to_path_buf(), err.to_string()))?;
        let reader = BufReader::new(file);
        let decoder =
            Decoder::new(reader).map_err(|err| AudioPlayerError::Decode(err.to_string()))?;

        let (stream, handle) = OutputStream::try_default().map_err(|_| AudioPlayerError::Device)?;
        let sink = Sink::try_new(&handle)
            .map_err(|err| AudioPlayerError::Io(path.to_path_buf(), err.to_string()))?;
        sink.append(decoder);
        sink.play();

        Ok(Box::new(RodioSink {
            _stream: stream,
            sink,
        }))
    }
}

impl ManagedSink for RodioSink {
    fn pause(&self) {
        self.sink.pause();
    }

    fn resume(&self) {
        self.sink.play();
    }

    fn stop(&self) {
        self.sink.stop();
    }

    fn is_finished(&self) -> bool {
        self.sink.empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn returns_error_for_missing_file() {
        let result = RodioEngine.start(Path::new("/no/existe.wav"));
        assert!(matches!(result, Err(AudioPlayerError::Io(_, _))));
    }

    #[test]
    fn fails_for_invalid_wav() {
        let mut tmp = NamedTempFile::new().unwrap();
        writeln!(tmp, "not a wav").unwrap();
        let result = RodioEngine.start(tmp.path());
        assert!(matches!(result, Err(AudioPlayerError::Decode(_))));
    }
}
