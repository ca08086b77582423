use std::io::Write;
use std::process::{Command, Stdio};
use std::time::Instant;

use log::{error, info, warn};
use shlex::Shlex;

use super::{SpeechSynthesizer, SynthesisError, SynthesisRequest, SynthesisResponse};

/// Default provider: pipes the narration text into an external TTS engine.
///
/// The engine command is resolved from the `NARRATOR_TTS_COMMAND` environment
/// variable when set, otherwise a `piper` executable on the PATH, otherwise
/// `python -m piper`. The request text goes to the engine's stdin; language,
/// pace and the output file travel as arguments.
pub struct CommandSynthesizer;

impl CommandSynthesizer {
    fn build_command(request: &SynthesisRequest) -> Result<Command, SynthesisError> {
        if let Some(parent) = request
            .output_path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
        {
            std::fs::create_dir_all(parent).map_err(|err| {
                SynthesisError::Other(format!(
                    "unable to create output directory {}: {err}",
                    parent.display()
                ))
            })?;
        }

        if let Some(raw_command) = std::env::var_os("NARRATOR_TTS_COMMAND") {
            let raw_command = raw_command.to_string_lossy().into_owned();
            let mut parts: Vec<String> = Shlex::new(&raw_command).collect();
            if parts.is_empty() {
                return Err(SynthesisError::EngineUnavailable(
                    "NARRATOR_TTS_COMMAND is empty".to_string(),
                ));
            }
            let program = parts.remove(0);
            let mut command = Command::new(program);
            for part in parts {
                command.arg(part);
            }
            Ok(command)
        } else if let Ok(piper) = which::which("piper") {
            Ok(Command::new(piper))
        } else if which::which("python").is_ok() {
            let mut command = Command::new("python");
            command.args(["-m", "piper"]);
            Ok(command)
        } else {
            Err(SynthesisError::EngineUnavailable(
                "neither piper nor python is on the PATH".to_string(),
            ))
        }
    }

    fn command_arguments(command: &mut Command, request: &SynthesisRequest) {
        command.arg("--output_file");
        command.arg(&request.output_path);
        command.arg("--language");
        command.arg(&request.language);
        if request.slow {
            command.arg("--slow");
        }
        // length_scale is the engine's inverse-rate knob
        if request.speed > 0.0 {
            command.arg("--length_scale");
            command.arg((1.0 / request.speed).to_string());
        }
    }
}

impl SpeechSynthesizer for CommandSynthesizer {
    fn synthesize(&self, request: &SynthesisRequest) -> Result<SynthesisResponse, SynthesisError> {
        info!(
            "synthesizing {} chars of {} speech into {}",
            request.text.len(),
            request.language,
            request.output_path.display()
        );

        let start = Instant::now();
        let mut command = Self::build_command(request)?;
        Self::command_arguments(&mut command, request);
        let mut child = command
            .stdin(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(SynthesisError::SpawnFailure)?;
        {
            let stdin = child
                .stdin
                .as_mut()
                .ok_or_else(|| SynthesisError::Other("failed to access engine stdin".into()))?;
            stdin
                .write_all(request.text.as_bytes())
                .map_err(|err| SynthesisError::Other(err.to_string()))?;
        }
        let output = child
            .wait_with_output()
            .map_err(|err| SynthesisError::Other(err.to_string()))?;
        let duration_ms = start.elapsed().as_millis();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        if !output.status.success() {
            let code = output.status.code().unwrap_or_default();
            error!("speech engine exited with status {code}: {stderr}");
            return Err(SynthesisError::EngineFailure {
                status: code,
                stderr,
            });
        }

        if !request.output_path.exists() {
            warn!(
                "speech engine succeeded but the expected output {} was not created",
                request.output_path.display()
            );
        }

        Ok(SynthesisResponse {
            output_path: request.output_path.clone(),
            duration_ms,
            stderr: if stderr.is_empty() {
                None
            } else {
                Some(stderr)
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::ERROR_PROCESS_FAILED;
    use assert_fs::TempDir;
    use serial_test::serial;
    use std::fs;
    use std::path::PathBuf;

    struct EnvVarGuard {
        key: &'static str,
    }

    impl EnvVarGuard {
        fn set(key: &'static str, value: String) -> Self {
            std::env::set_var(key, value);
            Self { key }
        }
    }

    impl Drop for EnvVarGuard {
        fn drop(&mut self) {
            std::env::remove_var(self.key);
        }
    }

    fn write_mock_engine(temp: &TempDir, body: &str) -> EnvVarGuard {
        let script_path = temp.path().join("mock_tts.sh");
        fs::write(&script_path, body).unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&script_path).unwrap().permissions();
            perms.set_mode(0o755);
            fs::set_permissions(&script_path, perms).unwrap();
        }
        EnvVarGuard::set(
            "NARRATOR_TTS_COMMAND",
            script_path.display().to_string(),
        )
    }

    fn make_request(temp: &TempDir) -> SynthesisRequest {
        SynthesisRequest {
            text: "hola".into(),
            language: "es".into(),
            slow: false,
            speed: 1.0,
            output_path: temp.path().join("output.wav"),
        }
    }

    const ECHO_ENGINE: &str = r#"#!/bin/sh
OUT=""
LANGUAGE=""
while [ "$1" != "" ]; do
  case "$1" in
    --output_file) shift; OUT="$1";;
    --language) shift; LANGUAGE="$1";;
  esac
  shift
done
TEXT=$(cat)
printf '%s|%s' "$LANGUAGE" "$TEXT" > "$OUT"
"#;

    #[test]
    #[serial]
    fn synthesize_pipes_text_and_writes_output() {
        let temp = TempDir::new().unwrap();
        let _guard = write_mock_engine(&temp, ECHO_ENGINE);
        let request = make_request(&temp);
        let response = CommandSynthesizer.synthesize(&request).unwrap();
        assert_eq!(response.output_path, temp.path().join("output.wav"));
        let written = fs::read_to_string(&response.output_path).unwrap();
        assert_eq!(written, "es|hola");
    }

    #[test]
    #[serial]
    fn engine_failure_surfaces_status_and_stderr() {
        let temp = TempDir::new().unwrap();
        let _guard = write_mock_engine(
            &temp,
            "#!/bin/sh\necho 'boom' >&2\nexit 2\n",
        );
        let request = make_request(&temp);
        let error = CommandSynthesizer.synthesize(&request).unwrap_err();
        assert_eq!(error.code(), ERROR_PROCESS_FAILED);
        match error {
            SynthesisError::EngineFailure { status, stderr } => {
                assert_eq!(status, 2);
                assert_eq!(stderr, "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    #[serial]
    fn empty_command_override_is_rejected() {
        let temp = TempDir::new().unwrap();
        let _guard = EnvVarGuard::set("NARRATOR_TTS_COMMAND", "   ".into());
        let request = make_request(&temp);
        let error = CommandSynthesizer.synthesize(&request).unwrap_err();
        assert!(matches!(error, SynthesisError::EngineUnavailable(_)));
    }

    #[test]
    #[serial]
    fn output_directory_is_created() {
        let temp = TempDir::new().unwrap();
        let _guard = write_mock_engine(&temp, ECHO_ENGINE);
        let request = SynthesisRequest {
            output_path: temp.path().join("nested/dir/output.wav"),
            ..make_request(&temp)
        };
        CommandSynthesizer.synthesize(&request).unwrap();
        assert!(PathBuf::from(temp.path().join("nested/dir/output.wav")).exists());
    }
}
