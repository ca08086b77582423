use std::path::Path;
use std::process::{Child, Command};

use log::info;
use shlex::Shlex;

use super::player::AudioPlayerError;

/// Hands an audio file to the host's default file-association handler.
///
/// Once launched, the external player is out of our hands: the only control
/// left is killing the launched process, which is how the destructive mp3
/// "pause" is implemented. The handler command can be overridden with
/// `NARRATOR_OPEN_COMMAND` (parsed shell-style, the file path is appended).
pub struct ExternalLauncher;

impl ExternalLauncher {
    fn command_for(path: &Path) -> Result<Command, AudioPlayerError> {
        if let Some(raw_command) = std::env::var_os("NARRATOR_OPEN_COMMAND") {
            let raw_command = raw_command.to_string_lossy().into_owned();
            let mut parts: Vec<String> = Shlex::new(&raw_command).collect();
            if parts.is_empty() {
                return Err(AudioPlayerError::Launch(
                    "NARRATOR_OPEN_COMMAND is empty".to_string(),
                ));
            }
            let program = parts.remove(0);
            let mut command = Command::new(program);
            for part in parts {
                command.arg(part);
            }
            command.arg(path);
            return Ok(command);
        }

        let mut command = if cfg!(target_os = "windows") {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", "start", ""]);
            cmd
        } else if cfg!(target_os = "macos") {
            Command::new("open")
        } else {
            Command::new("xdg-open")
        };
        command.arg(path);
        Ok(command)
    }

    pub fn launch(&self, path: &Path) -> Result<Child, AudioPlayerError> {
        info!("delegating {} to the default handler", path.display());
        Self::command_for(path)?
            .spawn()
            .map_err(|err| AudioPlayerError::Launch(err.to_string()))
    }
}
