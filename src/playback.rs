//! Background playback modelled as a cancellable task.
//!
//! Each narration spawns one [`PlaybackSession`]: a thread that drives the
//! audio backend and reacts to the shared pause/stop intents, plus a typed
//! transport state the caller can observe and a bounded wait primitive.
//! The caller's only synchronization with the thread is cooperative polling
//! at [`POLL_INTERVAL`].
//!
//! The two backends do not pause symmetrically. The mixer backend (wav)
//! genuinely pauses and resumes its sink. The external backend (mp3) has no
//! transport protocol at all once the host handler owns the file, so a pause
//! intent is honoured the only way left: the launched process is killed and
//! the session ends in `Stopped`, not resumable.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{error, info};
use parking_lot::Mutex;
use serde::Serialize;

use crate::audio::{AudioEngine, ExternalLauncher};

pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    Idle,
    Playing,
    Paused,
    Stopped,
    Failed,
}

impl PlaybackState {
    pub fn is_active(self) -> bool {
        matches!(self, Self::Playing | Self::Paused)
    }
}

pub struct PlaybackSession {
    state: Arc<Mutex<PlaybackState>>,
    thread: Option<JoinHandle<()>>,
}

impl PlaybackSession {
    /// Plays `path` through the mixer backend with true pause/resume.
    pub fn mixer(
        engine: Arc<dyn AudioEngine>,
        path: &Path,
        paused: Arc<AtomicBool>,
        stop: Arc<AtomicBool>,
    ) -> Self {
        let state = Arc::new(Mutex::new(PlaybackState::Idle));
        let thread_state = Arc::clone(&state);
        let path = path.to_path_buf();
        let thread = thread::spawn(move || {
            run_mixer(engine, &path, &thread_state, &paused, &stop);
        });
        Self {
            state,
            thread: Some(thread),
        }
    }

    /// Hands `path` to the host's default handler. Kill-only control.
    pub fn external(
        launcher: Arc<ExternalLauncher>,
        path: &Path,
        paused: Arc<AtomicBool>,
        stop: Arc<AtomicBool>,
    ) -> Self {
        let state = Arc::new(Mutex::new(PlaybackState::Idle));
        let thread_state = Arc::clone(&state);
        let path = path.to_path_buf();
        let thread = thread::spawn(move || {
            run_external(launcher, &path, &thread_state, &paused, &stop);
        });
        Self {
            state,
            thread: Some(thread),
        }
    }

    pub fn state(&self) -> PlaybackState {
        *self.state.lock()
    }

    /// Blocks until the session leaves its active states, polling at
    /// [`POLL_INTERVAL`]. With a timeout, returns the current state once the
    /// deadline passes, leaving the session running.
    pub fn wait(&mut self, timeout: Option<Duration>) -> PlaybackState {
        let deadline = timeout.map(|t| Instant::now() + t);
        loop {
            let finished = self.thread.as_ref().map_or(true, |t| t.is_finished());
            if finished {
                if let Some(handle) = self.thread.take() {
                    let _ = handle.join();
                }
                return self.state();
            }
            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    return self.state();
                }
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

fn set_state(state: &Mutex<PlaybackState>, next: PlaybackState) {
    *state.lock() = next;
}

fn run_mixer(
    engine: Arc<dyn AudioEngine>,
    path: &Path,
    state: &Mutex<PlaybackState>,
    paused: &AtomicBool,
    stop: &AtomicBool,
) {
    let sink = match engine.start(path) {
        Ok(sink) => sink,
        Err(err) => {
            error!("failed to start playback of {}: {err}", path.display());
            set_state(state, PlaybackState::Failed);
            return;
        }
    };

    set_state(state, PlaybackState::Playing);
    let mut was_paused = false;
    loop {
        if stop.load(Ordering::SeqCst) {
            sink.stop();
            set_state(state, PlaybackState::Stopped);
            info!("playback of {} stopped", path.display());
            return;
        }
        if sink.is_finished() {
            set_state(state, PlaybackState::Idle);
            info!("playback of {} finished", path.display());
            return;
        }
        if paused.load(Ordering::SeqCst) {
            if !was_paused {
                sink.pause();
                set_state(state, PlaybackState::Paused);
                was_paused = true;
            }
        } else if was_paused {
            sink.resume();
            set_state(state, PlaybackState::Playing);
            was_paused = false;
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn run_external(
    launcher: Arc<ExternalLauncher>,
    path: &Path,
    state: &Mutex<PlaybackState>,
    paused: &AtomicBool,
    stop: &AtomicBool,
) {
    let mut child = match launcher.launch(path) {
        Ok(child) => child,
        Err(err) => {
            error!("failed to hand {} to the default handler: {err}", path.display());
            set_state(state, PlaybackState::Failed);
            return;
        }
    };

    set_state(state, PlaybackState::Playing);
    loop {
        if stop.load(Ordering::SeqCst) || paused.load(Ordering::SeqCst) {
            // the external handler has no pause protocol, kill is all we have
            let _ = child.kill();
            let _ = child.wait();
            set_state(state, PlaybackState::Stopped);
            info!("external player for {} terminated", path.display());
            return;
        }
        match child.try_wait() {
            Ok(Some(_)) => {
                set_state(state, PlaybackState::Idle);
                return;
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(err) => {
                error!("lost track of the external player: {err}");
                set_state(state, PlaybackState::Failed);
                return;
            }
        }
    }
}
