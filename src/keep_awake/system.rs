//! Host capabilities for a kiosk running the display: an idle inhibitor held
//! by a child process, and a silent stream piped into `aplay`.

use super::wav::{silent_wav, streaming_header, WavFormat, HEADER_LEN};
use super::{SilentAudio, WakeLock};
use crate::errors::PlatformError;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, Command};
use tracing::debug;

/// How long a freshly spawned helper must survive to count as started.
const STARTUP_GRACE: Duration = Duration::from_millis(250);

async fn confirm_started(child: &mut Child, what: &str) -> Result<(), PlatformError> {
    tokio::time::sleep(STARTUP_GRACE).await;
    match child.try_wait()? {
        None => Ok(()),
        Some(status) => Err(exited(what, status)),
    }
}

fn exited(what: &str, status: ExitStatus) -> PlatformError {
    PlatformError::Failed(format!("{what} exited early with {status}"))
}

fn alive(child: &mut Option<Child>) -> bool {
    child
        .as_mut()
        .is_some_and(|child| matches!(child.try_wait(), Ok(None)))
}

const INHIBIT_ARGS: [&str; 6] = [
    "--what=idle",
    "--who=cycle-countdown",
    "--why=countdown display",
    "--mode=block",
    "sleep",
    "infinity",
];

const PLAYER_ARGS: [&str; 4] = ["-q", "-t", "wav", "-"];

/// Any long-running helper whose lifetime is the inhibition. By default
/// `systemd-inhibit --what=idle` wrapped around a sleep that never ends.
#[derive(Debug)]
pub struct InhibitLock {
    program: String,
    args: Vec<String>,
    child: Option<Child>,
}

impl Default for InhibitLock {
    fn default() -> Self {
        Self::new("systemd-inhibit", INHIBIT_ARGS)
    }
}

impl InhibitLock {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            child: None,
        }
    }
}

impl WakeLock for InhibitLock {
    async fn request(&mut self) -> Result<(), PlatformError> {
        if alive(&mut self.child) {
            return Ok(());
        }
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;
        confirm_started(&mut child, &self.program).await?;
        debug!(pid = child.id(), "idle inhibitor running");
        self.child = Some(child);
        Ok(())
    }

    fn release(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.start_kill();
        }
    }

    fn is_held(&mut self) -> bool {
        alive(&mut self.child)
    }
}

/// Endless silence streamed into an audio player's stdin. The player must
/// read a WAV stream from stdin; `aplay` by default.
#[derive(Debug)]
pub struct AplayLoop {
    program: String,
    args: Vec<String>,
    format: WavFormat,
    child: Option<Child>,
}

impl Default for AplayLoop {
    fn default() -> Self {
        Self::new("aplay", PLAYER_ARGS)
    }
}

impl AplayLoop {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            format: WavFormat::default(),
            child: None,
        }
    }
}

impl SilentAudio for AplayLoop {
    async fn start(&mut self) -> Result<(), PlatformError> {
        if alive(&mut self.child) {
            return Ok(());
        }
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| PlatformError::Failed("player stdin unavailable".into()))?;

        let header = streaming_header(&self.format);
        let second = silent_wav(&self.format, Duration::from_secs(1));
        tokio::spawn(async move {
            if stdin.write_all(&header).await.is_err() {
                return;
            }
            // The player drains at playback speed, so writes pace themselves.
            while stdin.write_all(&second[HEADER_LEN..]).await.is_ok() {}
            debug!("silent audio stream closed");
        });

        confirm_started(&mut child, &self.program).await?;
        self.child = Some(child);
        Ok(())
    }

    fn is_playing(&mut self) -> bool {
        alive(&mut self.child)
    }
}
