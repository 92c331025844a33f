use std::{
    env, fs, io,
    path::PathBuf,
    process::{Child, Command, Stdio},
    thread,
    time::{Duration, Instant},
};
use tracing::{debug, warn};
use uuid::Uuid;

use super::{AudioClip, DictationError};

const OUTPUT_PLACEHOLDER: &str = "{output}";
const STOP_GRACE: Duration = Duration::from_secs(2);
const STOP_POLL: Duration = Duration::from_millis(50);

/// An external recorder process writing one clip to a temp file.
pub(crate) struct Recorder {
    child: Option<Child>,
    output: PathBuf,
    mime: String,
}

impl Recorder {
    pub(crate) fn start(template: &str) -> Result<Self, DictationError> {
        let output = env::temp_dir().join(format!("quill-recording-{}.wav", Uuid::new_v4()));
        let (program, args) = build_command(template, &output.to_string_lossy())
            .ok_or_else(|| {
                DictationError::Recorder(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "recorder command is empty",
                ))
            })?;

        let child = Command::new(&program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(DictationError::Recorder)?;
        debug!(%program, pid = child.id(), "recorder started");

        Ok(Self {
            child: Some(child),
            output,
            mime: "audio/wav".to_string(),
        })
    }

    /// Stops the recorder and returns what it captured.
    pub(crate) fn stop(mut self) -> Result<AudioClip, DictationError> {
        if let Some(mut child) = self.child.take() {
            if terminate(&mut child).map_err(DictationError::Recorder)? == Stopped::Killed {
                warn!("recorder was killed; the clip may be truncated");
            }
        }
        let bytes = match fs::read(&self.output) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(err) => return Err(err.into()),
        };
        if bytes.is_empty() {
            return Err(DictationError::EmptyClip);
        }
        Ok(AudioClip {
            bytes,
            mime: self.mime.clone(),
        })
    }
}

impl Drop for Recorder {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Err(err) = terminate(&mut child) {
                warn!(%err, "could not stop recorder");
            }
        }
        if let Err(err) = fs::remove_file(&self.output) {
            if err.kind() != io::ErrorKind::NotFound {
                warn!(path = %self.output.display(), %err, "could not remove recording");
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stopped {
    Interrupted,
    Killed,
}

/// Asks the recorder to finish its file, then kills it if it lingers.
fn terminate(child: &mut Child) -> io::Result<Stopped> {
    #[cfg(unix)]
    match interrupt(child) {
        Ok(()) => {
            if wait_for_exit(child, STOP_GRACE)? {
                debug!(pid = child.id(), "recorder stopped");
                return Ok(Stopped::Interrupted);
            }
            warn!(pid = child.id(), "recorder ignored SIGINT");
        }
        Err(err) => warn!(pid = child.id(), %err, "could not interrupt recorder"),
    }
    child.kill()?;
    child.wait()?;
    Ok(Stopped::Killed)
}

#[cfg(unix)]
fn interrupt(child: &Child) -> io::Result<()> {
    let pid = libc::pid_t::try_from(child.id())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "pid out of range"))?;
    match unsafe { libc::kill(pid, libc::SIGINT) } {
        -1 => Err(io::Error::last_os_error()),
        _ => Ok(()),
    }
}

#[cfg(unix)]
fn wait_for_exit(child: &mut Child, grace: Duration) -> io::Result<bool> {
    let deadline = Instant::now() + grace;
    while Instant::now() < deadline {
        if child.try_wait()?.is_some() {
            return Ok(true);
        }
        thread::sleep(STOP_POLL);
    }
    Ok(false)
}

fn build_command(template: &str, output: &str) -> Option<(String, Vec<String>)> {
    let mut parts = template
        .split_whitespace()
        .map(|part| part.replace(OUTPUT_PLACEHOLDER, output));
    let program = parts.next()?;
    Some((program, parts.collect()))
}
