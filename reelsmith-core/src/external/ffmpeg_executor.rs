// ============================================================================
// reelsmith-core/src/external/ffmpeg_executor.rs
// ============================================================================
//
// FFMPEG EXECUTOR: Encoder process management and abstraction
//
// KEY COMPONENTS:
// - EncoderCommand: a fully assembled program + argument vector
// - FfmpegProcess: trait representing a running encoder
// - FfmpegSpawner: trait for creating encoder processes
// - SidecarSpawner: concrete implementation on top of ffmpeg-sidecar
//
// The supervisor only needs three things from a process: its diagnostic
// stream, a way to wait for it, and a way to kill it when it hangs.

use crate::error::{CoreResult, command_start_error, command_wait_error};
use ffmpeg_sidecar::child::FfmpegChild as SidecarChild;
use ffmpeg_sidecar::command::FfmpegCommand;
use std::fmt;
use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};

/// A complete invocation of an external binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl EncoderCommand {
    #[must_use]
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Builds a `std::process::Command` with stderr piped for supervision.
    #[must_use]
    pub fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        command
    }

    /// Short name used in error messages, e.g. `ffmpeg`.
    #[must_use]
    pub fn program_name(&self) -> String {
        self.program
            .file_name()
            .map_or_else(|| self.program.display().to_string(), |n| n.to_string_lossy().into_owned())
    }
}

impl fmt::Display for EncoderCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " \"{}\"", arg.replace('"', "\\\""))?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

// --- FFmpeg Execution Abstraction ---

/// Trait representing an active encoder process instance.
pub trait FfmpegProcess {
    /// Takes ownership of the diagnostic (stderr) stream. Returns `None` once taken.
    fn take_diagnostics(&mut self) -> Option<Box<dyn Read + Send>>;

    /// Waits for the process to exit and returns its status.
    fn wait(&mut self) -> CoreResult<ExitStatus>;

    /// Kills the process. Used when the diagnostic stream stops producing output.
    fn kill(&mut self) -> CoreResult<()>;
}

/// Trait representing something that can spawn an `FfmpegProcess`.
pub trait FfmpegSpawner {
    type Process: FfmpegProcess;

    fn spawn(&self, cmd: &EncoderCommand) -> CoreResult<Self::Process>;
}

// --- Concrete Implementation using ffmpeg-sidecar ---

/// Wrapper around `ffmpeg_sidecar::child::FfmpegChild` implementing `FfmpegProcess`.
pub struct SidecarProcess {
    child: SidecarChild,
    name: String,
}

impl FfmpegProcess for SidecarProcess {
    fn take_diagnostics(&mut self) -> Option<Box<dyn Read + Send>> {
        self.child
            .take_stderr()
            .map(|stderr| Box::new(stderr) as Box<dyn Read + Send>)
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        self.child
            .wait()
            .map_err(|e| command_wait_error(self.name.clone(), e))
    }

    fn kill(&mut self) -> CoreResult<()> {
        self.child
            .kill()
            .map_err(|e| command_wait_error(self.name.clone(), e))
    }
}

/// Concrete implementation of `FfmpegSpawner` using `ffmpeg-sidecar`.
#[derive(Debug, Clone, Default)]
pub struct SidecarSpawner;

impl FfmpegSpawner for SidecarSpawner {
    type Process = SidecarProcess;

    fn spawn(&self, cmd: &EncoderCommand) -> CoreResult<Self::Process> {
        let name = cmd.program_name();
        log::debug!("Spawning: {cmd}");
        let mut ffmpeg = FfmpegCommand::from(cmd.to_command());
        ffmpeg
            .spawn()
            .map(|child| SidecarProcess {
                child,
                name: name.clone(),
            })
            .map_err(|e| command_start_error(name, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_quotes_whitespace() {
        let cmd = EncoderCommand::new(
            "/usr/bin/ffmpeg",
            vec![
                "-y".to_string(),
                "-i".to_string(),
                "my clip.mp4".to_string(),
                "out.mp4".to_string(),
            ],
        );
        assert_eq!(cmd.to_string(), "/usr/bin/ffmpeg -y -i \"my clip.mp4\" out.mp4");
        assert_eq!(cmd.program_name(), "ffmpeg");
    }

    #[test]
    fn test_spawn_missing_binary_is_start_error() {
        let cmd = EncoderCommand::new("/definitely/not/here/ffmpeg", vec!["-version".to_string()]);
        let result = SidecarSpawner.spawn(&cmd);
        assert!(matches!(
            result,
            Err(crate::error::CoreError::CommandStart(name, _)) if name == "ffmpeg"
        ));
    }
}
