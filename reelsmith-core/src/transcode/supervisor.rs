// ============================================================================
// reelsmith-core/src/transcode/supervisor.rs
// ============================================================================
//
// PROCESS SUPERVISOR: streams the encoder's diagnostic output under a deadline
//
// A reader thread splits the diagnostic stream into lines and forwards them
// over a channel. The supervisor waits at most `timeout` for each line; when
// the deadline passes, the process is killed and the partial output is
// returned inside `CoreError::ProcessHung`.
//
// Progress lines (`time=HH:MM:SS.frac`) are converted to a completion
// fraction against the known total duration and handed to the caller's
// callback on the calling thread.

use std::io::Read;
use std::process::ExitStatus;
use std::sync::LazyLock;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, unbounded};
use regex::Regex;

use crate::error::{CoreError, CoreResult};
use crate::external::{EncoderCommand, FfmpegProcess, FfmpegSpawner};

/// Log target for progress milestones.
pub const PROGRESS_TARGET: &str = "reelsmith::progress";

static TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"time=(\d+):(\d+):(\d+(?:\.\d+)?)").expect("progress regex is valid")
});

/// Result of a supervised run that reached the end of its diagnostic stream.
#[derive(Debug)]
pub struct SupervisedRun {
    pub status: ExitStatus,
    /// Every diagnostic line, newline-terminated
    pub output: String,
}

/// Extracts the `time=` position from a diagnostic line, in seconds.
#[must_use]
pub fn parse_progress_time(line: &str) -> Option<f64> {
    let caps = TIME_RE.captures(line)?;
    let hours: f64 = caps[1].parse().ok()?;
    let minutes: f64 = caps[2].parse().ok()?;
    let seconds: f64 = caps[3].parse().ok()?;
    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}

/// Turns progress positions into fractions and logs 10% milestones.
#[derive(Debug)]
struct ProgressTracker {
    duration: Option<f64>,
    last_logged_decile: i32,
}

impl ProgressTracker {
    fn new(duration: Option<f64>) -> Self {
        Self {
            duration: duration.filter(|d| d.is_finite() && *d > 0.0),
            last_logged_decile: 0,
        }
    }

    fn fraction(&mut self, line: &str) -> Option<f64> {
        let duration = self.duration?;
        let position = parse_progress_time(line)?;
        let fraction = (position / duration).clamp(0.0, 1.0);

        let decile = (fraction * 10.0).floor() as i32;
        if decile > self.last_logged_decile {
            self.last_logged_decile = decile;
            log::info!(
                target: PROGRESS_TARGET,
                "{:>3.0}% ({position:.1}s of {duration:.1}s)",
                fraction * 100.0
            );
        }
        Some(fraction)
    }
}

/// Spawns `cmd` and supervises it until its diagnostic stream closes.
pub fn spawn_and_supervise<S>(
    spawner: &S,
    cmd: &EncoderCommand,
    timeout: Option<Duration>,
    duration: Option<f64>,
    progress: &mut dyn FnMut(f64),
) -> CoreResult<SupervisedRun>
where
    S: FfmpegSpawner + ?Sized,
{
    let mut process = spawner.spawn(cmd)?;
    supervise(&mut process, cmd, timeout, duration, progress)
}

/// Supervises an already spawned process.
///
/// Each wait for the next diagnostic line is bounded by `timeout`; `None`
/// waits indefinitely. No intermediate progress is reported when `duration`
/// is unknown.
pub fn supervise<P>(
    process: &mut P,
    cmd: &EncoderCommand,
    timeout: Option<Duration>,
    duration: Option<f64>,
    progress: &mut dyn FnMut(f64),
) -> CoreResult<SupervisedRun>
where
    P: FfmpegProcess + ?Sized,
{
    let Some(diagnostics) = process.take_diagnostics() else {
        log::debug!("No diagnostic stream for {}; waiting for exit", cmd.program_name());
        let status = process.wait()?;
        return Ok(SupervisedRun {
            status,
            output: String::new(),
        });
    };

    let (lines, reader) = spawn_line_reader(diagnostics);
    let mut tracker = ProgressTracker::new(duration);
    let mut output = String::new();

    loop {
        match next_line(&lines, timeout) {
            Ok(line) => {
                log::debug!(target: "ffmpeg_log", "{line}");
                output.push_str(&line);
                output.push('\n');
                if let Some(fraction) = tracker.fraction(&line) {
                    progress(fraction);
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                // The reader thread stays blocked until the pipe closes; it is not joined.
                let timeout = timeout.unwrap_or_default();
                if let Err(e) = process.kill() {
                    log::warn!("Failed to kill hung process {}: {e}", cmd.program_name());
                } else if let Err(e) = process.wait() {
                    log::debug!("Failed to reap killed process {}: {e}", cmd.program_name());
                }
                log::error!(
                    "Process hung after {:.1}s without output: {cmd}\n{output}",
                    timeout.as_secs_f64()
                );
                return Err(CoreError::ProcessHung { timeout, output });
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    if reader.join().is_err() {
        log::warn!("Diagnostic reader for {} panicked", cmd.program_name());
    }

    let status = process.wait()?;
    Ok(SupervisedRun { status, output })
}

fn next_line(lines: &Receiver<String>, timeout: Option<Duration>) -> Result<String, RecvTimeoutError> {
    match timeout {
        Some(timeout) => lines.recv_timeout(timeout),
        None => lines.recv().map_err(|_| RecvTimeoutError::Disconnected),
    }
}

/// Reads `stream` on its own thread, splitting on `\r` and `\n`.
fn spawn_line_reader(
    mut stream: Box<dyn Read + Send>,
) -> (Receiver<String>, thread::JoinHandle<()>) {
    let (tx, rx) = unbounded::<String>();
    let handle = thread::spawn(move || {
        let mut buf = [0u8; 4096];
        let mut pending: Vec<u8> = Vec::new();
        loop {
            let read = match stream.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    log::debug!("Diagnostic stream read failed: {e}");
                    break;
                }
            };
            for &byte in &buf[..read] {
                if byte == b'\n' || byte == b'\r' {
                    if !pending.is_empty() && tx.send(decode_line(&pending)).is_err() {
                        return;
                    }
                    pending.clear();
                } else {
                    pending.push(byte);
                }
            }
        }
        if !pending.is_empty() {
            let _ = tx.send(decode_line(&pending));
        }
    });
    (rx, handle)
}

/// Decodes one diagnostic line as UTF-8, falling back to ISO-8859-1.
fn decode_line(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().copied().map(char::from).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_progress_time() {
        let line = "frame=  120 fps= 30 q=28.0 size=     256kB time=00:00:04.00 bitrate= 524.3kbits/s speed=1.01x";
        assert_eq!(parse_progress_time(line), Some(4.0));
        assert_eq!(parse_progress_time("time=01:02:03.50"), Some(3723.5));
        assert_eq!(parse_progress_time("time=00:00:07"), Some(7.0));
        assert_eq!(parse_progress_time("size=N/A time=N/A bitrate=N/A"), None);
        assert_eq!(parse_progress_time("Input #0, mov,mp4"), None);
    }

    #[test]
    fn test_tracker_fractions() {
        let mut tracker = ProgressTracker::new(Some(10.0));
        assert_eq!(tracker.fraction("time=00:00:02.50"), Some(0.25));
        assert_eq!(tracker.fraction("time=00:00:12.00"), Some(1.0));
        assert_eq!(tracker.fraction("Press [q] to stop"), None);

        let mut unknown = ProgressTracker::new(None);
        assert_eq!(unknown.fraction("time=00:00:02.50"), None);

        let mut zero = ProgressTracker::new(Some(0.0));
        assert_eq!(zero.fraction("time=00:00:02.50"), None);
    }

    #[test]
    fn test_decode_line_latin1_fallback() {
        assert_eq!(decode_line(b"caf\xc3\xa9"), "café");
        assert_eq!(decode_line(b"caf\xe9"), "café");
    }

    #[test]
    fn test_line_reader_splits_carriage_returns() {
        let data: &'static [u8] = b"Input #0\nframe=1 time=00:00:01.00\rframe=2 time=00:00:02.00\r\n\ntail";
        let (rx, handle) = spawn_line_reader(Box::new(data));
        let lines: Vec<String> = rx.iter().collect();
        handle.join().unwrap();
        assert_eq!(
            lines,
            vec![
                "Input #0",
                "frame=1 time=00:00:01.00",
                "frame=2 time=00:00:02.00",
                "tail"
            ]
        );
    }
}
