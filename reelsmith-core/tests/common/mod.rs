// reelsmith-core/tests/common/mod.rs

// --- Mocking Infrastructure (for integration tests) ---

#![allow(dead_code)]

use reelsmith_core::error::{CoreError, CoreResult};
use reelsmith_core::external::{EncoderCommand, FfmpegProcess, FfmpegSpawner, FfprobeExecutor};
use reelsmith_core::media::{MediaDescriptor, parse_json};
use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::os::unix::process::ExitStatusExt;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;

/// Exit status for a normal exit with `code`.
pub fn exit_code(code: i32) -> ExitStatus {
    ExitStatus::from_raw(code << 8)
}

/// A descriptor that validates, built the same way a real probe builds one.
pub fn valid_media(path: &str, duration: f64) -> MediaDescriptor {
    let json = format!(
        r#"{{ "streams": [ {{ "codec_type": "video", "codec_name": "h264",
              "width": 320, "height": 240, "r_frame_rate": "25/1" }} ],
            "format": {{ "duration": "{duration}" }} }}"#
    );
    MediaDescriptor::from_probe(path, &parse_json(&json).expect("valid probe json"))
}

/// Diagnostic stream that yields `prefix` and then blocks until released.
pub struct HangingReader {
    prefix: Cursor<Vec<u8>>,
    release: mpsc::Receiver<()>,
}

impl Read for HangingReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.prefix.read(buf)?;
        if n > 0 {
            return Ok(n);
        }
        // Blocks until the sender is dropped by `kill`.
        let _ = self.release.recv();
        Ok(0)
    }
}

/// Mock implementation of FfmpegProcess.
pub struct MockFfmpegProcess {
    diagnostics: Option<Box<dyn Read + Send>>,
    exit_status: ExitStatus,
    killed: Arc<AtomicBool>,
    release: Option<mpsc::Sender<()>>,
}

impl MockFfmpegProcess {
    /// A process that prints `stderr` and exits with `code`.
    pub fn exiting(stderr: &str, code: i32) -> Self {
        Self {
            diagnostics: Some(Box::new(Cursor::new(stderr.as_bytes().to_vec()))),
            exit_status: exit_code(code),
            killed: Arc::new(AtomicBool::new(false)),
            release: None,
        }
    }

    /// A process that prints `stderr` and then stops producing output.
    pub fn hanging(stderr: &str) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            diagnostics: Some(Box::new(HangingReader {
                prefix: Cursor::new(stderr.as_bytes().to_vec()),
                release: rx,
            })),
            exit_status: exit_code(137),
            killed: Arc::new(AtomicBool::new(false)),
            release: Some(tx),
        }
    }

    pub fn killed_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.killed)
    }
}

impl FfmpegProcess for MockFfmpegProcess {
    fn take_diagnostics(&mut self) -> Option<Box<dyn Read + Send>> {
        self.diagnostics.take()
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        Ok(self.exit_status)
    }

    fn kill(&mut self) -> CoreResult<()> {
        self.killed.store(true, Ordering::SeqCst);
        self.release.take();
        Ok(())
    }
}

/// Represents an expected encoder call and its mock result.
struct MockFfmpegExpectation {
    arg_pattern: String,
    process: MockFfmpegProcess,
    create_dummy_output: bool,
}

/// Mock implementation of FfmpegSpawner supporting multiple expectations.
///
/// Expectations are matched in order against the joined argument list.
#[derive(Clone, Default)]
pub struct MockFfmpegSpawner {
    expectations: Rc<RefCell<Vec<MockFfmpegExpectation>>>,
    received_calls: Rc<RefCell<Vec<Vec<String>>>>,
}

impl MockFfmpegSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_expectation(
        &self,
        arg_pattern: &str,
        process: MockFfmpegProcess,
        create_dummy_output: bool,
    ) {
        self.expectations.borrow_mut().push(MockFfmpegExpectation {
            arg_pattern: arg_pattern.to_string(),
            process,
            create_dummy_output,
        });
    }

    pub fn get_received_calls(&self) -> Vec<Vec<String>> {
        self.received_calls.borrow().clone()
    }
}

impl FfmpegSpawner for MockFfmpegSpawner {
    type Process = MockFfmpegProcess;

    fn spawn(&self, cmd: &EncoderCommand) -> CoreResult<Self::Process> {
        self.received_calls.borrow_mut().push(cmd.args.clone());
        let joined = cmd.args.join(" ");

        let mut expectations = self.expectations.borrow_mut();
        let Some(idx) = expectations
            .iter()
            .position(|e| joined.contains(&e.arg_pattern))
        else {
            return Err(CoreError::CommandStart(
                format!("unexpected mock call: {joined}"),
                std::io::Error::new(std::io::ErrorKind::NotFound, "no matching expectation"),
            ));
        };
        let expectation = expectations.remove(idx);

        if expectation.create_dummy_output {
            if let Some(output) = cmd.args.last() {
                std::fs::write(output, b"dummy content").map_err(CoreError::Io)?;
            }
        }
        Ok(expectation.process)
    }
}

/// Mock implementation of FfprobeExecutor keyed by path.
#[derive(Clone, Default)]
pub struct MockFfprobeExecutor {
    responses: Rc<RefCell<HashMap<PathBuf, MediaDescriptor>>>,
    calls: Rc<RefCell<Vec<String>>>,
}

impl MockFfprobeExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expect_probe(&self, path: &Path, media: MediaDescriptor) {
        self.responses.borrow_mut().insert(path.to_path_buf(), media);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl FfprobeExecutor for MockFfprobeExecutor {
    fn probe(&self, input: &str) -> CoreResult<MediaDescriptor> {
        self.calls.borrow_mut().push(input.to_string());
        self.responses
            .borrow()
            .get(Path::new(input))
            .cloned()
            .ok_or_else(|| CoreError::FfprobeParse(format!("no mock probe result for {input}")))
    }
}
