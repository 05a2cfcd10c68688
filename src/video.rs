use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};

use crate::error::{AppError, Result};

/// Resolves `ffmpeg`/`ffprobe` inside `dir`, or through `PATH` when no
/// directory is configured.
pub fn tool_path(dir: Option<&Path>, name: &str) -> PathBuf {
    match dir {
        Some(dir) => dir.join(format!("{name}{}", std::env::consts::EXE_SUFFIX)),
        None => PathBuf::from(name),
    }
}

/// Asks `ffprobe` for the container duration in seconds.
pub fn probe_duration(ffprobe: &Path, input: &Path) -> Result<f64> {
    let program = ffprobe.display().to_string();
    log::debug!("probing duration of {} with {program}", input.display());

    let output = Command::new(ffprobe)
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(input)
        .stdin(Stdio::null())
        .output()
        .map_err(|source| AppError::ProbeSpawn {
            program: program.clone(),
            source,
        })?;

    ensure_probe_success(&program, &output)?;

    let duration = parse_duration(&String::from_utf8_lossy(&output.stdout))?;
    log::info!("{}: {duration:.3}s", input.display());
    Ok(duration)
}

/// Parses the bare seconds value printed by the probe.
pub fn parse_duration(text: &str) -> Result<f64> {
    let trimmed = text.trim();
    let duration = trimmed
        .parse::<f64>()
        .map_err(|_| AppError::DurationParse(format!("{trimmed:?}")))?;

    if !duration.is_finite() || duration < 0.0 {
        return Err(AppError::DurationParse(format!(
            "{trimmed:?} is not a usable duration"
        )));
    }

    Ok(duration)
}

/// `floor(duration * fps)`.
pub fn total_frames(duration_secs: f64, fps: f64) -> usize {
    (duration_secs * fps).floor() as usize
}

fn ensure_probe_success(program: &str, output: &std::process::Output) -> Result<()> {
    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    Err(AppError::ProbeFailed {
        program: program.to_string(),
        code: output.status.code(),
        stderr,
    })
}

/// A running `ffmpeg` streaming raw `gray` frames on stdout.
///
/// Dropping it without calling [`DecoderProcess::finish`] kills and reaps the
/// child, so error paths never leave a zombie behind.
pub struct DecoderProcess {
    program: String,
    child: Child,
    stdout: BufReader<ChildStdout>,
    reaped: bool,
}

impl DecoderProcess {
    pub fn spawn(ffmpeg: &Path, input: &Path, width: u16, height: u16) -> Result<Self> {
        let program = ffmpeg.display().to_string();
        let filter = format!("scale={width}:{height},format=gray");

        let mut command = Command::new(ffmpeg);
        command
            .args(["-hide_banner", "-v", "error", "-i"])
            .arg(input)
            .args([
                "-an",
                "-vf",
                &filter,
                "-f",
                "rawvideo",
                "-pix_fmt",
                "gray",
                "-",
            ])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());
        log::debug!("spawning {command:?}");

        let mut child = command.spawn().map_err(|source| AppError::PipeSetup {
            program: program.clone(),
            source,
        })?;

        let Some(stdout) = child.stdout.take() else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(AppError::PipeSetup {
                program,
                source: io::Error::other("stdout was not captured"),
            });
        };

        log::info!("decoder started (pid {}) at {width}x{height}", child.id());

        Ok(Self {
            program,
            child,
            stdout: BufReader::new(stdout),
            reaped: false,
        })
    }

    /// Buffered frame stream.
    pub fn reader(&mut self) -> &mut BufReader<ChildStdout> {
        &mut self.stdout
    }

    /// Discards whatever the decoder still has queued, then waits for it to
    /// exit and checks the status.
    pub fn finish(mut self) -> Result<()> {
        match io::copy(&mut self.stdout, &mut io::sink()) {
            Ok(0) => {}
            Ok(extra) => log::debug!("discarded {extra} trailing bytes from {}", self.program),
            Err(err) => log::warn!("failed to drain {}: {err}", self.program),
        }

        let status = self.child.wait();
        self.reaped = true;

        match status {
            Ok(status) if status.success() => Ok(()),
            Ok(status) => Err(AppError::DecoderExit {
                program: self.program.clone(),
                code: status.code(),
            }),
            Err(err) => {
                log::warn!("failed to wait for {}: {err}", self.program);
                Err(AppError::DecoderExit {
                    program: self.program.clone(),
                    code: None,
                })
            }
        }
    }
}

impl Drop for DecoderProcess {
    fn drop(&mut self) {
        if self.reaped {
            return;
        }

        log::warn!("stopping {} (pid {})", self.program, self.child.id());
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
