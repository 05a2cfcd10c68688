use std::thread;
use std::time::{Duration, Instant};

use crate::error::{AppError, Result};

/// Sleeps out one frame interval after each frame's work.
///
/// The deadline is re-anchored on every call, so time spent reading and
/// rendering a frame is never made up later. Sustained overhead slows the
/// whole animation down.
#[derive(Debug, Clone, Copy)]
pub struct FramePacer {
    interval: Duration,
}

impl FramePacer {
    /// Fails for rates whose interval is not a finite, positive `Duration`.
    pub fn new(fps: f64) -> Result<Self> {
        if !fps.is_finite() || fps <= 0.0 {
            return Err(AppError::InvalidConfig(format!(
                "frame rate must be positive, got {fps}"
            )));
        }

        let interval = Duration::try_from_secs_f64(1.0 / fps).map_err(|err| {
            AppError::InvalidConfig(format!("frame rate {fps} has no usable interval: {err}"))
        })?;

        Ok(Self { interval })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Blocks until one interval past the moment of the call.
    pub fn wait(&self) {
        let deadline = Instant::now() + self.interval;
        let now = Instant::now();
        if deadline > now {
            thread::sleep(deadline - now);
        }
    }
}
