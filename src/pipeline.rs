use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;

use image::{ImageBuffer, Luma};

use crate::ascii::{GlyphRamp, render_frame};
use crate::error::{AppError, Result};
use crate::pacing::FramePacer;
use crate::terminal::resize_terminal;
use crate::video::{self, DecoderProcess};

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Directory holding `ffmpeg` and `ffprobe`; `None` resolves them on `PATH`.
    pub ffmpeg_dir: Option<PathBuf>,
    pub width: u16,
    pub height: u16,
    pub fps: f64,
    pub ramp: GlyphRamp,
    pub resize_terminal: bool,
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(AppError::InvalidConfig(format!(
                "frame size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }

        FramePacer::new(self.fps)?;

        Ok(())
    }

    /// Bytes in one raw `gray` frame.
    pub fn frame_len(&self) -> usize {
        usize::from(self.width) * usize::from(self.height)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PipelineStats {
    pub duration_secs: f64,
    pub frames_rendered: usize,
    pub fps: f64,
}

pub fn run(config: &PipelineConfig) -> Result<PipelineStats> {
    config.validate()?;

    if !config.input.exists() {
        return Err(AppError::InputNotFound(config.input.clone()));
    }

    let ffmpeg_dir = config.ffmpeg_dir.as_deref();
    let duration_secs =
        video::probe_duration(&video::tool_path(ffmpeg_dir, "ffprobe"), &config.input)?;
    let pacer = FramePacer::new(config.fps)?;
    let frames = video::total_frames(duration_secs, config.fps);
    log::info!("rendering {frames} frames at {} fps", config.fps);

    let mut persisted = create_output(config)?;

    if config.resize_terminal {
        resize_terminal(config.width, config.height);
    }

    let mut decoder = DecoderProcess::spawn(
        &video::tool_path(ffmpeg_dir, "ffmpeg"),
        &config.input,
        config.width,
        config.height,
    )?;

    log::debug!("frame interval {:?}", pacer.interval());

    let stdout = io::stdout();
    let mut display = stdout.lock();
    let frames_rendered = render_stream(
        decoder.reader(),
        &mut display,
        &mut persisted,
        frames,
        config,
        &pacer,
    )?;

    decoder.finish()?;
    persisted.flush().map_err(|source| output_error(config, source))?;

    log::info!("rendered {frames_rendered} frames to {}", config.output.display());

    Ok(PipelineStats {
        duration_secs,
        frames_rendered,
        fps: config.fps,
    })
}

/// Reads `total_frames` raw frames from `reader`, writing each rendered frame
/// to `display` and `persisted` before sleeping out the frame interval.
///
/// A short read aborts the whole run; frames already written stay written.
pub fn render_stream<R, D, P>(
    reader: &mut R,
    display: &mut D,
    persisted: &mut P,
    total_frames: usize,
    config: &PipelineConfig,
    pacer: &FramePacer,
) -> Result<usize>
where
    R: Read,
    D: Write,
    P: Write,
{
    let frame_len = config.frame_len();
    let mut buffer = vec![0u8; frame_len];

    for frame in 0..total_frames {
        reader
            .read_exact(&mut buffer)
            .map_err(|source| AppError::StreamTruncated {
                frame,
                expected: frame_len,
                source,
            })?;

        // `buffer` is always width * height bytes, so this only trips on a sizing bug.
        let raster = ImageBuffer::<Luma<u8>, &[u8]>::from_raw(
            u32::from(config.width),
            u32::from(config.height),
            &buffer[..],
        )
        .ok_or_else(|| {
            AppError::InvalidConfig(format!(
                "{} bytes do not form a {}x{} frame",
                buffer.len(),
                config.width,
                config.height
            ))
        })?;
        let text = render_frame(&raster, &config.ramp);

        display
            .write_all(text.as_bytes())
            .and_then(|()| display.flush())
            .map_err(AppError::DisplayWrite)?;
        persisted
            .write_all(text.as_bytes())
            .and_then(|()| persisted.flush())
            .map_err(|source| output_error(config, source))?;

        pacer.wait();
    }

    Ok(total_frames)
}

fn create_output(config: &PipelineConfig) -> Result<BufWriter<File>> {
    if let Some(parent) = config.output.parent() {
        fs::create_dir_all(parent).map_err(|source| output_error(config, source))?;
    }

    let file = File::create(&config.output).map_err(|source| output_error(config, source))?;
    Ok(BufWriter::new(file))
}

fn output_error(config: &PipelineConfig, source: io::Error) -> AppError {
    AppError::OutputWrite {
        path: config.output.clone(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::time::{Duration, Instant};

    fn config(width: u16, height: u16, charset: &str) -> PipelineConfig {
        PipelineConfig {
            input: PathBuf::from("input.mp4"),
            output: PathBuf::from("output.txt"),
            ffmpeg_dir: None,
            width,
            height,
            fps: 1000.0,
            ramp: GlyphRamp::new(charset).unwrap(),
            resize_terminal: false,
        }
    }

    #[test]
    fn renders_checkerboard_to_both_sinks() {
        let config = config(4, 2, " #");
        let pacer = FramePacer::new(config.fps).unwrap();
        let mut reader = Cursor::new(vec![0, 255, 0, 255, 255, 0, 255, 0]);
        let mut display = Vec::new();
        let mut persisted = Vec::new();

        let rendered =
            render_stream(&mut reader, &mut display, &mut persisted, 1, &config, &pacer).unwrap();

        assert_eq!(rendered, 1);
        assert_eq!(String::from_utf8(display).unwrap(), " # #\n# # \n");
        assert_eq!(persisted, b" # #\n# # \n");
    }

    #[test]
    fn stops_after_requested_frames() {
        let config = config(2, 1, " #");
        let pacer = FramePacer::new(config.fps).unwrap();
        let mut reader = Cursor::new(vec![0u8; 2 * 5]);
        let mut display = Vec::new();
        let mut persisted = Vec::new();

        let rendered =
            render_stream(&mut reader, &mut display, &mut persisted, 3, &config, &pacer).unwrap();

        assert_eq!(rendered, 3);
        assert_eq!(persisted, b"  \n  \n  \n");
        assert_eq!(reader.position(), 6);
    }

    #[test]
    fn short_stream_aborts_after_last_whole_frame() {
        let config = config(4, 2, " #");
        let pacer = FramePacer::new(config.fps).unwrap();
        let mut reader = Cursor::new(vec![255u8; 8 + 5]);
        let mut display = Vec::new();
        let mut persisted = Vec::new();

        let err = render_stream(&mut reader, &mut display, &mut persisted, 3, &config, &pacer)
            .unwrap_err();

        match err {
            AppError::StreamTruncated {
                frame, expected, ..
            } => {
                assert_eq!(frame, 1);
                assert_eq!(expected, 8);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(persisted, b"####\n####\n");
    }

    #[test]
    fn zero_frames_reads_nothing() {
        let config = config(4, 2, " #");
        let pacer = FramePacer::new(config.fps).unwrap();
        let mut reader = Cursor::new(Vec::<u8>::new());
        let mut display = Vec::new();
        let mut persisted = Vec::new();

        let rendered =
            render_stream(&mut reader, &mut display, &mut persisted, 0, &config, &pacer).unwrap();

        assert_eq!(rendered, 0);
        assert!(display.is_empty());
    }

    #[test]
    fn paces_frames_at_target_rate() {
        let mut config = config(2, 2, " #");
        config.fps = 60.0;
        let pacer = FramePacer::new(config.fps).unwrap();
        let mut reader = Cursor::new(vec![0u8; 4 * 6]);
        let mut display = io::sink();
        let mut persisted = io::sink();

        let start = Instant::now();
        render_stream(&mut reader, &mut display, &mut persisted, 6, &config, &pacer).unwrap();
        let elapsed = start.elapsed();

        assert!(elapsed >= Duration::from_millis(95), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(1500), "{elapsed:?}");
    }

    #[test]
    fn validates_dimensions_and_rate() {
        assert!(config(4, 2, " #").validate().is_ok());
        assert!(matches!(
            config(0, 2, " #").validate(),
            Err(AppError::InvalidConfig(_))
        ));

        let mut bad_rate = config(4, 2, " #");
        bad_rate.fps = 0.0;
        assert!(matches!(bad_rate.validate(), Err(AppError::InvalidConfig(_))));
        bad_rate.fps = f64::NAN;
        assert!(matches!(bad_rate.validate(), Err(AppError::InvalidConfig(_))));
        bad_rate.fps = 1e-20;
        assert!(matches!(bad_rate.validate(), Err(AppError::InvalidConfig(_))));
    }
}
