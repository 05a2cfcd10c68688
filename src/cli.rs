use std::path::PathBuf;

use clap::Parser;

use crate::ascii::{DEFAULT_RAMP, GlyphRamp};
use crate::error::Result;
use crate::pipeline::PipelineConfig;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Play a video as ASCII art in the terminal and save the frames to a text file"
)]
pub struct Cli {
    /// Input video path
    pub input: PathBuf,

    /// Text file receiving every rendered frame
    #[arg(short, long, default_value = "output.txt")]
    pub output: PathBuf,

    /// Directory containing ffmpeg and ffprobe (defaults to PATH lookup)
    #[arg(long)]
    pub ffmpeg_dir: Option<PathBuf>,

    /// Frame width in characters
    #[arg(long, default_value_t = 120)]
    pub width: u16,

    /// Frame height in lines
    #[arg(long, default_value_t = 30)]
    pub height: u16,

    /// Target playback rate
    #[arg(long, default_value_t = 60.0)]
    pub fps: f64,

    /// Characters from dark to light
    #[arg(long, default_value = DEFAULT_RAMP)]
    pub charset: String,

    /// Leave the terminal size alone
    #[arg(long)]
    pub no_resize: bool,

    /// Log level: error, warn, info, debug, trace
    #[arg(long, default_value = "warn")]
    pub log_level: log::LevelFilter,
}

impl Cli {
    pub fn pipeline_config(&self) -> Result<PipelineConfig> {
        let config = PipelineConfig {
            input: self.input.clone(),
            output: self.output.clone(),
            ffmpeg_dir: self.ffmpeg_dir.clone(),
            width: self.width,
            height: self.height,
            fps: self.fps,
            ramp: GlyphRamp::new(&self.charset)?,
            resize_terminal: !self.no_resize,
        };
        config.validate()?;
        Ok(config)
    }
}
