use std::ops::Deref;

use image::{ImageBuffer, Luma};

use crate::error::{AppError, Result};

/// Darkest to brightest, as used by the original player.
pub const DEFAULT_RAMP: &str = " .,:;+*?%S#@";

/// Ordered glyphs, index 0 darkest. Always holds at least two glyphs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphRamp {
    glyphs: Vec<char>,
}

impl GlyphRamp {
    pub fn new(charset: &str) -> Result<Self> {
        let glyphs: Vec<char> = charset.chars().collect();
        if glyphs.len() < 2 {
            return Err(AppError::InvalidConfig(format!(
                "glyph ramp needs at least 2 characters, got {}",
                glyphs.len()
            )));
        }
        Ok(Self { glyphs })
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn glyphs(&self) -> &[char] {
        &self.glyphs
    }

    /// Glyph for one grayscale sample.
    pub fn glyph_for(&self, sample: u8) -> char {
        self.glyphs[glyph_index(sample, self.glyphs.len())]
    }
}

impl Default for GlyphRamp {
    fn default() -> Self {
        Self {
            glyphs: DEFAULT_RAMP.chars().collect(),
        }
    }
}

/// `floor(sample / 255 * (len - 1))`, clamped into `0..len`.
pub fn glyph_index(sample: u8, len: usize) -> usize {
    let last = len.saturating_sub(1);
    let normalized = f64::from(sample) / 255.0;
    let idx = (normalized * last as f64).floor() as usize;
    idx.min(last)
}

/// Renders one grayscale raster as `height` lines of `width` glyphs, each
/// terminated by `\n`.
pub fn render_frame<C>(frame: &ImageBuffer<Luma<u8>, C>, ramp: &GlyphRamp) -> String
where
    C: Deref<Target = [u8]>,
{
    let (width, height) = frame.dimensions();
    let mut out = String::with_capacity(((width + 1) * height) as usize);

    for row in frame.rows() {
        for pixel in row {
            out.push(ramp.glyph_for(pixel[0]));
        }
        out.push('\n');
    }

    out
}
