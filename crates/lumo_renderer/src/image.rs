//! Render output buffer and PPM encoding.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use lumo_core::Color;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to write image: {0}")]
    Io(#[from] io::Error),
}

pub type RenderResult<T> = Result<T, RenderError>;

/// Convert a [0, 1] channel to 8 bits.
#[inline]
pub fn to_byte(c: f32) -> u8 {
    // `as` saturates, so out-of-range values clamp to 0 or 255
    (255.999 * c) as u8
}

/// 2-D color buffer. Row 0 is the bottom of the image.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; (width * height) as usize],
        }
    }

    /// Get the pixel at (x, y), counting rows from the bottom.
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        self.pixels[(y * self.width + x) as usize] = color;
    }

    /// Rows in display order, top row first.
    fn rows_top_down(&self) -> impl Iterator<Item = &[Color]> {
        self.pixels.chunks(self.width.max(1) as usize).rev()
    }

    /// Packed RGB bytes, top row first, for PNG encoding or display.
    pub fn to_rgb8(&self) -> Vec<u8> {
        let texels: Vec<[u8; 3]> = self
            .rows_top_down()
            .flatten()
            .map(|c| [to_byte(c.x), to_byte(c.y), to_byte(c.z)])
            .collect();
        bytemuck::cast_slice(&texels).to_vec()
    }

    /// Write as ASCII "P3" PPM, top row first.
    pub fn write_ppm<W: Write>(&self, out: &mut W) -> RenderResult<()> {
        write!(out, "P3\n{} {}\n255\n", self.width, self.height)?;
        for row in self.rows_top_down() {
            for c in row {
                writeln!(out, "{} {} {}", to_byte(c.x), to_byte(c.y), to_byte(c.z))?;
            }
        }
        Ok(())
    }

    /// The PPM encoding as a string.
    pub fn to_ppm_string(&self) -> String {
        let mut bytes = Vec::new();
        // Writing into a Vec cannot fail
        let _ = self.write_ppm(&mut bytes);
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Write a PPM file at `path`.
    pub fn save_ppm(&self, path: impl AsRef<Path>) -> RenderResult<()> {
        let mut out = BufWriter::new(File::create(path)?);
        self.write_ppm(&mut out)?;
        out.flush()?;
        Ok(())
    }
}
