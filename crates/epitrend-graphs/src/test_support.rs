//! In-memory canvas for drawing tests.

use crate::DrawResult;
use plotters::coord::Shift;
use plotters::prelude::*;

/// RGB pixels produced by a draw call.
pub struct Canvas {
    pub width: u32,
    pub height: u32,
    pixels: Vec<u8>,
}

impl Canvas {
    /// Runs `draw` against a white `width`x`height` bitmap held in memory.
    pub fn draw<F>(width: u32, height: u32, draw: F) -> Self
    where
        F: FnOnce(&DrawingArea<BitMapBackend<'_>, Shift>) -> DrawResult<()>,
    {
        let mut pixels = vec![255u8; (width * height * 3) as usize];
        {
            let root = BitMapBackend::with_buffer(&mut pixels, (width, height)).into_drawing_area();
            draw(&root).unwrap();
            root.present().unwrap();
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    fn is(&self, x: u32, y: u32, color: RGBColor) -> bool {
        let i = ((y * self.width + x) * 3) as usize;
        self.pixels[i..i + 3] == [color.0, color.1, color.2]
    }

    /// Number of pixels painted exactly `color`.
    pub fn count(&self, color: RGBColor) -> usize {
        self.pixels
            .chunks_exact(3)
            .filter(|px| *px == [color.0, color.1, color.2])
            .count()
    }

    /// Rows holding at least one pixel painted exactly `color`.
    pub fn rows_with(&self, color: RGBColor) -> Vec<u32> {
        (0..self.height)
            .filter(|&y| (0..self.width).any(|x| self.is(x, y, color)))
            .collect()
    }
}

/// Whether `path` holds a PNG file.
pub fn is_png(path: &std::path::Path) -> bool {
    std::fs::read(path).is_ok_and(|bytes| bytes.starts_with(b"\x89PNG"))
}
