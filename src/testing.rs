//! Synthetic answer sheets for unit tests.

use image::{GrayImage, ImageFormat, Luma};
use std::io::Cursor;

pub const BUBBLE: u32 = 9;
pub const PITCH_X: u32 = 16;
pub const PITCH_Y: u32 = 24;
pub const MARGIN: u32 = 20;

/// Draws one question per row, five bubbles per question.
#[derive(Default)]
pub struct SheetBuilder {
    rows: Vec<Vec<usize>>,
    framed: bool,
}

impl SheetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a question with the given zero-based choices filled.
    pub fn question(mut self, filled: &[usize]) -> Self {
        self.rows.push(filled.to_vec());
        self
    }

    /// Prints a 2px box around the whole answer grid.
    pub fn framed(mut self) -> Self {
        self.framed = true;
        self
    }

    pub fn render(&self) -> GrayImage {
        let width = MARGIN * 2 + PITCH_X * 5;
        let height = MARGIN * 2 + PITCH_Y * self.rows.len().max(1) as u32;
        let mut img = GrayImage::from_pixel(width, height, Luma([255]));

        for (row, filled) in self.rows.iter().enumerate() {
            let y = MARGIN + row as u32 * PITCH_Y;
            for choice in 0..5 {
                let x = MARGIN + choice as u32 * PITCH_X;
                draw_bubble(&mut img, x, y, filled.contains(&choice));
            }
        }
        if self.framed {
            draw_frame(&mut img, MARGIN / 2);
        }
        img
    }

    pub fn png(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        self.render()
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }
}

fn draw_bubble(img: &mut GrayImage, x0: u32, y0: u32, filled: bool) {
    for y in y0..y0 + BUBBLE {
        for x in x0..x0 + BUBBLE {
            let edge = x == x0 || y == y0 || x == x0 + BUBBLE - 1 || y == y0 + BUBBLE - 1;
            if filled || edge {
                img.put_pixel(x, y, Luma([0]));
            }
        }
    }
}

fn draw_frame(img: &mut GrayImage, inset: u32) {
    let (right, bottom) = (img.width() - inset, img.height() - inset);
    for y in inset..bottom {
        for x in inset..right {
            let edge = x < inset + 2 || y < inset + 2 || x >= right - 2 || y >= bottom - 2;
            if edge {
                img.put_pixel(x, y, Luma([0]));
            }
        }
    }
}
