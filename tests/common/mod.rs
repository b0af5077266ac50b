#![allow(dead_code)]

use image::{GrayImage, ImageFormat, Luma};
use std::io::Cursor;

const BUBBLE: u32 = 9;
const PITCH_X: u32 = 16;
const PITCH_Y: u32 = 24;
const MARGIN: u32 = 20;

/// Renders a one-column sheet: each entry is a question's filled choices.
pub fn sheet_png(questions: &[&[usize]]) -> Vec<u8> {
    let width = MARGIN * 2 + PITCH_X * 5;
    let height = MARGIN * 2 + PITCH_Y * questions.len().max(1) as u32;
    let mut img = GrayImage::from_pixel(width, height, Luma([255]));

    for (row, filled) in questions.iter().enumerate() {
        let y0 = MARGIN + row as u32 * PITCH_Y;
        for choice in 0..5usize {
            let x0 = MARGIN + choice as u32 * PITCH_X;
            for y in y0..y0 + BUBBLE {
                for x in x0..x0 + BUBBLE {
                    let edge = x == x0 || y == y0 || x == x0 + BUBBLE - 1 || y == y0 + BUBBLE - 1;
                    if filled.contains(&choice) || edge {
                        img.put_pixel(x, y, Luma([0]));
                    }
                }
            }
        }
    }

    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

pub fn blank_png() -> Vec<u8> {
    let img = GrayImage::from_pixel(64, 64, Luma([255]));
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

/// Key: Q1=A Q2=B Q3=C Q4=D
pub fn key_png() -> Vec<u8> {
    sheet_png(&[&[0], &[1], &[2], &[3]])
}
