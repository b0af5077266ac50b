use image::GrayImage;
use serde::{Deserialize, Serialize};

use crate::imaging::INK;

/// A connected blob of ink and its bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Foreground pixels in the blob
    pub pixels: u32,
    /// Fraction of the bounding box that is dark in the source image
    pub fill: f32,
}

impl Region {
    pub fn area(&self) -> u32 {
        self.width * self.height
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn center(&self) -> (f32, f32) {
        (
            self.x as f32 + self.width as f32 / 2.0,
            self.y as f32 + self.height as f32 / 2.0,
        )
    }

    /// True when `other` lies strictly inside this box.
    pub fn encloses(&self, other: &Region) -> bool {
        other.x > self.x
            && other.y > self.y
            && other.right() < self.right()
            && other.bottom() < self.bottom()
    }
}

/// Labels 8-connected ink components of a binary image.
pub fn find_regions(binary: &GrayImage) -> Vec<Region> {
    let (width, height) = (binary.width() as usize, binary.height() as usize);
    let ink = binary.as_raw();
    let mut seen = vec![false; width * height];
    let mut regions = Vec::new();
    let mut stack = Vec::new();

    for start in 0..width * height {
        if seen[start] || ink[start] != INK {
            continue;
        }

        seen[start] = true;
        stack.push(start);
        let (mut min_x, mut min_y) = (usize::MAX, usize::MAX);
        let (mut max_x, mut max_y) = (0usize, 0usize);
        let mut pixels = 0u32;

        while let Some(idx) = stack.pop() {
            let (x, y) = (idx % width, idx / width);
            pixels += 1;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);

            for dy in -1i64..=1 {
                for dx in -1i64..=1 {
                    if dx == 0 && dy == 0 {
                        continue;
                    }
                    let (nx, ny) = (x as i64 + dx, y as i64 + dy);
                    if nx < 0 || ny < 0 || nx >= width as i64 || ny >= height as i64 {
                        continue;
                    }
                    let n = ny as usize * width + nx as usize;
                    if !seen[n] && ink[n] == INK {
                        seen[n] = true;
                        stack.push(n);
                    }
                }
            }
        }

        regions.push(Region {
            x: min_x as u32,
            y: min_y as u32,
            width: (max_x - min_x + 1) as u32,
            height: (max_y - min_y + 1) as u32,
            pixels,
            fill: 0.0,
        });
    }

    regions
}

/// Fraction of the region's box whose source luma is below `dark_level`.
pub fn measure_fill(gray: &GrayImage, region: &Region, dark_level: u8) -> f32 {
    let area = region.area();
    if area == 0 {
        return 0.0;
    }

    let mut dark = 0u32;
    for y in region.y..region.bottom().min(gray.height()) {
        for x in region.x..region.right().min(gray.width()) {
            if gray.get_pixel(x, y)[0] < dark_level {
                dark += 1;
            }
        }
    }
    dark as f32 / area as f32
}

/// Drops regions nested inside another region of the list.
///
/// Output is ordered by `x`, then `y`. An enclosing box starts left of the
/// region it encloses and by less than the widest box's width, so only that
/// window is scanned.
pub fn outermost(mut regions: Vec<Region>) -> Vec<Region> {
    regions.sort_by_key(|r| (r.x, r.y));
    let widest = regions.iter().map(|r| r.width).max().unwrap_or(0);

    let nested: Vec<bool> = regions
        .iter()
        .enumerate()
        .map(|(i, region)| {
            regions[..i]
                .iter()
                .rev()
                .take_while(|outer| outer.x + widest > region.x)
                .any(|outer| outer.encloses(region))
        })
        .collect();

    regions
        .into_iter()
        .zip(nested)
        .filter(|(_, nested)| !nested)
        .map(|(region, _)| region)
        .collect()
}
