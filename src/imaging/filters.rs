//! Grayscale filters used ahead of bubble detection.
//!
//! Borders are handled by replicating the edge pixel.

use image::GrayImage;

/// Ink value in binary images.
pub const INK: u8 = 255;

/// Sigma picked for a kernel size when none is given explicitly.
fn auto_sigma(ksize: u32) -> f32 {
    0.3 * ((ksize as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Normalized 1-D Gaussian kernel of odd length `ksize`.
pub fn gaussian_kernel(ksize: u32) -> Vec<f32> {
    let ksize = ksize.max(1) | 1;
    let sigma = auto_sigma(ksize);
    let center = (ksize / 2) as f32;

    let mut weights: Vec<f32> = (0..ksize)
        .map(|i| {
            let d = i as f32 - center;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();

    let sum: f32 = weights.iter().sum();
    for w in &mut weights {
        *w /= sum;
    }
    weights
}

/// Applies `kernel` horizontally then vertically, returning a float plane.
fn separable(img: &GrayImage, kernel: &[f32]) -> Vec<f32> {
    let (width, height) = (img.width() as usize, img.height() as usize);
    let radius = (kernel.len() / 2) as isize;
    let src = img.as_raw();

    let clamp = |v: isize, max: usize| v.clamp(0, max as isize - 1) as usize;

    let mut horizontal = vec![0.0f32; width * height];
    for y in 0..height {
        let row = &src[y * width..(y + 1) * width];
        for x in 0..width {
            let mut acc = 0.0;
            for (k, w) in kernel.iter().enumerate() {
                let sx = clamp(x as isize + k as isize - radius, width);
                acc += row[sx] as f32 * w;
            }
            horizontal[y * width + x] = acc;
        }
    }

    let mut out = vec![0.0f32; width * height];
    for y in 0..height {
        for x in 0..width {
            let mut acc = 0.0;
            for (k, w) in kernel.iter().enumerate() {
                let sy = clamp(y as isize + k as isize - radius, height);
                acc += horizontal[sy * width + x] * w;
            }
            out[y * width + x] = acc;
        }
    }

    out
}

fn to_u8(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Gaussian blur with an odd `ksize` kernel.
pub fn gaussian_blur(img: &GrayImage, ksize: u32) -> GrayImage {
    if ksize <= 1 || img.width() == 0 || img.height() == 0 {
        return img.clone();
    }
    let plane = separable(img, &gaussian_kernel(ksize));
    let pixels = plane.into_iter().map(to_u8).collect();
    GrayImage::from_raw(img.width(), img.height(), pixels).unwrap_or_else(|| img.clone())
}

/// Inverted adaptive threshold against a Gaussian-weighted local mean.
///
/// A pixel becomes [`INK`] when it is at most `mean - c`, otherwise 0.
pub fn adaptive_threshold_inv(img: &GrayImage, block: u32, c: f32) -> GrayImage {
    if img.width() == 0 || img.height() == 0 {
        return img.clone();
    }
    let means = separable(img, &gaussian_kernel(block));
    let pixels = img
        .as_raw()
        .iter()
        .zip(means)
        .map(|(&p, mean)| {
            if p as f32 <= to_u8(mean) as f32 - c {
                INK
            } else {
                0
            }
        })
        .collect();
    GrayImage::from_raw(img.width(), img.height(), pixels).unwrap_or_else(|| img.clone())
}

const CROSS: [(i32, i32); 5] = [(0, 0), (-1, 0), (1, 0), (0, -1), (0, 1)];

fn morph(img: &GrayImage, dilate: bool) -> GrayImage {
    let (width, height) = (img.width() as i32, img.height() as i32);
    let mut out = GrayImage::new(img.width(), img.height());

    for y in 0..height {
        for x in 0..width {
            let mut neighbours = CROSS
                .iter()
                .map(|(dx, dy)| (x + dx, y + dy))
                .filter(|(nx, ny)| *nx >= 0 && *ny >= 0 && *nx < width && *ny < height)
                .map(|(nx, ny)| img.get_pixel(nx as u32, ny as u32)[0] == INK);

            let hit = if dilate {
                neighbours.any(|ink| ink)
            } else {
                neighbours.all(|ink| ink)
            };
            if hit {
                out.put_pixel(x as u32, y as u32, image::Luma([INK]));
            }
        }
    }
    out
}

/// Morphological closing with a 3x3 cross: fills pinholes and hairline gaps.
pub fn close_cross(binary: &GrayImage) -> GrayImage {
    morph(&morph(binary, true), false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn white(width: u32, height: u32) -> GrayImage {
        GrayImage::from_pixel(width, height, Luma([255]))
    }

    fn fill(img: &mut GrayImage, x0: u32, y0: u32, size: u32, value: u8) {
        for y in y0..y0 + size {
            for x in x0..x0 + size {
                img.put_pixel(x, y, Luma([value]));
            }
        }
    }

    #[test]
    fn test_kernel_is_normalized_and_symmetric() {
        let kernel = gaussian_kernel(5);
        assert_eq!(kernel.len(), 5);
        let sum: f32 = kernel.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        assert!((kernel[0] - kernel[4]).abs() < 1e-6);
        assert!(kernel[2] > kernel[1]);
    }

    #[test]
    fn test_even_kernel_rounds_up_to_odd() {
        assert_eq!(gaussian_kernel(4).len(), 5);
    }

    #[test]
    fn test_blur_keeps_uniform_image() {
        let img = GrayImage::from_pixel(12, 9, Luma([77]));
        let blurred = gaussian_blur(&img, 5);
        assert!(blurred.pixels().all(|p| p[0] == 77));
    }

    #[test]
    fn test_blur_softens_edges() {
        let mut img = white(20, 20);
        fill(&mut img, 5, 5, 10, 0);
        let blurred = gaussian_blur(&img, 5);

        let edge = blurred.get_pixel(4, 10)[0];
        assert!(edge > 0 && edge < 255);
        assert_eq!(blurred.get_pixel(10, 10)[0], 0);
    }

    #[test]
    fn test_threshold_blank_page_has_no_ink() {
        let img = white(30, 30);
        let binary = adaptive_threshold_inv(&img, 11, 2.0);
        assert!(binary.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn test_threshold_marks_small_dark_square() {
        let mut img = white(30, 30);
        fill(&mut img, 12, 12, 6, 0);
        let binary = adaptive_threshold_inv(&img, 11, 2.0);

        assert_eq!(binary.get_pixel(14, 14)[0], INK);
        assert_eq!(binary.get_pixel(2, 2)[0], 0);
    }

    #[test]
    fn test_close_fills_pinhole() {
        let mut img = GrayImage::new(7, 7);
        fill(&mut img, 1, 1, 5, INK);
        img.put_pixel(3, 3, Luma([0]));

        let closed = close_cross(&img);
        assert_eq!(closed.get_pixel(3, 3)[0], INK);
        assert_eq!(closed.get_pixel(0, 0)[0], 0);
    }
}
