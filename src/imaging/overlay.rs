use image::{GrayImage, Rgb, RgbImage};

use crate::detect::{Detection, Region};

const CANDIDATE: Rgb<u8> = Rgb([0, 200, 0]);
const MARKED: Rgb<u8> = Rgb([220, 0, 0]);

fn outline(img: &mut RgbImage, region: &Region, color: Rgb<u8>) {
    if region.width == 0 || region.height == 0 {
        return;
    }
    let right = (region.right() - 1).min(img.width() - 1);
    let bottom = (region.bottom() - 1).min(img.height() - 1);

    for x in region.x..=right {
        img.put_pixel(x, region.y, color);
        img.put_pixel(x, bottom, color);
    }
    for y in region.y..=bottom {
        img.put_pixel(region.x, y, color);
        img.put_pixel(right, y, color);
    }
}

/// Renders detected bubbles over the sheet: candidates in green,
/// bubbles read as filled in red.
pub fn draw_overlay(gray: &GrayImage, detection: &Detection) -> RgbImage {
    let mut img = RgbImage::from_fn(gray.width(), gray.height(), |x, y| {
        let v = gray.get_pixel(x, y)[0];
        Rgb([v, v, v])
    });

    for region in &detection.candidates {
        outline(&mut img, region, CANDIDATE);
    }
    for region in detection.marked() {
        outline(&mut img, &region, MARKED);
    }
    img
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::{BubbleDetector, MarkDetector};
    use crate::testing::{SheetBuilder, MARGIN};

    #[test]
    fn test_overlay_colors_boxes() {
        let gray = SheetBuilder::new().question(&[0]).render();
        let detection = BubbleDetector::default().detect(&gray);
        let overlay = draw_overlay(&gray, &detection);

        assert_eq!(overlay.dimensions(), gray.dimensions());

        let marked = detection.marked()[0];
        assert_eq!(*overlay.get_pixel(marked.x, marked.y), MARKED);

        let unmarked = detection.questions[0].bubbles[1];
        assert_eq!(*overlay.get_pixel(unmarked.x, unmarked.y), CANDIDATE);

        assert_eq!(*overlay.get_pixel(MARGIN / 2, MARGIN / 2), Rgb([255, 255, 255]));
    }
}
