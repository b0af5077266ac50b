//! Sheet decoding and image preprocessing.
//!
//! Uploaded sheets arrive as encoded bytes (JPEG or PNG). They are decoded
//! to 8-bit luma and run through [`preprocess`] before bubble detection:
//!
//! 1. Gaussian blur to suppress scanner noise
//! 2. Inverted adaptive threshold so ink becomes foreground
//! 3. Morphological closing to heal broken bubble outlines

mod filters;
mod overlay;

pub use filters::{adaptive_threshold_inv, close_cross, gaussian_blur, gaussian_kernel, INK};
pub use overlay::draw_overlay;

use crate::config::DetectionConfig;
use crate::error::{OmrError, OmrResult};
use image::GrayImage;

/// Decodes sheet bytes to a grayscale image.
///
/// # Errors
///
/// Returns [`OmrError::Decode`] for empty input, unsupported or corrupt
/// data, and zero-sized images.
///
/// # Example
///
/// ```
/// use omrgrade::imaging::decode_sheet;
///
/// assert!(decode_sheet(b"not an image").is_err());
/// ```
pub fn decode_sheet(bytes: &[u8]) -> OmrResult<GrayImage> {
    if bytes.is_empty() {
        return Err(OmrError::decode("sheet", "file is empty"));
    }

    let decoded = image::load_from_memory(bytes).map_err(|e| OmrError::decode("sheet", e))?;
    let gray = decoded.to_luma8();

    if gray.width() == 0 || gray.height() == 0 {
        return Err(OmrError::decode("sheet", "image has no pixels"));
    }
    Ok(gray)
}

/// Produces the binary ink mask bubble detection runs on.
pub fn preprocess(gray: &GrayImage, config: &DetectionConfig) -> GrayImage {
    let blurred = gaussian_blur(gray, config.blur_kernel);
    let binary = adaptive_threshold_inv(&blurred, config.block_size, config.threshold_c);
    close_cross(&binary)
}
