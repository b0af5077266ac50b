//! Bubble detection.
//!
//! This module provides the [`MarkDetector`] trait and [`BubbleDetector`],
//! which reads filled bubbles from a grayscale sheet:
//!
//! 1. Preprocess to a binary ink mask (see [`crate::imaging::preprocess`])
//! 2. Label connected ink regions, keeping only the outermost ones
//! 3. Keep bubble-shaped candidates by box area and aspect ratio
//! 4. Measure how dark each candidate is in the source image
//! 5. Group candidates into rows and question blocks, then read marks
//!
//! # Example
//!
//! ```
//! use image::{GrayImage, Luma};
//! use omrgrade::detect::{BubbleDetector, MarkDetector};
//!
//! let blank = GrayImage::from_pixel(64, 64, Luma([255]));
//! let detection = BubbleDetector::default().detect(&blank);
//!
//! assert!(detection.sheet.is_empty());
//! ```

pub mod layout;
mod region;

pub use layout::Question;
pub use region::{find_regions, measure_fill, outermost, Region};

use image::GrayImage;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::DetectionConfig;
use crate::imaging::preprocess;
use crate::model::AnswerSheet;

/// Everything found on one sheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    pub width: u32,
    pub height: u32,
    /// Ink regions before shape filtering
    pub regions_found: usize,
    pub candidates: Vec<Region>,
    pub questions: Vec<Question>,
    pub sheet: AnswerSheet,
}

impl Detection {
    /// Candidate bubbles that were read as filled.
    pub fn marked(&self) -> Vec<Region> {
        self.questions
            .iter()
            .filter_map(|q| q.mark.as_ref().map(|m| (q, m)))
            .flat_map(|(q, mark)| {
                mark.choices()
                    .into_iter()
                    .filter_map(|c| q.bubbles.get(c.index()).copied())
                    .collect::<Vec<_>>()
            })
            .collect()
    }
}

/// Reads marked answers from a sheet image.
pub trait MarkDetector: Send + Sync {
    /// Returns the human-readable name of this detector.
    fn name(&self) -> &'static str;

    /// Detects bubbles and the answers they encode.
    ///
    /// An empty [`Detection::sheet`] means nothing could be read.
    fn detect(&self, gray: &GrayImage) -> Detection;
}

/// Contour-style bubble detector driven by [`DetectionConfig`].
#[derive(Debug, Clone, Default)]
pub struct BubbleDetector {
    config: DetectionConfig,
}

impl BubbleDetector {
    pub fn new(config: DetectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    fn is_candidate(&self, region: &Region) -> bool {
        let area = region.area();
        let aspect = region.aspect();
        self.config.min_area < area
            && area < self.config.max_area
            && self.config.min_aspect < aspect
            && aspect < self.config.max_aspect
    }
}

impl MarkDetector for BubbleDetector {
    fn name(&self) -> &'static str {
        "Bubble contour detector"
    }

    fn detect(&self, gray: &GrayImage) -> Detection {
        let binary = preprocess(gray, &self.config);
        let regions = find_regions(&binary);
        let regions_found = regions.len();

        let candidates: Vec<Region> = outermost(
            regions
                .into_iter()
                .filter(|r| self.is_candidate(r))
                .collect(),
        )
        .into_iter()
        .map(|mut r| {
            r.fill = measure_fill(gray, &r, self.config.dark_level);
            r
        })
        .collect();

        let questions = layout::assign(&candidates, &self.config);
        let sheet: AnswerSheet = questions
            .iter()
            .filter_map(|q| q.mark.clone().map(|m| (q.number, m)))
            .collect();

        debug!(
            regions = regions_found,
            candidates = candidates.len(),
            questions = questions.len(),
            answered = sheet.len(),
            "bubble detection finished"
        );

        Detection {
            width: gray.width(),
            height: gray.height(),
            regions_found,
            candidates,
            questions,
            sheet,
        }
    }
}
