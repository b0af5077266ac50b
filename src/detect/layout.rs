//! Groups bubble candidates into rows and question blocks.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::region::Region;
use crate::config::DetectionConfig;
use crate::model::{Choice, Mark};

/// One question found on a sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub number: u32,
    /// Bubbles left to right; index `i` is choice `i`
    pub bubbles: Vec<Region>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mark: Option<Mark>,
}

fn into_rows(candidates: &[Region], tolerance: f32) -> Vec<Vec<Region>> {
    let mut sorted = candidates.to_vec();
    sorted.sort_by(|a, b| {
        let (ax, ay) = a.center();
        let (bx, by) = b.center();
        ay.total_cmp(&by).then(ax.total_cmp(&bx))
    });

    let mut rows: Vec<(f32, Vec<Region>)> = Vec::new();
    for region in sorted {
        let cy = region.center().1;
        match rows.last_mut() {
            Some((anchor, row)) if cy - *anchor <= tolerance => row.push(region),
            _ => rows.push((cy, vec![region])),
        }
    }

    rows.into_iter()
        .map(|(_, mut row)| {
            row.sort_by_key(|r| r.x);
            row
        })
        .collect()
}

fn into_blocks(row: Vec<Region>, per_question: usize, block_gap: u32) -> Vec<Vec<Region>> {
    let mut blocks = Vec::new();
    let mut current: Vec<Region> = Vec::new();

    for region in row {
        let split = match current.last() {
            Some(prev) => {
                current.len() == per_question || region.x.saturating_sub(prev.right()) > block_gap
            }
            None => false,
        };
        if split {
            blocks.push(std::mem::take(&mut current));
        }
        current.push(region);
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

fn read_mark(bubbles: &[Region], fill_threshold: f32) -> Option<Mark> {
    let marked = bubbles
        .iter()
        .enumerate()
        .filter(|(_, b)| b.fill >= fill_threshold)
        .filter_map(|(i, _)| Choice::from_index(i))
        .collect();
    Mark::from_choices(marked)
}

/// Numbers questions top-to-bottom, left-to-right and reads their marks.
///
/// Blocks with fewer bubbles than `choices_per_question` are discarded.
pub fn assign(candidates: &[Region], config: &DetectionConfig) -> Vec<Question> {
    let mut questions = Vec::new();

    for (row_index, row) in into_rows(candidates, config.row_tolerance as f32)
        .into_iter()
        .enumerate()
    {
        for block in into_blocks(row, config.choices_per_question, config.block_gap) {
            if block.len() < config.choices_per_question {
                debug!(
                    row = row_index,
                    bubbles = block.len(),
                    "discarding incomplete question block"
                );
                continue;
            }

            let number = questions.len() as u32 + 1;
            let mark = read_mark(&block, config.fill_threshold);
            questions.push(Question {
                number,
                bubbles: block,
                mark,
            });
        }
    }

    questions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bubble(x: u32, y: u32, fill: f32) -> Region {
        Region {
            x,
            y,
            width: 10,
            height: 10,
            pixels: 100,
            fill,
        }
    }

    fn row(y: u32, x0: u32, filled: &[usize]) -> Vec<Region> {
        (0..5)
            .map(|i| {
                let fill = if filled.contains(&i) { 0.9 } else { 0.3 };
                bubble(x0 + i as u32 * 16, y, fill)
            })
            .collect()
    }

    #[test]
    fn test_single_column_numbering() {
        let mut candidates = row(40, 20, &[2]);
        candidates.extend(row(16, 20, &[0]));

        let questions = assign(&candidates, &DetectionConfig::default());

        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].number, 1);
        assert_eq!(questions[0].mark, Some(Mark::Single(Choice::A)));
        assert_eq!(questions[1].mark, Some(Mark::Single(Choice::C)));
    }

    #[test]
    fn test_two_columns_share_row() {
        let mut candidates = row(20, 20, &[1]);
        candidates.extend(row(20, 200, &[4]));

        let questions = assign(&candidates, &DetectionConfig::default());

        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].mark, Some(Mark::Single(Choice::B)));
        assert_eq!(questions[1].mark, Some(Mark::Single(Choice::E)));
    }

    #[test]
    fn test_slightly_skewed_row_stays_together() {
        let candidates: Vec<Region> = row(20, 20, &[3])
            .into_iter()
            .enumerate()
            .map(|(i, mut r)| {
                r.y += i as u32;
                r
            })
            .collect();

        let questions = assign(&candidates, &DetectionConfig::default());
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].mark, Some(Mark::Single(Choice::D)));
    }

    #[test]
    fn test_blank_and_multiple_marks() {
        let mut candidates = row(20, 20, &[]);
        candidates.extend(row(44, 20, &[0, 3]));

        let questions = assign(&candidates, &DetectionConfig::default());

        assert_eq!(questions[0].mark, None);
        assert_eq!(
            questions[1].mark,
            Some(Mark::Multiple(vec![Choice::A, Choice::D]))
        );
    }

    #[test]
    fn test_incomplete_block_is_dropped() {
        let mut candidates = row(20, 20, &[1]);
        candidates.push(bubble(400, 20, 0.9));
        candidates.push(bubble(416, 20, 0.9));

        let questions = assign(&candidates, &DetectionConfig::default());
        assert_eq!(questions.len(), 1);
    }

    #[test]
    fn test_adjacent_blocks_split_by_count() {
        // Ten evenly spaced bubbles form two questions even without a gap
        let candidates: Vec<Region> = (0..10).map(|i| bubble(20 + i * 16, 20, 0.3)).collect();

        let questions = assign(&candidates, &DetectionConfig::default());
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[1].bubbles[0].x, 20 + 5 * 16);
    }

    #[test]
    fn test_four_choice_sheets() {
        let config = DetectionConfig {
            choices_per_question: 4,
            ..DetectionConfig::default()
        };
        let candidates: Vec<Region> = (0..4)
            .map(|i| bubble(20 + i * 16, 20, if i == 3 { 0.9 } else { 0.2 }))
            .collect();

        let questions = assign(&candidates, &config);
        assert_eq!(questions[0].mark, Some(Mark::Single(Choice::D)));
    }
}
