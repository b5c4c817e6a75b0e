use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::consts::*;
use crate::layout::element::{BlockRecord, Geometry};

/// Thresholds for dropping noise blocks and merging wrapped paragraphs.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[serde(default)]
#[builder(default)]
pub struct FilterConfig {
    /// Minimum bounding-box area (model pixels squared) to keep a block
    /// outright.
    pub min_area: u32,
    /// Minimum text length (characters) that rescues a block smaller than
    /// `min_area`.
    pub min_text_len: usize,
    /// Blocks scoring strictly below this are dropped before any other
    /// check.
    pub min_score: f32,
    /// When set, two prose blocks only merge if their x-ranges overlap.
    /// Off by default: the detector's reading order is usually trustworthy,
    /// but side-by-side columns at the same vertical band can be merged
    /// incorrectly without this guard.
    pub column_aware: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_area: MIN_AREA,
            min_text_len: MIN_TEXT_LEN,
            min_score: MIN_SCORE,
            column_aware: false,
        }
    }
}

/// Filters low-confidence and low-value blocks out of a page's detection
/// sequence and merges adjacent prose blocks into single paragraphs.
///
/// Single left-to-right pass; the output is a stable subsequence/merge of
/// the input order and never longer than the input. The input is not
/// mutated; a merge replaces the last output entry with a freshly built
/// record.
pub fn filter_and_merge(blocks: &[BlockRecord], config: &FilterConfig) -> Vec<BlockRecord> {
    let mut kept: Vec<BlockRecord> = Vec::new();

    for block in blocks {
        // Confidence gate comes first: a low-confidence block must never
        // consume a merge slot.
        if block.score < config.min_score {
            continue;
        }

        // A block is noise only when it is simultaneously small and sparse.
        // Blocks without geometry are always kept.
        if block.geometry.is_some()
            && block.area() < config.min_area as f32
            && block.text_len() < config.min_text_len
        {
            continue;
        }

        match try_merge(kept.last(), block, config) {
            Some(merged) => {
                if let Some(last) = kept.last_mut() {
                    *last = merged;
                }
            }
            None => kept.push(block.clone()),
        }
    }

    debug!("filtered {} -> {} blocks", blocks.len(), kept.len());
    kept
}

/// Builds the merged record if `block` continues the paragraph started by
/// the previous kept block.
fn try_merge(
    prev: Option<&BlockRecord>,
    block: &BlockRecord,
    config: &FilterConfig,
) -> Option<BlockRecord> {
    let prev = prev?;
    if !prev.label.is_prose() || !block.label.is_prose() {
        return None;
    }

    let prev_box = prev.bounding()?;
    let cur_box = block.bounding()?;

    // Two independent vertical checks: top-to-top catches same-baseline
    // continuations, bottom-of-prev-to-top-of-cur catches stacked blocks
    // with a small gap.
    let same_band = (prev_box.min.y - cur_box.min.y).abs() < MERGE_TOP_GAP;
    let small_gap = (prev_box.max.y - cur_box.min.y).abs() < MERGE_BOTTOM_GAP;
    if !same_band || !small_gap {
        return None;
    }

    if config.column_aware && !prev_box.overlaps_horizontally(&cur_box) {
        return None;
    }

    let content = format!("{} {}", prev.content, block.content)
        .trim()
        .to_string();

    Some(BlockRecord {
        label: prev.label,
        score: prev.score,
        geometry: Some(Geometry::Rect(prev_box.union(&cur_box))),
        content,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::labels::Label;

    fn block(label: Label, score: f32, coords: &[f32], content: &str) -> BlockRecord {
        BlockRecord::new(label, score, Geometry::from_coords(coords), content)
    }

    #[test]
    fn test_adjacent_text_blocks_merge() {
        let blocks = vec![
            block(Label::Text, 0.9, &[0.0, 0.0, 100.0, 20.0], "Hello"),
            block(Label::Text, 0.9, &[0.0, 25.0, 100.0, 45.0], "world"),
        ];

        let out = filter_and_merge(&blocks, &FilterConfig::default());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].content, "Hello world");
        assert_eq!(
            out[0].bounding().unwrap(),
            crate::analysis::bbox::Bbox::from_coords(&[0.0, 0.0, 100.0, 45.0]).unwrap()
        );
    }

    #[test]
    fn test_small_empty_image_block_dropped() {
        let blocks = vec![block(Label::Image, 0.8, &[0.0, 0.0, 50.0, 50.0], "")];
        // area 2500 < 5000 and text length 0 < 15
        assert!(filter_and_merge(&blocks, &FilterConfig::default()).is_empty());
    }

    #[test]
    fn test_low_score_dropped_regardless_of_area() {
        let blocks = vec![block(Label::Table, 0.5, &[0.0, 0.0, 1000.0, 1000.0], "")];
        assert!(filter_and_merge(&blocks, &FilterConfig::default()).is_empty());
    }

    #[test]
    fn test_large_block_kept_without_text() {
        let blocks = vec![block(Label::Image, 0.9, &[0.0, 0.0, 200.0, 100.0], "")];
        // area 20000 >= 5000, empty content does not matter
        assert_eq!(filter_and_merge(&blocks, &FilterConfig::default()).len(), 1);
    }

    #[test]
    fn test_long_text_rescues_tiny_block() {
        let blocks = vec![block(
            Label::Text,
            0.9,
            &[0.0, 0.0, 10.0, 10.0],
            "a block with plenty of ocr text",
        )];
        assert_eq!(filter_and_merge(&blocks, &FilterConfig::default()).len(), 1);
    }

    #[test]
    fn test_block_without_geometry_always_kept() {
        let blocks = vec![BlockRecord::new(Label::Text, 0.9, None, "x")];
        let out = filter_and_merge(&blocks, &FilterConfig::default());
        assert_eq!(out.len(), 1);

        // and it never participates in a merge
        let blocks = vec![
            BlockRecord::new(Label::Text, 0.9, None, "first"),
            block(Label::Text, 0.9, &[0.0, 0.0, 100.0, 40.0], "second block text"),
        ];
        let out = filter_and_merge(&blocks, &FilterConfig::default());
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_contiguous_run_collapses_to_one() {
        let blocks = vec![
            block(Label::Text, 0.9, &[0.0, 0.0, 100.0, 18.0], "one"),
            block(Label::Paragraph, 0.9, &[0.0, 20.0, 100.0, 38.0], "two"),
            block(Label::Text, 0.9, &[0.0, 40.0, 100.0, 58.0], "three"),
        ];

        let out = filter_and_merge(&blocks, &FilterConfig::default());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].content, "one two three");
        assert_eq!(
            out[0].bounding().unwrap(),
            crate::analysis::bbox::Bbox::from_coords(&[0.0, 0.0, 100.0, 58.0]).unwrap()
        );
    }

    #[test]
    fn test_distant_blocks_do_not_merge() {
        let blocks = vec![
            block(Label::Text, 0.9, &[0.0, 0.0, 100.0, 20.0], "top of the page text"),
            block(Label::Text, 0.9, &[0.0, 400.0, 100.0, 420.0], "bottom of the page"),
        ];
        assert_eq!(filter_and_merge(&blocks, &FilterConfig::default()).len(), 2);
    }

    #[test]
    fn test_non_prose_labels_do_not_merge() {
        let blocks = vec![
            block(Label::Table, 0.9, &[0.0, 0.0, 300.0, 40.0], "| a | b |"),
            block(Label::Text, 0.9, &[0.0, 45.0, 300.0, 80.0], "caption under the table"),
        ];
        assert_eq!(filter_and_merge(&blocks, &FilterConfig::default()).len(), 2);
    }

    #[test]
    fn test_low_score_block_never_bridges_a_merge() {
        // The middle block is dropped by the confidence gate; the outer two
        // are close enough through it but not to each other.
        let blocks = vec![
            block(Label::Text, 0.9, &[0.0, 0.0, 100.0, 20.0], "first part of text"),
            block(Label::Text, 0.2, &[0.0, 30.0, 100.0, 60.0], "noise"),
            block(Label::Text, 0.9, &[0.0, 70.0, 100.0, 90.0], "second part of text"),
        ];

        let out = filter_and_merge(&blocks, &FilterConfig::default());
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|b| !b.content.contains("noise")));
    }

    #[test]
    fn test_column_aware_blocks_side_by_side_merge() {
        let columns = vec![
            block(Label::Text, 0.9, &[0.0, 0.0, 200.0, 40.0], "left column paragraph"),
            block(Label::Text, 0.9, &[220.0, 5.0, 420.0, 45.0], "right column paragraph"),
        ];

        // Default behavior follows the detector order and merges them.
        let merged = filter_and_merge(&columns, &FilterConfig::default());
        assert_eq!(merged.len(), 1);

        let config = FilterConfigBuilder::default()
            .column_aware(true)
            .build()
            .unwrap();
        let out = filter_and_merge(&columns, &config);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_output_never_longer_than_input() {
        let blocks = vec![
            block(Label::DocTitle, 0.95, &[0.0, 0.0, 500.0, 60.0], "Title"),
            block(Label::Text, 0.9, &[0.0, 80.0, 500.0, 120.0], "first paragraph of text"),
            block(Label::Text, 0.3, &[0.0, 130.0, 500.0, 150.0], "low confidence"),
            block(Label::Image, 0.8, &[0.0, 160.0, 30.0, 180.0], ""),
        ];

        let out = filter_and_merge(&blocks, &FilterConfig::default());
        assert!(out.len() <= blocks.len());
        assert!(out.iter().all(|b| b.score >= MIN_SCORE));
    }
}
