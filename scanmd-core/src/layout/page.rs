use std::collections::HashMap;
use std::time::Duration;

use glam::Vec2;
use image::DynamicImage;

use crate::layout::element::BlockRecord;

/// One physical page as produced by the OCR collaborator: the raw block
/// sequence in reading order, the page's rendered Markdown, and optional
/// raster material for overlay annotation.
pub struct Page {
    pub page_no: usize,
    pub blocks: Vec<BlockRecord>,
    pub markdown: Option<String>,
    /// Rasterized page image for the annotation overlay path.
    pub raster: Option<DynamicImage>,
    /// Pixel size of the canvas the detection model worked in. `None` means
    /// the collaborator did not report one; the default 1024x1024 applies.
    pub canvas_size: Option<Vec2>,
    /// Extracted figures keyed by the relative path the Markdown references.
    pub images: HashMap<String, DynamicImage>,
    pub formula_count: usize,
}

impl Page {
    pub fn new(page_no: usize) -> Self {
        Self {
            page_no,
            blocks: Vec::new(),
            markdown: None,
            raster: None,
            canvas_size: None,
            images: HashMap::new(),
            formula_count: 0,
        }
    }
}

/// Aggregate outcome of converting one document.
#[derive(Debug, Clone)]
pub struct DocumentResult {
    pub markdown: String,
    pub pages: usize,
    pub images: usize,
    pub formulas: usize,
    pub elapsed: Duration,
}
