use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::analysis::{bbox::Bbox, labels::Label};

/// Canonical geometry of a detected region.
///
/// The detection model reports either an axis-aligned box (4 coordinates) or
/// a quadrilateral (4 corner points, 8 coordinates). Anything else is
/// normalized to "no geometry" at ingestion: such blocks are always kept,
/// never merged, and never drawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    Rect(Bbox),
    Quad([Vec2; 4]),
}

impl Geometry {
    /// Normalizes a flat coordinate list from the OCR collaborator.
    pub fn from_coords(coords: &[f32]) -> Option<Self> {
        match coords.len() {
            4 => Bbox::from_coords(coords).map(Geometry::Rect),
            8 if coords.iter().all(|c| c.is_finite()) => {
                let mut points = [Vec2::ZERO; 4];
                for (point, pair) in points.iter_mut().zip(coords.chunks_exact(2)) {
                    *point = Vec2::new(pair[0], pair[1]);
                }
                Some(Geometry::Quad(points))
            }
            _ => None,
        }
    }

    /// The enclosing axis-aligned box, used for area checks and merging.
    pub fn bounding(&self) -> Bbox {
        match self {
            Geometry::Rect(bbox) => *bbox,
            Geometry::Quad(points) => {
                let min = points.iter().fold(points[0], |acc, p| acc.min(*p));
                let max = points.iter().fold(points[0], |acc, p| acc.max(*p));
                Bbox::new(min, max)
            }
        }
    }

    /// Centroid of the shape: box midpoint, or arithmetic mean of the quad
    /// vertices.
    pub fn centroid(&self) -> Vec2 {
        match self {
            Geometry::Rect(bbox) => bbox.center(),
            Geometry::Quad(points) => points.iter().sum::<Vec2>() / points.len() as f32,
        }
    }
}

/// One detected layout region, as emitted by the OCR collaborator for a page
/// and normalized through [`RawBlock`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockRecord {
    pub label: Label,
    /// Confidence in [0, 1]. Missing scores mean fully confident.
    pub score: f32,
    pub geometry: Option<Geometry>,
    pub content: String,
}

impl BlockRecord {
    pub fn new(label: Label, score: f32, geometry: Option<Geometry>, content: &str) -> Self {
        Self {
            label,
            score,
            geometry,
            content: content.to_string(),
        }
    }

    /// Bounding box of this block's geometry, if any.
    pub fn bounding(&self) -> Option<Bbox> {
        self.geometry.map(|g| g.bounding())
    }

    /// Area of the bounding box; 0 for blocks without geometry.
    pub fn area(&self) -> f32 {
        self.bounding().map(|b| b.area()).unwrap_or(0.0)
    }

    /// Text length in characters (not bytes; the content is frequently
    /// Cyrillic or mixed-script).
    pub fn text_len(&self) -> usize {
        self.content.chars().count()
    }
}

/// Wire-format block as the OCR collaborator serializes it.
///
/// The collaborator is inconsistent about key names across pipeline versions
/// (`block_label` vs `label`, `block_bbox` vs `coordinate`, ...); the serde
/// aliases absorb that here so nothing downstream ever branches on alternate
/// keys.
#[derive(Debug, Deserialize)]
pub struct RawBlock {
    #[serde(alias = "block_label", default)]
    pub label: Label,
    #[serde(alias = "block_score", default)]
    pub score: Option<f32>,
    #[serde(alias = "block_bbox", alias = "coordinate", default)]
    pub bbox: Option<Vec<f32>>,
    #[serde(alias = "block_content", default)]
    pub content: String,
}

impl From<RawBlock> for BlockRecord {
    fn from(raw: RawBlock) -> Self {
        let geometry = raw
            .bbox
            .as_deref()
            .and_then(Geometry::from_coords);

        BlockRecord {
            label: raw.label,
            score: raw.score.unwrap_or(1.0),
            geometry,
            content: raw.content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_from_coords() {
        let rect = Geometry::from_coords(&[0.0, 0.0, 100.0, 20.0]).unwrap();
        assert!(matches!(rect, Geometry::Rect(_)));

        let quad = Geometry::from_coords(&[0.0, 0.0, 10.0, 0.0, 10.0, 10.0, 0.0, 10.0]).unwrap();
        assert!(matches!(quad, Geometry::Quad(_)));

        assert!(Geometry::from_coords(&[1.0, 2.0, 3.0]).is_none());
        assert!(Geometry::from_coords(&[0.0; 6]).is_none());
    }

    #[test]
    fn test_quad_bounding_and_centroid() {
        let quad = Geometry::from_coords(&[10.0, 0.0, 30.0, 5.0, 25.0, 40.0, 5.0, 35.0]).unwrap();
        let bounding = quad.bounding();
        assert_eq!(bounding.min, Vec2::new(5.0, 0.0));
        assert_eq!(bounding.max, Vec2::new(30.0, 40.0));
        assert_eq!(quad.centroid(), Vec2::new(17.5, 20.0));
    }

    #[test]
    fn test_raw_block_alias_normalization() {
        // Newer pipeline key names
        let a: RawBlock = serde_json::from_str(
            r#"{"block_label": "text", "block_score": 0.9,
                "block_bbox": [0, 0, 100, 20], "block_content": "Hello"}"#,
        )
        .unwrap();
        // Older key names for the same record
        let b: RawBlock = serde_json::from_str(
            r#"{"label": "text", "score": 0.9,
                "coordinate": [0, 0, 100, 20], "block_content": "Hello"}"#,
        )
        .unwrap();

        let a = BlockRecord::from(a);
        let b = BlockRecord::from(b);
        assert_eq!(a, b);
        assert_eq!(a.label, Label::Text);
        assert_eq!(a.area(), 2000.0);
    }

    #[test]
    fn test_raw_block_defaults() {
        let raw: RawBlock = serde_json::from_str("{}").unwrap();
        let block = BlockRecord::from(raw);

        assert_eq!(block.label, Label::Unknown);
        assert_eq!(block.score, 1.0);
        assert!(block.geometry.is_none());
        assert!(block.content.is_empty());
    }

    #[test]
    fn test_raw_block_null_score_defaults_to_confident() {
        let raw: RawBlock =
            serde_json::from_str(r#"{"label": "table", "score": null}"#).unwrap();
        let block = BlockRecord::from(raw);
        assert_eq!(block.score, 1.0);
    }

    #[test]
    fn test_malformed_bbox_is_no_geometry() {
        let raw: RawBlock =
            serde_json::from_str(r#"{"label": "text", "coordinate": [1.0, 2.0]}"#).unwrap();
        let block = BlockRecord::from(raw);
        assert!(block.geometry.is_none());
        assert_eq!(block.area(), 0.0);
    }
}
