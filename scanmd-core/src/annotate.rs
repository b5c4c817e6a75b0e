use ab_glyph::{FontVec, PxScale};
use glam::Vec2;
use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage, imageops};
use imageproc::drawing::{
    draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut, draw_polygon_mut,
    draw_text_mut, text_size,
};
use imageproc::point::Point;
use imageproc::rect::Rect;
use serde::{Deserialize, Serialize};
use snafu::ResultExt;
use tracing::debug;

use crate::consts::*;
use crate::error::{FontSnafu, ScanmdError};
use crate::layout::element::{BlockRecord, Geometry};

/// Controls the Markdown annotation path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotateConfig {
    /// When true, only structurally significant lines (headings, image
    /// references, table rows, code fences) receive an annotation comment;
    /// otherwise every non-empty, non-comment line qualifies.
    pub only_major: bool,
}

impl Default for AnnotateConfig {
    fn default() -> Self {
        Self { only_major: true }
    }
}

/// Walks the Markdown line by line and appends `<!-- ann: <n> | <label> -->`
/// after each structurally significant line, consuming the filtered block
/// sequence in order.
///
/// This is a best-effort positional correlation: the block order is assumed
/// to match the Markdown's linear reading order. The cursor never rewinds;
/// when blocks run out, remaining qualifying lines stay unannotated, and
/// trailing blocks are silently unused. Annotation is a one-time
/// transformation; running it again over its own output is not idempotent.
pub fn annotate_markdown(
    markdown: &str,
    blocks: &[BlockRecord],
    config: &AnnotateConfig,
) -> String {
    let mut out = Vec::new();
    let mut cursor = blocks.iter();
    let mut counter = 0usize;

    for line in markdown.lines() {
        out.push(line.to_string());

        let stripped = line.trim();
        let qualifies = if config.only_major {
            stripped.starts_with('#')
                || stripped.starts_with("![")
                || stripped.starts_with('|')
                || stripped.contains("```")
        } else {
            !stripped.is_empty() && !stripped.starts_with("<!--")
        };

        if qualifies {
            if let Some(block) = cursor.next() {
                counter += 1;
                out.push(format!("<!-- ann: {} | {} -->", counter, block.label.name()));
            }
        }
    }

    out.join("\n")
}

/// Drawing style for the page-image overlay.
///
/// The label text needs a TrueType font; without one only the shapes are
/// drawn.
pub struct AnnotateStyle {
    pub font: Option<FontVec>,
    pub font_size: f32,
    pub line_width: i32,
    pub fill_alpha: u8,
}

impl Default for AnnotateStyle {
    fn default() -> Self {
        Self {
            font: None,
            font_size: ANNOTATE_FONT_SIZE,
            line_width: ANNOTATE_LINE_WIDTH,
            fill_alpha: ANNOTATE_FILL_ALPHA,
        }
    }
}

impl AnnotateStyle {
    pub fn with_font(font_data: Vec<u8>) -> Result<Self, ScanmdError> {
        let font = FontVec::try_from_vec(font_data).context(FontSnafu)?;
        Ok(Self {
            font: Some(font),
            ..Self::default()
        })
    }
}

/// Draws the filtered blocks onto a copy of the rasterized page.
///
/// Coordinates are scaled from model space into raster space (`scale_x` for
/// x, `scale_y` for y). Each block gets a translucent fill, an opaque
/// outline in its label color, and a centered `"<n> <label>"` tag on an
/// opaque patch. Numbering follows the input index: blocks without
/// canonical geometry are not drawn but still advance the number.
pub fn annotate_page_image(
    raster: &DynamicImage,
    blocks: &[BlockRecord],
    scale_x: f32,
    scale_y: f32,
    style: &AnnotateStyle,
) -> RgbImage {
    // Translucent fills go onto a transparent overlay first and are alpha
    // blended in one pass, so overlapping blocks do not stack to opacity.
    let mut fills = RgbaImage::new(raster.width(), raster.height());
    for block in blocks {
        let Some(geometry) = block.geometry else {
            continue;
        };
        let [r, g, b] = block.label.color();
        let fill = Rgba([r, g, b, style.fill_alpha]);
        match scaled(geometry, scale_x, scale_y) {
            Geometry::Rect(bbox) => {
                if let Some(rect) = to_rect(bbox.min, bbox.max) {
                    draw_filled_rect_mut(&mut fills, rect, fill);
                }
            }
            Geometry::Quad(points) => {
                let polygon: Vec<Point<i32>> = points
                    .iter()
                    .map(|p| Point::new(p.x as i32, p.y as i32))
                    .collect();
                if polygon.first() != polygon.last() {
                    draw_polygon_mut(&mut fills, &polygon, fill);
                }
            }
        }
    }

    let mut composed = raster.to_rgba8();
    imageops::overlay(&mut composed, &fills, 0, 0);
    let mut base = DynamicImage::ImageRgba8(composed).to_rgb8();

    // Outlines and labels are opaque and go straight onto the base.
    for (idx, block) in blocks.iter().enumerate() {
        let Some(geometry) = block.geometry else {
            debug!("block {} has no drawable geometry, skipping", idx + 1);
            continue;
        };
        let geometry = scaled(geometry, scale_x, scale_y);
        let color = Rgb(block.label.color());

        match geometry {
            Geometry::Rect(bbox) => draw_thick_rect(&mut base, bbox.min, bbox.max, color, style),
            Geometry::Quad(points) => draw_thick_quad(&mut base, &points, color, style),
        }

        if let Some(font) = &style.font {
            let tag = format!("{} {}", idx + 1, block.label.name());
            draw_centered_tag(&mut base, geometry.centroid(), &tag, font, style);
        }
    }

    base
}

/// Derives the model-to-raster scale factors from the raster size and the
/// canvas size the collaborator reported, defaulting to 1024x1024.
pub fn overlay_scale(raster: &DynamicImage, canvas_size: Option<Vec2>) -> (f32, f32) {
    let canvas = canvas_size.unwrap_or(Vec2::new(
        DEFAULT_CANVAS_WIDTH as f32,
        DEFAULT_CANVAS_HEIGHT as f32,
    ));
    (
        raster.width() as f32 / canvas.x,
        raster.height() as f32 / canvas.y,
    )
}

fn scaled(geometry: Geometry, sx: f32, sy: f32) -> Geometry {
    match geometry {
        Geometry::Rect(bbox) => Geometry::Rect(bbox.scale(sx, sy)),
        Geometry::Quad(points) => {
            Geometry::Quad(points.map(|p| Vec2::new(p.x * sx, p.y * sy)))
        }
    }
}

fn to_rect(min: Vec2, max: Vec2) -> Option<Rect> {
    let width = (max.x - min.x) as u32;
    let height = (max.y - min.y) as u32;
    if width == 0 || height == 0 {
        return None;
    }
    Some(Rect::at(min.x as i32, min.y as i32).of_size(width, height))
}

fn draw_thick_rect(img: &mut RgbImage, min: Vec2, max: Vec2, color: Rgb<u8>, style: &AnnotateStyle) {
    // Nested hollow rects fake a stroke width imageproc does not offer.
    for offset in 0..style.line_width {
        let min = min - Vec2::splat(offset as f32);
        let max = max + Vec2::splat(offset as f32);
        if let Some(rect) = to_rect(min, max) {
            draw_hollow_rect_mut(img, rect, color);
        }
    }
}

fn draw_thick_quad(img: &mut RgbImage, points: &[Vec2; 4], color: Rgb<u8>, style: &AnnotateStyle) {
    for offset in 0..style.line_width {
        let shift = offset as f32;
        for i in 0..4 {
            let a = points[i];
            let b = points[(i + 1) % 4];
            draw_line_segment_mut(img, (a.x + shift, a.y), (b.x + shift, b.y), color);
            draw_line_segment_mut(img, (a.x, a.y + shift), (b.x, b.y + shift), color);
        }
    }
}

fn draw_centered_tag(
    img: &mut RgbImage,
    center: Vec2,
    tag: &str,
    font: &FontVec,
    style: &AnnotateStyle,
) {
    let scale = PxScale::from(style.font_size);
    let (tw, th) = text_size(scale, font, tag);

    let tx = center.x as i32 - tw as i32 / 2;
    let ty = center.y as i32 - th as i32 / 2;

    // Opaque backdrop keeps the tag readable over any fill color.
    if let Some(rect) = to_rect(
        Vec2::new((tx - 12) as f32, (ty - 10) as f32),
        Vec2::new((tx + tw as i32 + 12) as f32, (ty + th as i32 + 10) as f32),
    ) {
        draw_filled_rect_mut(img, rect, Rgb([0, 0, 0]));
    }
    draw_text_mut(img, Rgb([255, 255, 255]), tx, ty, scale, font, tag);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::labels::Label;

    fn block(label: Label, coords: &[f32]) -> BlockRecord {
        BlockRecord::new(label, 0.9, Geometry::from_coords(coords), "")
    }

    #[test]
    fn test_annotate_only_major_lines() {
        let md = "# Title\n\nSome paragraph.\n\n![figure](imgs/fig.png)\n\n| a | b |\n";
        let blocks = vec![
            block(Label::DocTitle, &[0.0, 0.0, 500.0, 60.0]),
            block(Label::Image, &[0.0, 100.0, 400.0, 400.0]),
            block(Label::Table, &[0.0, 420.0, 400.0, 520.0]),
        ];

        let out = annotate_markdown(md, &blocks, &AnnotateConfig { only_major: true });
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines[0], "# Title");
        assert_eq!(lines[1], "<!-- ann: 1 | doc_title -->");
        // The plain paragraph is preserved but not annotated
        assert!(lines.contains(&"Some paragraph."));
        assert!(out.contains("<!-- ann: 2 | image -->"));
        assert!(out.contains("<!-- ann: 3 | table -->"));
    }

    #[test]
    fn test_annotate_all_lines_mode() {
        let md = "# Title\n\nParagraph one.\nParagraph two.";
        let blocks = vec![
            block(Label::DocTitle, &[0.0, 0.0, 500.0, 60.0]),
            block(Label::Text, &[0.0, 80.0, 500.0, 120.0]),
        ];

        let out = annotate_markdown(md, &blocks, &AnnotateConfig { only_major: false });

        assert!(out.contains("# Title\n<!-- ann: 1 | doc_title -->"));
        assert!(out.contains("Paragraph one.\n<!-- ann: 2 | text -->"));
        // Blocks exhausted: the last qualifying line gets nothing.
        assert!(!out.contains("ann: 3"));
    }

    #[test]
    fn test_annotation_numbering_is_monotonic_and_bounded() {
        let md = "# A\n# B\n# C\n# D";
        let blocks = vec![
            block(Label::ParagraphTitle, &[0.0, 0.0, 100.0, 20.0]),
            block(Label::ParagraphTitle, &[0.0, 30.0, 100.0, 50.0]),
        ];

        let out = annotate_markdown(md, &blocks, &AnnotateConfig::default());
        let count = out.matches("<!-- ann:").count();
        assert_eq!(count, blocks.len());
        assert!(out.contains("ann: 1 |"));
        assert!(out.contains("ann: 2 |"));
    }

    #[test]
    fn test_existing_comments_do_not_consume_blocks() {
        let md = "<!-- Page 1 -->\n\nBody text here.";
        let blocks = vec![block(Label::Text, &[0.0, 0.0, 100.0, 20.0])];

        let out = annotate_markdown(md, &blocks, &AnnotateConfig { only_major: false });
        assert!(out.contains("Body text here.\n<!-- ann: 1 | text -->"));
        assert_eq!(out.matches("<!-- ann:").count(), 1);
    }

    #[test]
    fn test_image_overlay_draws_shapes() {
        let raster = DynamicImage::new_rgb8(200, 200);
        let blocks = vec![
            block(Label::Text, &[10.0, 10.0, 90.0, 50.0]),
            // Quad region
            block(
                Label::Formula,
                &[100.0, 100.0, 180.0, 110.0, 175.0, 160.0, 95.0, 150.0],
            ),
            // No geometry: skipped, numbering unaffected
            BlockRecord::new(Label::Unknown, 0.9, None, ""),
        ];

        let out = annotate_page_image(&raster, &blocks, 1.0, 1.0, &AnnotateStyle::default());
        assert_eq!((out.width(), out.height()), (200, 200));

        // The text outline color must appear somewhere along the rect border.
        let outline = Rgb(Label::Text.color());
        assert_eq!(*out.get_pixel(10, 10), outline);
        // Pixels far from any block stay black.
        assert_eq!(*out.get_pixel(199, 0), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_overlay_scale_defaults_to_1024_canvas() {
        let raster = DynamicImage::new_rgb8(2048, 512);
        let (sx, sy) = overlay_scale(&raster, None);
        assert_eq!(sx, 2.0);
        assert_eq!(sy, 0.5);

        let (sx, sy) = overlay_scale(&raster, Some(Vec2::new(1024.0, 1024.0)));
        assert_eq!(sx, 2.0);
        assert_eq!(sy, 0.5);
    }
}
