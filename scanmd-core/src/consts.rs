/// Minimum bounding-box area (model pixels squared) for a block to be kept
/// outright. Blocks below it survive only when they carry enough text.
pub const MIN_AREA: u32 = 5000;

/// Minimum text length (characters) that rescues a small block.
///
/// A block is dropped only when it fails BOTH the area and the text-length
/// test: large empty regions (faint figures) and tiny dense text blocks are
/// both legitimate OCR output.
pub const MIN_TEXT_LEN: usize = 15;

/// Minimum confidence score. Blocks below it are dropped before any other
/// check so a low-confidence block never triggers a merge.
pub const MIN_SCORE: f32 = 0.65;

/// Maximum top-to-top vertical distance (model pixels) between two text
/// blocks that may still belong to the same wrapped paragraph.
pub const MERGE_TOP_GAP: f32 = 50.0;

/// Maximum distance (model pixels) from the previous block's bottom edge to
/// the current block's top edge for a merge.
///
/// Both gap checks are needed: top-to-top alone over-merges stacked blocks,
/// bottom-to-top alone misses same-baseline continuations.
pub const MERGE_BOTTOM_GAP: f32 = 100.0;

/// Canvas size the detection model is assumed to have used when the OCR
/// collaborator does not report one. Overlay scale factors are computed
/// against this.
pub const DEFAULT_CANVAS_WIDTH: u32 = 1024;
pub const DEFAULT_CANVAS_HEIGHT: u32 = 1024;

/// Separator placed between per-page Markdown chunks in the assembled
/// document.
pub const PAGE_SEPARATOR: &str = "\n\n---\n\n";

/// Overlay drawing style defaults.
pub const ANNOTATE_FONT_SIZE: f32 = 32.0;
pub const ANNOTATE_LINE_WIDTH: i32 = 6;
pub const ANNOTATE_FILL_ALPHA: u8 = 50;

/// Pipe characters above this count mark a text as table-like for the
/// correction-mode heuristic.
pub const TABLE_PIPE_THRESHOLD: usize = 5;

/// Texts longer than this with table structure are routed to the thinking
/// correction mode.
pub const TABLE_LONG_TEXT_LEN: usize = 500;

/// Environment variable naming a TrueType font file for overlay labels.
pub const FONT_PATH_ENV_NAME: &str = "SCANMD_FONT_PATH";
