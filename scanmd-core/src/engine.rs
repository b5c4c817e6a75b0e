use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use glam::Vec2;
use serde::Deserialize;
use snafu::ResultExt;
use tracing::{debug, info};

use crate::error::{ImageReadSnafu, IoReadSnafu, ScanmdError, SidecarSnafu};
use crate::layout::element::{BlockRecord, RawBlock};
use crate::layout::page::Page;

/// The OCR/layout-detection collaborator. Given a document, it yields one
/// [`Page`] per physical page with the raw block sequence, the page's
/// Markdown rendition, and optional raster material.
///
/// The engine handle is constructed once by the caller and injected into
/// every per-document call; no global model state lives in this crate.
pub trait OcrEngine: Send + Sync {
    fn process(&self, document: &Path) -> Result<Vec<Page>, ScanmdError>;
}

/// Wire format of one page in a sidecar dump, as the external pipeline
/// serializes its per-page result object.
#[derive(Debug, Deserialize)]
struct RawPage {
    #[serde(alias = "parsing_res_list", default)]
    blocks: Vec<RawBlock>,
    #[serde(alias = "markdown_texts", default)]
    markdown: Option<String>,
    #[serde(default)]
    width: Option<f32>,
    #[serde(default)]
    height: Option<f32>,
    #[serde(alias = "formula_count", default)]
    formulas: usize,
    /// Extracted figures: Markdown-relative path -> image file on disk,
    /// resolved against the sidecar's directory.
    #[serde(alias = "markdown_images", default)]
    images: HashMap<String, PathBuf>,
    /// Rasterized page image for annotation overlays.
    #[serde(default)]
    raster: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    pages: Vec<RawPage>,
}

/// An [`OcrEngine`] that reads a precomputed sidecar dump: for a document
/// `report.pdf` it loads `report.json` next to it, written by the external
/// model pipeline. This keeps the model itself out of process while
/// exercising the same ingestion boundary.
pub struct SidecarEngine;

impl SidecarEngine {
    fn load_page(&self, raw: RawPage, dir: &Path, page_no: usize) -> Result<Page, ScanmdError> {
        let mut page = Page::new(page_no);

        page.canvas_size = match (raw.width, raw.height) {
            (Some(w), Some(h)) => Some(Vec2::new(w, h)),
            _ => None,
        };
        page.blocks = raw.blocks.into_iter().map(BlockRecord::from).collect();
        page.markdown = raw.markdown;
        page.formula_count = raw.formulas;

        for (rel_path, file) in raw.images {
            let file = dir.join(&file);
            let image = image::open(&file).context(ImageReadSnafu {
                path: file.to_string_lossy(),
            })?;
            page.images.insert(rel_path, image);
        }

        if let Some(raster) = raw.raster {
            let file = dir.join(&raster);
            let image = image::open(&file).context(ImageReadSnafu {
                path: file.to_string_lossy(),
            })?;
            page.raster = Some(image);
        }

        Ok(page)
    }
}

impl OcrEngine for SidecarEngine {
    fn process(&self, document: &Path) -> Result<Vec<Page>, ScanmdError> {
        let sidecar = document.with_extension("json");
        info!("loading sidecar dump: {}", sidecar.display());

        let data = fs::read_to_string(&sidecar).context(IoReadSnafu {
            path: sidecar.to_string_lossy(),
        })?;
        let raw: RawDocument = serde_json::from_str(&data).context(SidecarSnafu {
            path: sidecar.to_string_lossy(),
        })?;

        let dir = sidecar.parent().unwrap_or(Path::new(".")).to_path_buf();

        let pages = raw
            .pages
            .into_iter()
            .enumerate()
            .map(|(page_no, raw_page)| self.load_page(raw_page, &dir, page_no))
            .collect::<Result<Vec<_>, _>>()?;

        debug!("sidecar produced {} pages", pages.len());
        Ok(pages)
    }
}
