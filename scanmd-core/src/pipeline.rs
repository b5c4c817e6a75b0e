use std::fs;
use std::path::Path;
use std::time::Instant;

use snafu::{ResultExt, ensure};
use tracing::{debug, info, warn};

use crate::annotate::{AnnotateStyle, annotate_markdown, annotate_page_image, overlay_scale};
use crate::assemble::assemble;
use crate::config::ScanmdConfig;
use crate::correct::{TextCorrector, correct_text};
use crate::engine::OcrEngine;
use crate::error::{ImageWriteSnafu, IoWriteSnafu, NotFoundSnafu, ScanmdError};
use crate::filter::filter_and_merge;
use crate::layout::page::{DocumentResult, Page};

/// One document's journey: OCR via the injected engine, block filtering,
/// annotation, asset export, page assembly, optional text correction.
///
/// The pipeline owns no model state; the engine handle and the corrector
/// are both supplied by the caller, so two pipelines can share one engine.
pub struct Pipeline {
    engine: Box<dyn OcrEngine>,
    corrector: Option<Box<dyn TextCorrector>>,
    config: ScanmdConfig,
    style: AnnotateStyle,
}

impl Pipeline {
    pub fn new(engine: Box<dyn OcrEngine>, config: ScanmdConfig) -> Self {
        Self {
            engine,
            corrector: None,
            config,
            style: AnnotateStyle::default(),
        }
    }

    pub fn with_corrector(mut self, corrector: Box<dyn TextCorrector>) -> Self {
        self.corrector = Some(corrector);
        self
    }

    pub fn with_style(mut self, style: AnnotateStyle) -> Self {
        self.style = style;
        self
    }

    /// Runs the full per-document pipeline and writes page assets under
    /// `out_dir`. The assembled Markdown is returned, not written; format
    /// rendering is the caller's concern.
    pub fn process_document(
        &self,
        document: &Path,
        out_dir: &Path,
    ) -> Result<DocumentResult, ScanmdError> {
        ensure!(
            document.exists(),
            NotFoundSnafu {
                path: document.to_string_lossy(),
            }
        );

        let stem = document
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());

        info!("processing document: {}", document.display());
        let start = Instant::now();

        let mut pages = self.engine.process(document)?;

        for page in &mut pages {
            let kept = filter_and_merge(&page.blocks, &self.config.filter);
            debug!(
                "page {}: {} blocks kept of {}",
                page.page_no + 1,
                kept.len(),
                page.blocks.len()
            );

            if let Some(markdown) = page.markdown.take() {
                page.markdown = Some(annotate_markdown(&markdown, &kept, &self.config.annotate));
            }

            if self.config.output.extracted_images && !page.images.is_empty() {
                self.save_extracted_images(page, &stem, out_dir)?;
            }

            if self.config.output.annotated_images {
                if let Some(raster) = &page.raster {
                    let (scale_x, scale_y) = overlay_scale(raster, page.canvas_size);
                    let annotated =
                        annotate_page_image(raster, &kept, scale_x, scale_y, &self.style);
                    let dir = out_dir.join("annotated");
                    fs::create_dir_all(&dir).context(IoWriteSnafu {
                        path: dir.to_string_lossy(),
                    })?;
                    let file = dir.join(format!("{}_p{}_ann.jpg", stem, page.page_no + 1));
                    annotated.save(&file).context(ImageWriteSnafu {
                        path: file.to_string_lossy(),
                    })?;
                }
            }

            page.blocks = kept;
        }

        let assembly = assemble(&pages);
        let markdown = self.correct(assembly.markdown)?;
        let elapsed = start.elapsed();

        info!(
            "document done: {} pages, {} images, {} formulas in {:.2}s",
            assembly.pages,
            assembly.images,
            assembly.formulas,
            elapsed.as_secs_f64()
        );

        Ok(DocumentResult {
            markdown,
            pages: assembly.pages,
            images: assembly.images,
            formulas: assembly.formulas,
            elapsed,
        })
    }

    fn save_extracted_images(
        &self,
        page: &Page,
        stem: &str,
        out_dir: &Path,
    ) -> Result<(), ScanmdError> {
        for (rel_path, image) in &page.images {
            let file = out_dir.join("images").join(stem).join(rel_path);
            if let Some(parent) = file.parent() {
                fs::create_dir_all(parent).context(IoWriteSnafu {
                    path: parent.to_string_lossy(),
                })?;
            }
            image.save(&file).context(ImageWriteSnafu {
                path: file.to_string_lossy(),
            })?;
        }
        Ok(())
    }

    fn correct(&self, markdown: String) -> Result<String, ScanmdError> {
        if self.config.correction.disabled {
            return Ok(markdown);
        }
        let Some(corrector) = &self.corrector else {
            return Ok(markdown);
        };
        match correct_text(corrector.as_ref(), &markdown, self.config.correction.mode) {
            Ok(corrected) => Ok(corrected),
            Err(err) => {
                // Correction is best-effort; the uncorrected text is still a
                // valid result.
                warn!("correction failed, keeping raw text: {}", err);
                Ok(markdown)
            }
        }
    }
}
