use tracing::debug;

use crate::consts::PAGE_SEPARATOR;
use crate::layout::page::Page;

/// Markdown and counters aggregated over a whole document. The caller wraps
/// this in a [`crate::layout::page::DocumentResult`] together with the
/// elapsed time it measured around the OCR call and assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assembly {
    pub markdown: String,
    pub pages: usize,
    pub images: usize,
    pub formulas: usize,
}

/// Folds per-page results into one ordered Markdown document.
///
/// Each page with Markdown is prefixed by a `<!-- Page N -->` marker
/// (1-based) and the non-empty chunks are joined with a horizontal rule.
/// Pages without Markdown still count toward the page total. Extracted
/// images and detected formulas are summed as-is.
pub fn assemble(pages: &[Page]) -> Assembly {
    let mut chunks = Vec::new();
    let mut images = 0;
    let mut formulas = 0;

    for (idx, page) in pages.iter().enumerate() {
        if let Some(markdown) = &page.markdown {
            let trimmed = markdown.trim();
            if !trimmed.is_empty() {
                chunks.push(format!("<!-- Page {} -->\n\n{}", idx + 1, trimmed));
            }
        }

        images += page.images.len();
        formulas += page.formula_count;
    }

    debug!(
        "assembled {} pages into {} markdown chunks",
        pages.len(),
        chunks.len()
    );

    Assembly {
        markdown: chunks.join(PAGE_SEPARATOR),
        pages: pages.len(),
        images,
        formulas,
    }
}
