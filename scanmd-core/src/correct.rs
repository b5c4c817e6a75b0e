use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::consts::{TABLE_LONG_TEXT_LEN, TABLE_PIPE_THRESHOLD};
use crate::error::ScanmdError;

/// How the text-correction collaborator should be driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CorrectionMode {
    /// Inspect the text and pick a strategy; low-complexity text skips the
    /// LLM entirely.
    Auto,
    Thinking,
    NonThinking,
}

impl Default for CorrectionMode {
    fn default() -> Self {
        CorrectionMode::Auto
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Complexity {
    Low,
    Medium,
    High,
}

/// The external LLM corrector, a black-box string-to-string transformer.
/// Implementations talk to whatever model backend the caller wires in.
pub trait TextCorrector: Send + Sync {
    fn correct(
        &self,
        text: &str,
        mode: CorrectionMode,
        temperature: f32,
    ) -> Result<String, ScanmdError>;
}

/// Scores a text for correction difficulty.
///
/// Formula markers and long pipe tables need careful, slow correction;
/// mixed Cyrillic/Latin content and short tables a faster pass; everything
/// else gets by with whitespace cleanup.
pub fn analyze_complexity(text: &str) -> Complexity {
    let has_formulas = ["$$", "\\(", "\\[", "\\begin"]
        .iter()
        .any(|marker| text.contains(marker));

    let has_tables = text.matches('|').count() > TABLE_PIPE_THRESHOLD;

    let has_cyrillic = text.chars().any(|c| ('\u{0400}'..='\u{04FF}').contains(&c));
    let has_latin = text.chars().any(|c| c.is_ascii_alphabetic());
    let is_mixed = has_cyrillic && has_latin;

    if has_formulas || (has_tables && text.chars().count() > TABLE_LONG_TEXT_LEN) {
        Complexity::High
    } else if is_mixed || has_tables {
        Complexity::Medium
    } else {
        Complexity::Low
    }
}

/// Whitespace and punctuation cleanup for text too simple to warrant an LLM
/// round trip. Mojibake repair first, then the common OCR spacing mistakes.
pub fn basic_cleanup(text: &str) -> String {
    let text = plsfix::fix_text(text, None);
    let mut text = text.split_whitespace().collect::<Vec<_>>().join(" ");

    for (broken, fixed) in [(" ,", ","), (" .", "."), (" :", ":"), ("( ", "("), (" )", ")")] {
        text = text.replace(broken, fixed);
    }

    text
}

/// Routes a text through the corrector according to `mode`.
///
/// Auto mode maps [`Complexity::High`] to the thinking strategy at a low
/// temperature, [`Complexity::Medium`] to the fast strategy, and
/// [`Complexity::Low`] to [`basic_cleanup`] without touching the LLM.
/// Empty or whitespace-only input is returned unchanged.
pub fn correct_text(
    corrector: &dyn TextCorrector,
    text: &str,
    mode: CorrectionMode,
) -> Result<String, ScanmdError> {
    if text.trim().is_empty() {
        return Ok(text.to_string());
    }

    let (mode, temperature) = match mode {
        CorrectionMode::Auto => match analyze_complexity(text) {
            Complexity::High => (CorrectionMode::Thinking, 0.1),
            Complexity::Medium => (CorrectionMode::NonThinking, 0.3),
            Complexity::Low => {
                debug!("low complexity text, applying basic cleanup");
                return Ok(basic_cleanup(text));
            }
        },
        CorrectionMode::Thinking => (CorrectionMode::Thinking, 0.1),
        CorrectionMode::NonThinking => (CorrectionMode::NonThinking, 0.3),
    };

    corrector.correct(text, mode, temperature)
}
