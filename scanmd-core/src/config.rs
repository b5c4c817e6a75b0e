use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use snafu::ResultExt;
use tracing::info;

use crate::annotate::AnnotateConfig;
use crate::correct::CorrectionMode;
use crate::error::{IoReadSnafu, ScanmdError, SidecarSnafu};
use crate::filter::FilterConfig;

/// Knobs for the correction stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorrectionConfig {
    #[serde(default)]
    pub mode: CorrectionMode,
    /// Skip the correction stage entirely.
    #[serde(default)]
    pub disabled: bool,
}

/// Where and how much to write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Save annotated page rasters alongside the Markdown.
    #[serde(default = "default_true")]
    pub annotated_images: bool,
    /// Save extracted figures referenced from the Markdown.
    #[serde(default = "default_true")]
    pub extracted_images: bool,
    /// Concurrent documents in batch mode.
    #[serde(default = "default_workers")]
    pub workers: usize,
}

fn default_true() -> bool {
    true
}

fn default_workers() -> usize {
    2
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            annotated_images: true,
            extracted_images: true,
            workers: default_workers(),
        }
    }
}

/// Top-level configuration, loadable from a JSON file. Every section and
/// every field falls back to its default, so a partial file is fine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanmdConfig {
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub annotate: AnnotateConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub correction: CorrectionConfig,
}

impl ScanmdConfig {
    pub fn from_file(path: &Path) -> Result<Self, ScanmdError> {
        let data = fs::read_to_string(path).context(IoReadSnafu {
            path: path.to_string_lossy(),
        })?;
        let config = serde_json::from_str(&data).context(SidecarSnafu {
            path: path.to_string_lossy(),
        })?;
        info!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Load from `path` when given, otherwise defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ScanmdError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }
}
