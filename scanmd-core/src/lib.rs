pub mod analysis;
pub mod annotate;
pub mod assemble;
pub mod batch;
pub mod config;
pub mod consts;
pub mod correct;
pub mod engine;
pub mod error;
pub mod filter;
pub mod layout;
pub mod pipeline;
pub mod render;

// Re-export commonly used types
pub use config::ScanmdConfig;
pub use engine::{OcrEngine, SidecarEngine};
pub use error::ScanmdError;
pub use filter::{FilterConfig, filter_and_merge};
pub use layout::{
    element::{BlockRecord, Geometry},
    page::{DocumentResult, Page},
};
pub use pipeline::Pipeline;
