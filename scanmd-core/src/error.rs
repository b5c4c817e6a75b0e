use snafu::prelude::*;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ScanmdError {
    #[snafu(display("Document not found: {}", path))]
    NotFound { path: String },
    #[snafu(display("Read `{}` error: {}", path, source))]
    IoRead {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Write `{}` error: {}", path, source))]
    IoWrite {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Parse sidecar `{}` error: {}", path, source))]
    Sidecar {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Image Read error: {}", source))]
    ImageRead {
        source: image::ImageError,
        path: String,
    },
    #[snafu(display("Image Write error: {}", source))]
    ImageWrite {
        source: image::ImageError,
        path: String,
    },
    #[snafu(display("Load Font error: {}", source))]
    Font { source: ab_glyph::InvalidFont },
    #[snafu(display("Docx Write `{}` error: {}", path, source))]
    DocxWrite {
        source: zip::result::ZipError,
        path: String,
    },
    #[snafu(display("Text corrector error: {}", message))]
    Corrector { message: String },
    #[snafu(display("OCR engine error on `{}` for {}, msg {}", stage, path, message))]
    EngineErr {
        stage: String,
        path: String,
        message: String,
    },
}
