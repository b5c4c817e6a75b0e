use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tracing::{info, warn};

use scanmd_core::annotate::AnnotateStyle;
use scanmd_core::batch::{BatchResult, run_batch};
use scanmd_core::config::ScanmdConfig;
use scanmd_core::consts::FONT_PATH_ENV_NAME;
use scanmd_core::engine::SidecarEngine;
use scanmd_core::pipeline::Pipeline;
use scanmd_core::render::{docx::markdown_to_docx, html::markdown_to_html, latex::markdown_to_latex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Md,
    Html,
    Tex,
    Docx,
}

#[derive(Parser)]
#[command(name = "convert")]
#[command(about = "Scanned document to structured Markdown converter")]
struct Args {
    #[arg(required = true, help = "Input document paths")]
    inputs: Vec<PathBuf>,

    #[arg(short, long, default_value = "output", help = "Output directory")]
    output: PathBuf,

    #[arg(short, long, value_enum, default_value = "md", help = "Output format")]
    format: Format,

    #[arg(short, long, help = "Config file (JSON)")]
    config: Option<PathBuf>,

    #[arg(short, long, help = "Concurrent documents (overrides config)")]
    workers: Option<usize>,
}

fn write_output(result: &BatchResult, format: Format, out_dir: &Path) -> Result<(), Box<dyn Error>> {
    let Some(markdown) = &result.markdown else {
        return Ok(());
    };
    let stem = result
        .path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());

    match format {
        Format::Md => {
            let file = out_dir.join(format!("{}.md", stem));
            fs::write(&file, markdown)?;
            info!("saved: {}", file.display());
        }
        Format::Html => {
            let file = out_dir.join(format!("{}.html", stem));
            fs::write(&file, markdown_to_html(markdown))?;
            info!("saved: {}", file.display());
        }
        Format::Tex => {
            let file = out_dir.join(format!("{}.tex", stem));
            fs::write(&file, markdown_to_latex(markdown))?;
            info!("saved: {}", file.display());
        }
        Format::Docx => {
            let file = out_dir.join(format!("{}.docx", stem));
            let handle = fs::File::create(&file)?;
            markdown_to_docx(markdown, handle, &file.to_string_lossy())?;
            info!("saved: {}", file.display());
        }
    }
    Ok(())
}

/// Overlay label text needs a font file; shapes draw fine without one.
fn load_style() -> Result<AnnotateStyle, Box<dyn Error>> {
    match std::env::var(FONT_PATH_ENV_NAME) {
        Ok(path) => {
            let data = fs::read(&path)?;
            info!("annotation font: {}", path);
            Ok(AnnotateStyle::with_font(data)?)
        }
        Err(_) => {
            warn!("{} not set, overlay tags disabled", FONT_PATH_ENV_NAME);
            Ok(AnnotateStyle::default())
        }
    }
}

fn print_summary(results: &[BatchResult]) {
    println!("\n=== Conversion Summary ===");
    println!("Documents: {}", results.len());
    for result in results {
        if result.success {
            println!(
                "  ok   {} ({} pages, {:.2}s)",
                result.path.display(),
                result.pages,
                result.elapsed.as_secs_f64()
            );
        } else {
            println!(
                "  FAIL {} ({})",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }
    let failed = results.iter().filter(|r| !r.success).count();
    println!("Succeeded: {}", results.len() - failed);
    println!("Failed: {}", failed);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let config = ScanmdConfig::load(args.config.as_deref())?;
    let workers = args.workers.unwrap_or(config.output.workers);

    fs::create_dir_all(&args.output)?;

    let style = load_style()?;
    let pipeline = Arc::new(
        Pipeline::new(Box::new(SidecarEngine), config).with_style(style),
    );

    info!("converting {} document(s)", args.inputs.len());
    let results = run_batch(pipeline, args.inputs, args.output.clone(), workers).await;

    for result in &results {
        write_output(result, args.format, &args.output)?;
    }

    print_summary(&results);

    if results.iter().any(|r| !r.success) {
        std::process::exit(1);
    }
    Ok(())
}
