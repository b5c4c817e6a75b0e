use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info};

use crate::pipeline::Pipeline;

/// Outcome of one document in a batch run. Failures are captured here
/// instead of aborting the batch.
#[derive(Debug)]
pub struct BatchResult {
    pub path: PathBuf,
    pub pages: usize,
    pub elapsed: Duration,
    pub success: bool,
    pub error: Option<String>,
    /// Assembled Markdown on success, for downstream format rendering.
    pub markdown: Option<String>,
}

/// Processes `documents` concurrently, at most `workers` at a time, each on
/// a blocking thread. Results come back in completion order.
pub async fn run_batch(
    pipeline: Arc<Pipeline>,
    documents: Vec<PathBuf>,
    out_dir: PathBuf,
    workers: usize,
) -> Vec<BatchResult> {
    let semaphore = Arc::new(Semaphore::new(workers.max(1)));
    let mut tasks = JoinSet::new();

    info!("batch start: {} documents, {} workers", documents.len(), workers.max(1));

    for document in documents {
        let pipeline = Arc::clone(&pipeline);
        let semaphore = Arc::clone(&semaphore);
        let out_dir = out_dir.clone();

        tasks.spawn(async move {
            // Semaphore is never closed here, acquire cannot fail.
            let _permit = semaphore.acquire_owned().await;
            let path = document.clone();
            tokio::task::spawn_blocking(move || {
                match pipeline.process_document(&document, &out_dir) {
                    Ok(result) => BatchResult {
                        path: document,
                        pages: result.pages,
                        elapsed: result.elapsed,
                        success: true,
                        error: None,
                        markdown: Some(result.markdown),
                    },
                    Err(err) => {
                        error!("document failed: {}: {}", document.display(), err);
                        BatchResult {
                            path: document,
                            pages: 0,
                            elapsed: Duration::ZERO,
                            success: false,
                            error: Some(err.to_string()),
                            markdown: None,
                        }
                    }
                }
            })
            .await
            .unwrap_or_else(|join_err| BatchResult {
                path,
                pages: 0,
                elapsed: Duration::ZERO,
                success: false,
                error: Some(join_err.to_string()),
                markdown: None,
            })
        });
    }

    let mut results = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        if let Ok(result) = joined {
            results.push(result);
        }
    }

    let failed = results.iter().filter(|r| !r.success).count();
    info!("batch done: {} ok, {} failed", results.len() - failed, failed);
    results
}
