use std::{sync::Arc, time::Duration};

use futures::{
    future::join_all,
    stream::{self, StreamExt},
};
use tokio::time::timeout;
use tracing::{debug, warn};

use super::{
    extractor::DocumentExtractor,
    types::{ExtractionResult, UploadedFile},
    uploads::FileRepository,
};
use crate::{
    config::{MAX_DOCUMENTS, TimeoutsConfig},
    error::ExtractError,
};

const CONTEXT_SEPARATOR: &str = "\n\n";

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub extraction_timeout: Duration,
    pub max_concurrency: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::from_config(&TimeoutsConfig::default())
    }
}

impl PipelineConfig {
    pub fn from_config(timeouts: &TimeoutsConfig) -> Self {
        Self {
            extraction_timeout: timeouts.extraction(),
            max_concurrency: MAX_DOCUMENTS,
        }
    }
}

/// Fans a batch of uploads out to the extractor and folds the results into
/// one context string.
///
/// Extraction never fails as a whole: a file that cannot be read, parsed or
/// recognized contributes nothing. Every staged file is removed before its
/// task completes, whatever the outcome.
pub struct ExtractionPipeline {
    extractor: Arc<dyn DocumentExtractor>,
    file_repo: Arc<dyn FileRepository>,
    config: PipelineConfig,
}

impl ExtractionPipeline {
    pub fn new(
        extractor: Arc<dyn DocumentExtractor>,
        file_repo: Arc<dyn FileRepository>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            extractor,
            file_repo,
            config,
        }
    }

    pub async fn extract_all(&self, files: Vec<UploadedFile>) -> String {
        let results = self.extract_each(files).await;
        join_context(&results)
    }

    /// Per-file outcomes in input order, whatever order the tasks finish in.
    pub async fn extract_each(&self, files: Vec<UploadedFile>) -> Vec<ExtractionResult> {
        if files.is_empty() {
            return Vec::new();
        }

        let concurrency = self.config.max_concurrency.max(1);
        stream::iter(files)
            .map(|file| self.process_file(file))
            .buffered(concurrency)
            .collect()
            .await
    }

    /// Remove staged files that will never be extracted.
    pub async fn discard(&self, files: &[UploadedFile]) {
        join_all(files.iter().map(|file| self.cleanup(file))).await;
    }

    async fn process_file(&self, file: UploadedFile) -> ExtractionResult {
        let limit = self.config.extraction_timeout;
        let outcome = timeout(limit, self.extractor.extract(&file))
            .await
            .unwrap_or(Err(ExtractError::Timeout(limit)));

        let result = match outcome {
            Ok(text) => {
                debug!(file = %file.original_name, chars = text.chars().count(), "document extracted");
                ExtractionResult::Extracted(text)
            }
            Err(err) => {
                warn!(file = %file.original_name, error = %err, "failed to extract document");
                ExtractionResult::Failed {
                    reason: err.to_string(),
                }
            }
        };

        self.cleanup(&file).await;
        result
    }

    async fn cleanup(&self, file: &UploadedFile) {
        if let Err(err) = self.file_repo.remove(&file.path).await {
            warn!(file = %file.original_name, error = %err, "failed to clean up uploaded file");
        }
    }
}

/// Join successful, non-blank extractions with a blank line between them.
pub fn join_context(results: &[ExtractionResult]) -> String {
    results
        .iter()
        .filter_map(ExtractionResult::text)
        .filter(|text| !text.trim().is_empty())
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}
