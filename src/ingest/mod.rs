//! PDF ingestion pipeline
//!
//! PDF -> sections -> context text -> concept tree -> `KnowledgeGraph::process`.
//! Any failure aborts only the current paper; batches carry on and report
//! per-file failures.

use crate::concept::{ConceptNode, LlmTreeGenerator, TreeError, TreeGenerator};
use crate::config::{AppConfig, ExtractionConfig};
use crate::extract::{context_text, ExtractError, PdfTextExtractor, TextExtractor};
use crate::linking::{LinkError, LinkReport};
use crate::service::KnowledgeGraph;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error(transparent)]
    Extraction(#[from] ExtractError),

    #[error(transparent)]
    TreeGeneration(#[from] TreeError),

    #[error(transparent)]
    Linking(#[from] LinkError),

    #[error("Extraction task failed: {0}")]
    Task(String),
}

pub type ProcessResult<T> = Result<T, ProcessError>;

/// A paper that could not be processed
#[derive(Debug)]
pub struct PaperFailure {
    pub file: String,
    pub error: ProcessError,
}

impl fmt::Display for PaperFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.file, self.error)
    }
}

/// Outcome of a batch run
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub total: usize,
    pub reports: Vec<LinkReport>,
    pub failures: Vec<PaperFailure>,
}

impl BatchSummary {
    pub fn succeeded(&self) -> usize {
        self.reports.len()
    }
}

/// Paper identifier derived from the file name
pub fn paper_title(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// `input` itself when it is a file, otherwise the `*.pdf` files directly
/// inside it sorted by path
pub fn collect_pdfs(input: &Path) -> std::io::Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }

    let mut pdfs = Vec::new();
    for entry in std::fs::read_dir(input)? {
        let path = entry?.path();
        let is_pdf = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false);
        if is_pdf && path.is_file() {
            pdfs.push(path);
        }
    }
    pdfs.sort();
    Ok(pdfs)
}

pub struct Pipeline {
    extractor: Arc<dyn TextExtractor>,
    generator: Arc<dyn TreeGenerator>,
    max_context_chars: usize,
}

impl Pipeline {
    pub fn new(
        extractor: Arc<dyn TextExtractor>,
        generator: Arc<dyn TreeGenerator>,
        config: &ExtractionConfig,
    ) -> Self {
        Self {
            extractor,
            generator,
            max_context_chars: config.max_context_chars,
        }
    }

    /// PDF extraction and chat-model tree generation from configuration
    pub fn from_config(config: &AppConfig) -> ProcessResult<Self> {
        let extractor = PdfTextExtractor::new(config.extraction.full_text_cap)?;
        let generator = LlmTreeGenerator::new(&config.llm)?;
        Ok(Self::new(Arc::new(extractor), Arc::new(generator), &config.extraction))
    }

    /// Extract and generate the concept tree of one PDF.
    ///
    /// Touches no shared state, so callers can run it outside any lock.
    pub async fn prepare(&self, path: &Path) -> ProcessResult<(String, ConceptNode)> {
        let title = paper_title(path);
        let root = self.prepare_as(path, &title).await?;
        Ok((title, root))
    }

    /// Extract and generate the tree of `path` under an explicit paper title
    pub async fn prepare_as(&self, path: &Path, title: &str) -> ProcessResult<ConceptNode> {
        info!("Processing {}...", title);

        let extractor = Arc::clone(&self.extractor);
        let owned_path = path.to_path_buf();
        let sections = tokio::task::spawn_blocking(move || extractor.extract_sections(&owned_path))
            .await
            .map_err(|e| ProcessError::Task(e.to_string()))??;

        let context = context_text(&sections, self.max_context_chars);
        Ok(self.generator.generate(&context).await?)
    }

    pub async fn process_pdf(&self, kg: &mut KnowledgeGraph, path: &Path) -> ProcessResult<LinkReport> {
        let (title, root) = self.prepare(path).await?;
        Ok(kg.process(&title, root).await?)
    }

    /// Process files in order; failures are logged and collected
    pub async fn process_batch(&self, kg: &mut KnowledgeGraph, paths: &[PathBuf]) -> BatchSummary {
        let mut summary = BatchSummary {
            total: paths.len(),
            ..BatchSummary::default()
        };

        for path in paths {
            match self.process_pdf(kg, path).await {
                Ok(report) => summary.reports.push(report),
                Err(error) => {
                    let failure = PaperFailure {
                        file: path
                            .file_name()
                            .map(|n| n.to_string_lossy().into_owned())
                            .unwrap_or_else(|| path.display().to_string()),
                        error,
                    };
                    error!("Error processing {}", failure);
                    summary.failures.push(failure);
                }
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paper_title_is_file_stem() {
        assert_eq!(paper_title(Path::new("/tmp/papers/rp1.pdf")), "rp1");
        assert_eq!(paper_title(Path::new("attention_is_all.pdf")), "attention_is_all");
    }

    #[test]
    fn test_collect_pdfs_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.pdf", "a.PDF", "notes.txt", "c.pdf"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.pdf")).unwrap();

        let found: Vec<String> = collect_pdfs(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(found, vec!["a.PDF", "b.pdf", "c.pdf"]);
    }

    #[test]
    fn test_collect_single_file() {
        let file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        assert_eq!(collect_pdfs(file.path()).unwrap(), vec![file.path().to_path_buf()]);
    }

    #[test]
    fn test_failure_display() {
        let failure = PaperFailure {
            file: "rp1.pdf".to_string(),
            error: ProcessError::Extraction(ExtractError::NoText(PathBuf::from("rp1.pdf"))),
        };
        assert_eq!(failure.to_string(), "rp1.pdf: No text content found in rp1.pdf");
    }
}
