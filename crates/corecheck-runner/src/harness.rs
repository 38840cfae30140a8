//! Document and directory orchestration.

use std::path::Path;
use std::sync::Arc;

use corecheck_core::{
    discover_documents, extract_from_file, ConfigSnippet, CorecheckError, DocumentReport,
    RunSummary, SkippedDocument, SnippetResult,
};
use tracing::{info, Instrument};

use crate::obs;
use crate::validator::SnippetValidator;

/// Callbacks fired as a run progresses. All methods default to no-ops.
pub trait HarnessHandler: Send + Sync {
    /// A document with at least one snippet is about to be checked.
    fn on_document_start(&self, _document: &Path, _snippets: usize) {}

    fn on_snippet(&self, _document: &Path, _snippet: &ConfigSnippet, _result: &SnippetResult) {}

    fn on_document_finish(&self, _report: &DocumentReport) {}

    fn on_document_skipped(&self, _skipped: &SkippedDocument) {}
}

/// Handler that only relies on the tracing events.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentHandler;

impl HarnessHandler for SilentHandler {}

/// Runs every snippet of every document through a validator, one at a time.
pub struct Harness {
    validator: Arc<dyn SnippetValidator>,
    handler: Arc<dyn HarnessHandler>,
}

impl Harness {
    pub fn new(validator: Arc<dyn SnippetValidator>) -> Self {
        Self {
            validator,
            handler: Arc::new(SilentHandler),
        }
    }

    pub fn with_handler(mut self, handler: Arc<dyn HarnessHandler>) -> Self {
        self.handler = handler;
        self
    }

    /// Validate `snippets` in order and tally the failures.
    ///
    /// Snippets are strictly sequential: each process is reaped before the
    /// next snippet overwrites the scratch configuration.
    pub async fn check_snippets(
        &self,
        document: &Path,
        snippets: Vec<ConfigSnippet>,
    ) -> DocumentReport {
        self.handler.on_document_start(document, snippets.len());

        let mut results = Vec::with_capacity(snippets.len());
        for snippet in snippets {
            obs::emit_snippet_started(snippet.index(), snippet.line());
            let result = self.validator.validate(&snippet).await;
            obs::emit_snippet_finished(result.index, &result.outcome, result.elapsed_ms);

            self.handler.on_snippet(document, &snippet, &result);
            results.push(result);
        }

        let report = DocumentReport::new(document.to_path_buf(), results);
        obs::emit_document_checked(&report);
        self.handler.on_document_finish(&report);
        report
    }

    /// Extract and check one document.
    ///
    /// Returns `Ok(None)` when the document holds no snippets.
    pub async fn check_document(
        &self,
        document: &Path,
    ) -> corecheck_core::Result<Option<DocumentReport>> {
        self.extract_and_check(document)
            .instrument(obs::document_span(document))
            .await
    }

    async fn extract_and_check(
        &self,
        document: &Path,
    ) -> corecheck_core::Result<Option<DocumentReport>> {
        let path = document.to_path_buf();
        let snippets = tokio::task::spawn_blocking(move || extract_from_file(&path))
            .await
            .map_err(|e| CorecheckError::Io(std::io::Error::other(e)))??;

        if snippets.is_empty() {
            return Ok(None);
        }

        Ok(Some(self.check_snippets(document, snippets).await))
    }

    /// Check every markdown document directly inside `dir`.
    ///
    /// Only an unreadable `dir` is an error. Unreadable documents are
    /// recorded in [`RunSummary::skipped`] and the run carries on.
    pub async fn check_directory(&self, dir: &Path) -> corecheck_core::Result<RunSummary> {
        let documents = discover_documents(dir)?;
        let mut summary = RunSummary::begin();

        info!(
            run_id = %summary.run_id,
            dir = %dir.display(),
            documents = documents.len(),
            "Starting corecheck run"
        );

        for document in documents {
            match self.check_document(&document).await {
                Ok(Some(report)) => summary.reports.push(report),
                Ok(None) => {}
                Err(e) => {
                    let skipped = SkippedDocument {
                        document,
                        reason: e.to_string(),
                    };
                    obs::emit_document_skipped(&skipped.document, &skipped.reason);
                    self.handler.on_document_skipped(&skipped);
                    summary.skipped.push(skipped);
                }
            }
        }

        let summary = summary.finish();
        info!(
            run_id = %summary.run_id,
            snippets = summary.total_snippets(),
            failed = summary.total_failed(),
            "corecheck run finished"
        );
        Ok(summary)
    }
}
