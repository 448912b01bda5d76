//! One analysis run: fetch → aggregate → summarize ∥ extract + render.
//!
//! The summary and the keyword/cloud branches only share the read-only
//! aggregate, and each ends in its own [`ArtifactOutcome`]: a failing
//! summarizer never costs the cloud, and a sparse cloud never costs the
//! summary. When there is no corpus at all, neither the summarizer nor the
//! extractor is called.

use crate::aggregate::{aggregate, Aggregate};
use crate::api::{summarize_articles, Summarizer};
use crate::cloud::CloudRenderer;
use crate::error::{CloudError, NewsError};
use crate::keywords::{Extraction, Extractor, KeywordStream};
use crate::models::{AnalysisReport, ArtifactOutcome};
use crate::news::{NewsFetcher, QueryStyle};
use crate::utils::cloud_file_name;
use chrono::Local;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, instrument, warn};

const NO_ARTICLES: &str = "no news articles found";
const NO_CORPUS: &str = "no article has a description to analyze";
const NO_KEYWORDS: &str = "no keywords found";
const EXTRACTION_FAILED: &str = "keyword extraction failed";

/// The collaborators one analysis run needs.
pub struct Pipeline<N, S, R> {
    news: N,
    summarizer: S,
    extractor: Extractor,
    renderer: R,
    query_style: QueryStyle,
    output_dir: PathBuf,
}

impl<N, S, R> Pipeline<N, S, R>
where
    N: NewsFetcher,
    S: Summarizer,
    R: CloudRenderer,
{
    pub fn new(
        news: N,
        summarizer: S,
        extractor: Extractor,
        renderer: R,
        query_style: QueryStyle,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            news,
            summarizer,
            extractor,
            renderer,
            query_style,
            output_dir: output_dir.into(),
        }
    }

    /// Run the whole analysis for `subject`.
    ///
    /// # Errors
    ///
    /// Only a failed news search aborts the run. Everything after it is
    /// reported per artifact inside the returned report.
    #[instrument(level = "info", skip_all, fields(%subject))]
    pub async fn analyze(&self, subject: &str) -> Result<AnalysisReport, NewsError> {
        let t0 = Instant::now();
        let query = self.query_style.query_for(subject);
        let articles = self.news.fetch(&query).await?;
        info!(count = articles.len(), %query, "Fetched articles");

        let texts = aggregate(&articles);
        let (summary, keywords, cloud) = if articles.is_empty() {
            (
                ArtifactOutcome::skipped(NO_ARTICLES),
                ArtifactOutcome::skipped(NO_ARTICLES),
                ArtifactOutcome::skipped(NO_ARTICLES),
            )
        } else if !texts.has_corpus() {
            info!("All articles lack descriptions; skipping summary and keywords");
            (
                ArtifactOutcome::skipped(NO_CORPUS),
                ArtifactOutcome::skipped(NO_CORPUS),
                ArtifactOutcome::skipped(NO_CORPUS),
            )
        } else {
            let summary = self.summary(&texts, subject).await;
            let (keywords, cloud) = self.keywords_and_cloud(&texts, subject);
            (summary, keywords, cloud)
        };

        info!(
            elapsed_ms = t0.elapsed().as_millis() as u64,
            summary = summary.is_ready(),
            keywords = keywords.is_ready(),
            cloud = cloud.is_ready(),
            "Analysis finished"
        );

        Ok(AnalysisReport {
            subject: subject.to_string(),
            query,
            generated_at: Local::now().to_rfc3339(),
            articles,
            summary,
            keywords,
            cloud,
        })
    }

    async fn summary(&self, texts: &Aggregate, subject: &str) -> ArtifactOutcome<String> {
        match summarize_articles(&self.summarizer, &texts.prompt_block, subject).await {
            Ok(text) => ArtifactOutcome::ready(text),
            Err(e) => ArtifactOutcome::failed(e),
        }
    }

    fn keywords_and_cloud(
        &self,
        texts: &Aggregate,
        subject: &str,
    ) -> (ArtifactOutcome<KeywordStream>, ArtifactOutcome<PathBuf>) {
        let stream = match self.extractor.run(&texts.corpus, subject) {
            Ok(Extraction::Keywords(stream)) => stream,
            Ok(Extraction::NoKeywords) => {
                return (
                    ArtifactOutcome::skipped(NO_KEYWORDS),
                    ArtifactOutcome::skipped(NO_KEYWORDS),
                );
            }
            Err(e) => {
                warn!(error = %e, "Keyword extraction failed");
                return (
                    ArtifactOutcome::failed(&e),
                    ArtifactOutcome::skipped(EXTRACTION_FAILED),
                );
            }
        };

        let path = self.output_dir.join(cloud_file_name(subject));
        let cloud = match self.renderer.render(&stream.joined(), &path) {
            Ok(rendered) => {
                info!(path = %rendered.path.display(), words = rendered.words_placed, "Word cloud ready");
                ArtifactOutcome::ready(rendered.path)
            }
            Err(CloudError::InsufficientText) => {
                ArtifactOutcome::skipped(CloudError::InsufficientText.to_string())
            }
            Err(e) => {
                warn!(error = %e, "Word cloud failed");
                ArtifactOutcome::failed(e)
            }
        };
        (ArtifactOutcome::ready(stream), cloud)
    }
}
