//! Data models shared across the pipeline.
//!
//! - [`Article`]: one news search result, with every optional field defaulted
//! - [`ArtifactOutcome`]: the result state of one output artifact
//! - [`AnalysisReport`]: everything one analysis run produced

use crate::keywords::KeywordStream;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A news article as returned by the news search.
///
/// Upstream feeds omit fields freely; every field defaults to an empty string
/// (or `None` for the date) instead of failing the record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Article {
    pub title: String,
    /// Plain-text description. May be empty.
    pub description: String,
    pub url: String,
    pub publisher: String,
    /// Publication date as given by the feed (RFC 2822).
    pub published: Option<String>,
}

impl Article {
    pub fn has_description(&self) -> bool {
        !self.description.trim().is_empty()
    }
}

/// What became of one artifact (summary, keywords, cloud) in a run.
///
/// A failure in one artifact never prevents the others from completing, so
/// each carries its own state.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ArtifactOutcome<T> {
    Ready { value: T },
    /// Not attempted, e.g. because there was no text to work with.
    Skipped { reason: String },
    /// Attempted and failed; `error` is the underlying message.
    Failed { error: String },
}

impl<T> ArtifactOutcome<T> {
    pub fn ready(value: T) -> Self {
        Self::Ready { value }
    }

    pub fn skipped(reason: impl Into<String>) -> Self {
        Self::Skipped {
            reason: reason.into(),
        }
    }

    pub fn failed(error: impl ToString) -> Self {
        Self::Failed {
            error: error.to_string(),
        }
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Ready { value } => Some(value),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }
}

/// The result of one analysis run for one subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub subject: String,
    /// The query sent to the news search.
    pub query: String,
    /// Local timestamp (RFC 3339) when the run finished.
    pub generated_at: String,
    pub articles: Vec<Article>,
    pub summary: ArtifactOutcome<String>,
    pub keywords: ArtifactOutcome<KeywordStream>,
    pub cloud: ArtifactOutcome<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_missing_fields_default_to_empty() {
        let article: Article = serde_json::from_str(r#"{"title": "Câmara aprova texto"}"#).unwrap();
        assert_eq!(article.title, "Câmara aprova texto");
        assert_eq!(article.description, "");
        assert_eq!(article.url, "");
        assert_eq!(article.publisher, "");
        assert_eq!(article.published, None);
        assert!(!article.has_description());
    }

    #[test]
    fn test_whitespace_description_counts_as_empty() {
        let article = Article {
            description: "  \n ".to_string(),
            ..Article::default()
        };
        assert!(!article.has_description());
    }

    #[test]
    fn test_outcome_serialization() {
        let ok: ArtifactOutcome<String> = ArtifactOutcome::ready("resumo".to_string());
        let json = serde_json::to_string(&ok).unwrap();
        assert_eq!(json, r#"{"status":"ready","value":"resumo"}"#);

        let failed: ArtifactOutcome<String> = ArtifactOutcome::failed("quota exceeded");
        let json = serde_json::to_string(&failed).unwrap();
        assert_eq!(json, r#"{"status":"failed","error":"quota exceeded"}"#);
    }

    #[test]
    fn test_outcome_value() {
        let ok = ArtifactOutcome::ready(3);
        assert_eq!(ok.value(), Some(&3));
        assert!(ok.is_ready());

        let skipped: ArtifactOutcome<i32> = ArtifactOutcome::skipped("no text");
        assert_eq!(skipped.value(), None);
        assert!(!skipped.is_ready());
    }
}
