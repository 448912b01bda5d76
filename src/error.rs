//! Error taxonomy for the analysis pipeline.
//!
//! Errors fall into three families, and the family decides how far a failure
//! is allowed to travel:
//!
//! - **Input** ([`RosterError`]): bad files, missing name column, empty queries.
//!   Reported to the user; the interaction loop carries on.
//! - **Configuration** ([`ConfigError`]): missing API credential, missing font,
//!   unloadable language model. Fatal for the artifact that needs the resource,
//!   never for the whole session.
//! - **Upstream** ([`NewsError`], [`SummaryError`], [`CloudError`]): a remote
//!   call or renderer that could not produce a result. Each degrades to a
//!   visible "no result" state for its own artifact only.

use std::path::PathBuf;
use thiserror::Error;

/// Underlying cause carried by read and parse errors.
pub type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Failures while loading a roster or selecting a legislator from it.
#[derive(Debug, Error)]
pub enum RosterError {
    #[error("unsupported file type for {path:?}; use .csv, .xls, .xlsx or .ods")]
    UnsupportedFileType { path: PathBuf },

    #[error("no identifiable name column (expected \"Nome Parlamentar\" or \"Nome\"); columns found: {available:?}")]
    NoNameColumn { available: Vec<String> },

    #[error("failed to read roster {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: BoxedSource,
    },

    #[error("the roster file {path:?} has no header row")]
    NoHeader { path: PathBuf },

    #[error("please type a name to search for")]
    EmptyQuery,
}

/// Missing or unusable configuration for one of the artifact paths.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("API credential not found: set the {variable} environment variable")]
    MissingCredential { variable: String },

    #[error("no usable font found (tried {tried:?}); set cloud.font_path or pass --font")]
    MissingFont { tried: Vec<PathBuf> },

    #[error("language model unavailable: {0}")]
    LanguageModel(String),

    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: BoxedSource,
    },
}

/// Failures of the news search call.
#[derive(Debug, Error)]
pub enum NewsError {
    #[error("news request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("news feed returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed news feed: {0}")]
    Feed(String),
}

/// Failures of the summarization call. The message is shown to the user verbatim.
#[derive(Debug, Error)]
pub enum SummaryError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("summarizer request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("summarizer returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("summarizer returned no text ({reason})")]
    EmptyResponse { reason: String },
}

/// Failures of keyword extraction.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("empty input: there is no text to extract keywords from")]
    EmptyInput,

    #[error(transparent)]
    Model(#[from] ConfigError),
}

/// Failures of word-cloud rendering.
#[derive(Debug, Error)]
pub enum CloudError {
    #[error("insufficient text to build a word cloud")]
    InsufficientText,

    #[error(transparent)]
    Font(#[from] ConfigError),

    #[error("failed to write word cloud image: {0}")]
    Image(#[from] image::ImageError),
}
