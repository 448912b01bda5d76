//! Keyword extraction: raw article text in, clean lemma stream out.
//!
//! # Steps
//!
//! 1. Lowercase the whole corpus.
//! 2. Tokenize and lemmatize it with a [`LanguageModel`].
//! 3. Build the exclusion set: the model's stop words, any configured extra
//!    stop words, and every word of the subject's name (so the subject does
//!    not dominate its own cloud).
//! 4. Drop excluded, punctuation, whitespace and numeric tokens, and lemmas
//!    shorter than the optional minimum length.
//! 5. Emit the surviving lemmas in order, duplicates kept: frequency is what
//!    sizes the words in the cloud.
//!
//! An empty corpus is rejected before the model is touched. A corpus where
//! every token is filtered out yields [`Extraction::NoKeywords`].

pub mod model;
pub mod portuguese;

use crate::config::KeywordConfig;
use crate::error::{ConfigError, ExtractError};
use itertools::Itertools;
use model::LanguageModel;
use portuguese::PortugueseModel;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Ordered lemmas extracted from a corpus, duplicates retained.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct KeywordStream(Vec<String>);

impl KeywordStream {
    pub fn new(lemmas: Vec<String>) -> Self {
        Self(lemmas)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Space-joined form handed to the cloud renderer.
    pub fn joined(&self) -> String {
        self.0.join(" ")
    }

    /// Occurrence count per lemma, most frequent first; ties keep first-seen order.
    pub fn frequencies(&self) -> Vec<(String, usize)> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for lemma in &self.0 {
            *counts.entry(lemma.as_str()).or_default() += 1;
        }
        self.0
            .iter()
            .map(String::as_str)
            .unique()
            .map(|lemma| (lemma.to_string(), counts[lemma]))
            .enumerate()
            .sorted_by(|(ia, (_, ca)), (ib, (_, cb))| cb.cmp(ca).then(ia.cmp(ib)))
            .map(|(_, pair)| pair)
            .collect()
    }
}

/// Result of a successful extraction run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Keywords(KeywordStream),
    /// Every token was filtered out; there is nothing to plot.
    NoKeywords,
}

/// Tunables for the filter step.
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Keep only lemmas with at least this many characters.
    pub min_lemma_len: Option<usize>,
    pub extra_stop_words: Vec<String>,
}

impl From<&KeywordConfig> for ExtractOptions {
    fn from(config: &KeywordConfig) -> Self {
        Self {
            min_lemma_len: config.min_lemma_len,
            extra_stop_words: config.extra_stop_words.clone(),
        }
    }
}

/// Words never allowed into the keyword stream for `subject`.
pub fn exclusion_set(
    model: &dyn LanguageModel,
    subject: &str,
    extra_stop_words: &[String],
) -> HashSet<String> {
    model
        .stop_words()
        .iter()
        .cloned()
        .chain(extra_stop_words.iter().map(|w| w.to_lowercase()))
        .chain(subject.to_lowercase().split_whitespace().map(str::to_string))
        .collect()
}

/// Run the extraction steps over `corpus`.
///
/// # Errors
///
/// [`ExtractError::EmptyInput`] when the corpus is blank.
#[instrument(level = "info", skip_all, fields(model = model.name(), %subject, corpus_bytes = corpus.len()))]
pub fn extract(
    model: &dyn LanguageModel,
    corpus: &str,
    subject: &str,
    options: &ExtractOptions,
) -> Result<Extraction, ExtractError> {
    if corpus.trim().is_empty() {
        return Err(ExtractError::EmptyInput);
    }

    let lowered = corpus.to_lowercase();
    let excluded = exclusion_set(model, subject, &options.extra_stop_words);
    let tokens = model.analyze(&lowered);
    let total = tokens.len();

    let lemmas: Vec<String> = tokens
        .into_iter()
        .filter(|t| {
            !(t.is_punct
                || t.is_space
                || t.like_num
                || t.is_stop
                || excluded.contains(&t.text))
        })
        .filter(|t| {
            options
                .min_lemma_len
                .is_none_or(|min| t.lemma.chars().count() >= min)
        })
        .map(|t| t.lemma)
        .filter(|lemma| !lemma.trim().is_empty())
        .collect();

    debug!(tokens = total, kept = lemmas.len(), "Filtered tokens");
    if lemmas.is_empty() {
        info!("No keywords left after filtering");
        return Ok(Extraction::NoKeywords);
    }
    info!(keywords = lemmas.len(), "Extracted keywords");
    Ok(Extraction::Keywords(KeywordStream::new(lemmas)))
}

/// Where the extractor gets its language model from.
#[derive(Clone)]
pub enum ModelSource {
    /// The process-wide Portuguese model, loaded on first use.
    Shared { dictionary: Option<PathBuf> },
    /// A model supplied by the caller.
    Fixed(Arc<dyn LanguageModel>),
}

impl std::fmt::Debug for ModelSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Shared { dictionary } => f.debug_struct("Shared").field("dictionary", dictionary).finish(),
            Self::Fixed(model) => f.debug_tuple("Fixed").field(&model.name()).finish(),
        }
    }
}

impl ModelSource {
    fn load(&self) -> Result<Arc<dyn LanguageModel>, ConfigError> {
        match self {
            Self::Shared { dictionary } => {
                let model: Arc<dyn LanguageModel> = PortugueseModel::shared(dictionary.as_deref())?;
                Ok(model)
            }
            Self::Fixed(model) => Ok(Arc::clone(model)),
        }
    }
}

/// Keyword extraction bound to a model source and options.
#[derive(Debug, Clone)]
pub struct Extractor {
    source: ModelSource,
    options: ExtractOptions,
}

impl Extractor {
    pub fn new(source: ModelSource, options: ExtractOptions) -> Self {
        Self { source, options }
    }

    pub fn from_config(config: &KeywordConfig) -> Self {
        Self::new(
            ModelSource::Shared {
                dictionary: config.lemma_dictionary.clone(),
            },
            ExtractOptions::from(config),
        )
    }

    /// Extract keywords, loading the model only when there is text to analyze.
    pub fn run(&self, corpus: &str, subject: &str) -> Result<Extraction, ExtractError> {
        if corpus.trim().is_empty() {
            return Err(ExtractError::EmptyInput);
        }
        let model = self.source.load()?;
        extract(model.as_ref(), corpus, subject, &self.options)
    }
}
