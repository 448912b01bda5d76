//! The token contract between the keyword extractor and a language model.

use std::collections::HashSet;

/// One linguistic token with the attributes keyword filtering needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Surface text as it appears in the input.
    pub text: String,
    /// Dictionary base form.
    pub lemma: String,
    pub is_punct: bool,
    pub is_space: bool,
    /// Digits, or a number written out as a word.
    pub like_num: bool,
    pub is_stop: bool,
}

/// A tokenizer + lemmatizer for one language.
///
/// Implementations must be deterministic: the same input always yields the
/// same token sequence.
pub trait LanguageModel: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// The model's default stop-word list, lowercased.
    fn stop_words(&self) -> &HashSet<String>;

    /// Split `text` into tokens, in order, covering the whole input.
    fn analyze(&self, text: &str) -> Vec<Token>;
}
