//! Rule-based Portuguese language model.
//!
//! Tokenization is regex driven: whitespace runs, numbers with `.`/`,`
//! separators, words (hyphen and apostrophe compounds kept whole) and single
//! punctuation characters. Stop words come from the `stop-words` crate's
//! Portuguese list.
//!
//! Lemmatization looks the word up in a form → lemma table first (a small
//! built-in table of irregular forms, optionally extended from a
//! `lemma<TAB>form` file) and otherwise applies conservative suffix rules for
//! plurals and a few regular verb endings. Anything no rule covers is its own
//! lemma.

use crate::cache::Memo;
use crate::error::ConfigError;
use crate::keywords::model::{LanguageModel, Token};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use stop_words::{get, LANGUAGE};
use tracing::{info, instrument};

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?x)
        (?P<space>\s+)
        | (?P<number>\d+(?:[.,]\d+)+)
        | (?P<word>\w+(?:[-'’]\w+)*)
        | (?P<punct>[^\w\s])",
    )
    .expect("token pattern is valid")
});

static NUMERIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?\d+(?:[.,]\d+)*$").expect("numeric pattern is valid"));

static SHARED_MODELS: Lazy<Memo<Option<PathBuf>, PortugueseModel>> =
    Lazy::new(|| Memo::new("language_model"));

/// Numbers written as words.
const NUMBER_WORDS: &[&str] = &[
    "zero", "um", "uma", "dois", "duas", "três", "quatro", "cinco", "seis", "sete", "oito",
    "nove", "dez", "onze", "doze", "treze", "quatorze", "catorze", "quinze", "dezesseis",
    "dezessete", "dezoito", "dezenove", "vinte", "trinta", "quarenta", "cinquenta", "sessenta",
    "setenta", "oitenta", "noventa", "cem", "cento", "mil", "milhão", "milhões", "bilhão",
    "bilhões", "trilhão", "trilhões",
];

/// Irregular forms no suffix rule recovers.
const IRREGULAR_LEMMAS: &[(&str, &str)] = &[
    ("é", "ser"),
    ("são", "ser"),
    ("era", "ser"),
    ("eram", "ser"),
    ("foi", "ser"),
    ("foram", "ser"),
    ("será", "ser"),
    ("serão", "ser"),
    ("sido", "ser"),
    ("sendo", "ser"),
    ("está", "estar"),
    ("estão", "estar"),
    ("esteve", "estar"),
    ("estava", "estar"),
    ("tem", "ter"),
    ("têm", "ter"),
    ("teve", "ter"),
    ("tinha", "ter"),
    ("terá", "ter"),
    ("diz", "dizer"),
    ("dizem", "dizer"),
    ("disse", "dizer"),
    ("disseram", "dizer"),
    ("dito", "dizer"),
    ("faz", "fazer"),
    ("fazem", "fazer"),
    ("fez", "fazer"),
    ("fizeram", "fazer"),
    ("feito", "fazer"),
    ("pode", "poder"),
    ("podem", "poder"),
    ("pôde", "poder"),
    ("quer", "querer"),
    ("querem", "querer"),
    ("quis", "querer"),
    ("vai", "ir"),
    ("vão", "ir"),
    ("iria", "ir"),
    ("vem", "vir"),
    ("vêm", "vir"),
    ("veio", "vir"),
    ("deu", "dar"),
    ("deram", "dar"),
    ("dá", "dar"),
    ("viu", "ver"),
    ("vê", "ver"),
    ("pôs", "pôr"),
    ("põe", "pôr"),
];

/// Suffix rewrites, longest first. Each applies only when the word keeps at
/// least `min_stem` characters before the suffix.
const SUFFIX_RULES: &[(&str, &str, usize)] = &[
    ("ões", "ão", 1),
    ("ães", "ão", 1),
    ("ãos", "ão", 1),
    ("aram", "ar", 2),
    ("ais", "al", 2),
    ("éis", "el", 1),
    ("óis", "ol", 1),
    ("res", "r", 2),
    ("zes", "z", 2),
    ("ns", "m", 2),
    ("ou", "ar", 3),
    ("iu", "ir", 4),
    ("os", "o", 2),
    ("as", "a", 2),
    ("es", "e", 3),
];

/// Portuguese tokenizer, stop-word list and lemmatizer.
#[derive(Debug, Clone)]
pub struct PortugueseModel {
    stop_words: HashSet<String>,
    lemmas: HashMap<String, String>,
}

impl Default for PortugueseModel {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PortugueseModel {
    /// Model with the built-in lemma table only.
    pub fn builtin() -> Self {
        let stop_words = get(LANGUAGE::Portuguese)
            .into_iter()
            .map(|w| w.to_lowercase())
            .collect();
        let lemmas = IRREGULAR_LEMMAS
            .iter()
            .map(|(form, lemma)| (form.to_string(), lemma.to_string()))
            .collect();
        Self { stop_words, lemmas }
    }

    /// Built-in model extended with the `lemma<TAB>form` entries of `path`.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub fn with_dictionary(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::LanguageModel(format!("cannot read lemma dictionary {}: {e}", path.display()))
        })?;
        let mut model = Self::builtin();
        let added = model.merge_dictionary(&raw);
        info!(entries = added, "Loaded lemma dictionary");
        Ok(model)
    }

    /// Merge `lemma<TAB>form` lines; returns how many entries were read.
    pub fn merge_dictionary(&mut self, raw: &str) -> usize {
        let mut added = 0;
        for line in raw.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut fields = line.split('\t');
            if let (Some(lemma), Some(form)) = (fields.next(), fields.next()) {
                let (lemma, form) = (lemma.trim(), form.trim());
                if !lemma.is_empty() && !form.is_empty() {
                    self.lemmas.insert(form.to_lowercase(), lemma.to_lowercase());
                    added += 1;
                }
            }
        }
        added
    }

    /// The process-wide model for `dictionary`, loaded on first use.
    pub fn shared(dictionary: Option<&Path>) -> Result<Arc<Self>, ConfigError> {
        let key = dictionary.map(Path::to_path_buf);
        SHARED_MODELS.get_or_try_init(&key, || match dictionary {
            Some(path) => Self::with_dictionary(path),
            None => Ok(Self::builtin()),
        })
    }

    /// Drop every shared model.
    pub fn reset_shared() {
        SHARED_MODELS.reset();
    }

    /// Base form of a lowercased word.
    pub fn lemmatize(&self, word: &str) -> String {
        if let Some(lemma) = self.lemmas.get(word) {
            return lemma.clone();
        }
        if word.chars().count() <= 3 || word.ends_with("ss") {
            return word.to_string();
        }
        for (suffix, replacement, min_stem) in SUFFIX_RULES {
            if let Some(stem) = word.strip_suffix(suffix) {
                if stem.chars().count() >= *min_stem {
                    return format!("{stem}{replacement}");
                }
            }
        }
        word.to_string()
    }

    fn like_num(text: &str) -> bool {
        NUMERIC_RE.is_match(text) || NUMBER_WORDS.contains(&text)
    }
}

impl LanguageModel for PortugueseModel {
    fn name(&self) -> &str {
        "pt-rules"
    }

    fn stop_words(&self) -> &HashSet<String> {
        &self.stop_words
    }

    fn analyze(&self, text: &str) -> Vec<Token> {
        TOKEN_RE
            .captures_iter(text)
            .map(|caps| {
                let surface = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
                let lower = surface.to_lowercase();
                let is_space = caps.name("space").is_some();
                let is_punct = caps.name("punct").is_some();
                let is_word = caps.name("word").is_some();

                let lemma = if is_word && !Self::like_num(&lower) {
                    self.lemmatize(&lower)
                } else {
                    lower.clone()
                };
                Token {
                    is_stop: self.stop_words.contains(&lower),
                    like_num: !is_space && !is_punct && Self::like_num(&lower),
                    text: surface.to_string(),
                    lemma,
                    is_punct,
                    is_space,
                }
            })
            .collect()
    }
}
