//! Application configuration.
//!
//! Settings come from an optional YAML file (see `--config`); anything the file
//! leaves out falls back to the defaults below, and a handful of CLI flags
//! override the result. Secrets never live in this file: the summarizer
//! credential is read from the environment variable named by
//! [`SummarizerConfig::api_key_env`].

use crate::cli::Cli;
use crate::error::ConfigError;
use crate::news::QueryStyle;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub news: NewsConfig,
    pub summarizer: SummarizerConfig,
    pub keywords: KeywordConfig,
    pub cloud: CloudConfig,
    pub output: OutputConfig,
}

/// News search settings (Google News RSS).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NewsConfig {
    pub language: String,
    pub country: String,
    pub max_results: usize,
    pub query_style: QueryStyle,
    pub endpoint: String,
    /// Drop the trailing " - Publisher" that Google News appends to titles.
    pub strip_publisher_suffix: bool,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            language: "pt".to_string(),
            country: "BR".to_string(),
            max_results: 10,
            query_style: QueryStyle::Deputado,
            endpoint: "https://news.google.com/rss/search".to_string(),
            strip_publisher_suffix: true,
        }
    }
}

/// Generative-language API settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SummarizerConfig {
    pub model: String,
    pub endpoint: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct KeywordConfig {
    /// Keep only lemmas with at least this many characters. `None` disables the filter.
    pub min_lemma_len: Option<usize>,
    /// Optional `lemma<TAB>form` dictionary merged over the built-in lemma table.
    pub lemma_dictionary: Option<PathBuf>,
    /// Words excluded in addition to the language model's stop words.
    pub extra_stop_words: Vec<String>,
}

/// Word-cloud canvas and layout settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CloudConfig {
    pub width: u32,
    pub height: u32,
    pub background: [u8; 3],
    pub max_words: usize,
    pub min_font_size: u32,
    /// Largest font size; derived from the canvas height when unset.
    pub max_font_size: Option<u32>,
    pub font_step: u32,
    pub relative_scaling: f32,
    pub margin: u32,
    pub normalize_plurals: bool,
    pub seed: u64,
    pub font_path: Option<PathBuf>,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 400,
            background: [255, 255, 255],
            max_words: 200,
            min_font_size: 4,
            max_font_size: None,
            font_step: 1,
            relative_scaling: 0.5,
            margin: 2,
            normalize_plurals: true,
            seed: 42,
            font_path: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
    pub write_json: bool,
    pub write_markdown: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            write_json: true,
            write_markdown: true,
        }
    }
}

impl AppConfig {
    /// Load the YAML file at `path`, or the defaults when no path is given.
    #[instrument(level = "info", skip_all, fields(path = ?path))]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            info!("No config file given; using defaults");
            return Ok(Self::default());
        };

        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        let config = Self::from_yaml(&raw).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        info!("Loaded configuration");
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }

    /// Apply command-line overrides on top of the file values.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(dir) = &cli.output_dir {
            self.output.directory = dir.clone();
        }
        if let Some(n) = cli.min_lemma_len {
            self.keywords.min_lemma_len = Some(n);
        }
        if let Some(style) = cli.query_style {
            self.news.query_style = style;
        }
        if let Some(model) = &cli.model {
            self.summarizer.model = model.clone();
        }
        if let Some(font) = &cli.font {
            self.cloud.font_path = Some(font.clone());
        }
        if let Some(n) = cli.max_results {
            self.news.max_results = n;
        }
        if let Some(dict) = &cli.lemma_dictionary {
            self.keywords.lemma_dictionary = Some(dict.clone());
        }
    }
}
