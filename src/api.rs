//! Summarization through a generative-language API.
//!
//! # Architecture
//!
//! - [`Summarizer`]: core trait, "send a prompt, get text back"
//! - [`GeminiClient`]: Google Gemini `generateContent` implementation
//! - [`build_prompt`]: wraps the article block in the fixed instruction template
//! - [`summarize_articles`]: entry point used by the pipeline; times and logs
//!   the call and hands any failure back unchanged
//!
//! There is deliberately no retry loop: a failed call is reported once to the
//! caller, whose error message is shown to the user verbatim.

use crate::cache::Memo;
use crate::config::SummarizerConfig;
use crate::error::{ConfigError, SummaryError};
use crate::utils::truncate_for_log;
use once_cell::sync::Lazy;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};

static CREDENTIALS: Lazy<Memo<String, String>> = Lazy::new(|| Memo::new("credential"));

/// Trait for async summarization.
///
/// Implementors send a fully formed prompt to a language model and return
/// its text answer.
pub trait Summarizer {
    async fn ask(&self, prompt: &str) -> Result<String, SummaryError>;
}

/// Wrap the article block in the instruction template.
///
/// The template frames the model as a political news assistant, names the
/// subject, lists the articles and ends on the `Resumo:` cue.
pub fn build_prompt(prompt_block: &str, subject: &str) -> String {
    format!(
        "Você é um assistente de notícias políticas. Com base nos seguintes artigos sobre {subject},\n\
         forneça um resumo conciso e informativo dos principais pontos.\n\
         \n\
         Artigos:\n\
         {prompt_block}\n\
         \n\
         Resumo:\n"
    )
}

/// Read the API key from `variable`, once per process.
///
/// # Errors
///
/// [`ConfigError::MissingCredential`] when the variable is unset or blank.
pub fn credential(variable: &str) -> Result<Arc<String>, ConfigError> {
    CREDENTIALS.get_or_try_init(&variable.to_string(), || {
        std::env::var(variable)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ConfigError::MissingCredential {
                variable: variable.to_string(),
            })
    })
}

/// Forget every cached credential.
pub fn reset_credentials() {
    CREDENTIALS.reset();
}

/// Google Gemini client.
///
/// The API key is resolved at call time, so a missing key only fails the
/// summary and never the rest of the analysis.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    endpoint: String,
    model: String,
    api_key_env: String,
    /// Key given on the command line; wins over the environment.
    explicit_key: Option<String>,
}

impl GeminiClient {
    pub fn new(config: &SummarizerConfig, explicit_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key_env: config.api_key_env.clone(),
            explicit_key: explicit_key.filter(|k| !k.trim().is_empty()),
        }
    }

    fn api_key(&self) -> Result<Arc<String>, ConfigError> {
        match &self.explicit_key {
            Some(key) => Ok(Arc::new(key.clone())),
            None => credential(&self.api_key_env),
        }
    }

    pub fn generate_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

impl Summarizer for GeminiClient {
    #[instrument(level = "info", skip_all, fields(model = %self.model))]
    async fn ask(&self, prompt: &str) -> Result<String, SummaryError> {
        let api_key = self.api_key()?;
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let t0 = Instant::now();
        let response = self
            .client
            .post(self.generate_url())
            .header("x-goog-api-key", api_key.as_str())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                status = status.as_u16(),
                elapsed_ms = t0.elapsed().as_millis() as u64,
                "Gemini call failed"
            );
            return Err(SummaryError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response.json().await?;
        debug!(elapsed_ms = t0.elapsed().as_millis() as u64, "Gemini call returned");
        parsed.into_text()
    }
}

/// Summarize the articles about `subject`.
///
/// Builds the prompt, calls `summarizer` once and logs the outcome.
#[instrument(level = "info", skip_all, fields(%subject))]
pub async fn summarize_articles<S: Summarizer>(
    summarizer: &S,
    prompt_block: &str,
    subject: &str,
) -> Result<String, SummaryError> {
    let t0 = Instant::now();
    let prompt = build_prompt(prompt_block, subject);
    let res = summarizer.ask(&prompt).await;
    let dt = t0.elapsed();

    match &res {
        Ok(summary) => info!(
            elapsed_ms_total = dt.as_millis() as u64,
            preview = %truncate_for_log(summary, 120),
            "Summary generated"
        ),
        Err(e) => {
            error!(elapsed_ms_total = dt.as_millis() as u64, error = %e, "Summary failed")
        }
    }
    res
}

// --- Gemini request/response types ---

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate.
    fn into_text(self) -> Result<String, SummaryError> {
        let block_reason = self.prompt_feedback.and_then(|f| f.block_reason);
        let Some(candidate) = self.candidates.into_iter().next() else {
            return Err(SummaryError::EmptyResponse {
                reason: block_reason.unwrap_or_else(|| "no candidates".to_string()),
            });
        };

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();
        if text.trim().is_empty() {
            return Err(SummaryError::EmptyResponse {
                reason: candidate
                    .finish_reason
                    .unwrap_or_else(|| "empty candidate".to_string()),
            });
        }
        Ok(text.trim().to_string())
    }
}
