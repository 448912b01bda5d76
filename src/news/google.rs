//! Google News RSS search.
//!
//! Searches `news.google.com/rss/search` with the configured language and
//! region (`hl`, `gl`, `ceid`), then maps each `<item>` into an [`Article`]:
//!
//! - `description` arrives as escaped HTML and is reduced to plain text
//! - `<source url="…">Publisher</source>` becomes the publisher
//! - Google appends ` - Publisher` to titles; that suffix is optionally dropped
//!
//! Results are truncated to `max_results` in feed order.

use crate::config::NewsConfig;
use crate::error::NewsError;
use crate::models::Article;
use crate::news::NewsFetcher;
use crate::utils::{collapse_whitespace, truncate_for_log};
use quick_xml::de::from_str;
use reqwest::Client;
use scraper::Html;
use serde::Deserialize;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};
use url::Url;

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
    source: Option<Source>,
}

#[derive(Debug, Deserialize)]
struct Source {
    #[serde(rename = "$text")]
    name: Option<String>,
}

/// Google News RSS client.
#[derive(Debug, Clone)]
pub struct GoogleNews {
    client: Client,
    endpoint: String,
    language: String,
    country: String,
    max_results: usize,
    strip_publisher_suffix: bool,
}

impl GoogleNews {
    pub fn new(config: &NewsConfig) -> Self {
        Self {
            client: Client::new(),
            endpoint: config.endpoint.clone(),
            language: config.language.clone(),
            country: config.country.clone(),
            max_results: config.max_results,
            strip_publisher_suffix: config.strip_publisher_suffix,
        }
    }

    /// Search URL for `query`.
    pub fn feed_url(&self, query: &str) -> Result<Url, NewsError> {
        let ceid = format!("{}:{}", self.country, self.language);
        Url::parse_with_params(
            &self.endpoint,
            &[
                ("q", query),
                ("hl", self.language.as_str()),
                ("gl", self.country.as_str()),
                ("ceid", ceid.as_str()),
            ],
        )
        .map_err(|e| NewsError::Feed(format!("invalid endpoint {}: {e}", self.endpoint)))
    }
}

impl NewsFetcher for GoogleNews {
    #[instrument(level = "info", skip_all, fields(%query))]
    async fn fetch(&self, query: &str) -> Result<Vec<Article>, NewsError> {
        let t0 = Instant::now();
        let url = self.feed_url(query)?;
        debug!(%url, "Requesting news feed");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            warn!(status = status.as_u16(), "News feed request failed");
            return Err(NewsError::Status {
                status: status.as_u16(),
                body: truncate_for_log(&body, 500),
            });
        }

        let articles = parse_feed(&body, self.max_results, self.strip_publisher_suffix)?;
        info!(
            count = articles.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched news articles"
        );
        Ok(articles)
    }
}

/// Parse an RSS document into at most `max_results` articles.
pub fn parse_feed(
    xml: &str,
    max_results: usize,
    strip_publisher_suffix: bool,
) -> Result<Vec<Article>, NewsError> {
    let rss: Rss = from_str(xml).map_err(|e| NewsError::Feed(e.to_string()))?;

    let articles = rss
        .channel
        .items
        .into_iter()
        .take(max_results)
        .map(|item| {
            let publisher = item
                .source
                .and_then(|s| s.name)
                .map(|s| collapse_whitespace(&s))
                .unwrap_or_default();
            let mut title = collapse_whitespace(item.title.as_deref().unwrap_or_default());
            let mut description = item
                .description
                .as_deref()
                .map(html_to_text)
                .unwrap_or_default();
            if strip_publisher_suffix {
                title = strip_publisher(&title, &publisher);
                description = strip_publisher(&description, &publisher);
            }

            Article {
                title,
                description,
                url: item.link.unwrap_or_default(),
                publisher,
                published: item.pub_date,
            }
        })
        .collect();
    Ok(articles)
}

/// Reduce an HTML fragment to its visible text.
pub fn html_to_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let text = fragment.root_element().text().collect::<Vec<_>>().join(" ");
    collapse_whitespace(&text)
}

/// Remove a trailing publisher name (with or without a ` - ` separator).
fn strip_publisher(text: &str, publisher: &str) -> String {
    if publisher.is_empty() {
        return text.to_string();
    }
    let dashed = format!(" - {publisher}");
    if let Some(stripped) = text.strip_suffix(&dashed) {
        return stripped.trim_end().to_string();
    }
    match text.strip_suffix(publisher) {
        Some(stripped) if !stripped.trim().is_empty() && stripped.ends_with(' ') => {
            stripped.trim_end().to_string()
        }
        _ => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r##"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<rss version="2.0" xmlns:media="http://search.yahoo.com/mrss/">
  <channel>
    <generator>NFE/5.0</generator>
    <title>"deputado Arthur Lira" - Google Notícias</title>
    <link>https://news.google.com/search?q=deputado+Arthur+Lira</link>
    <language>pt-BR</language>
    <item>
      <title>Lira defende reforma tributária na Câmara - Folha de S.Paulo</title>
      <link>https://news.google.com/rss/articles/abc</link>
      <guid isPermaLink="false">abc</guid>
      <pubDate>Mon, 06 Oct 2025 14:00:00 GMT</pubDate>
      <description>&lt;a href="https://news.google.com/rss/articles/abc"&gt;Lira defende reforma tributária na Câmara&lt;/a&gt;&amp;nbsp;&amp;nbsp;&lt;font color="#6f6f6f"&gt;Folha de S.Paulo&lt;/font&gt;</description>
      <source url="https://www.folha.uol.com.br">Folha de S.Paulo</source>
    </item>
    <item>
      <title>Presidente da Câmara critica impostos - g1</title>
      <link>https://news.google.com/rss/articles/def</link>
      <pubDate>Sun, 05 Oct 2025 10:00:00 GMT</pubDate>
      <source url="https://g1.globo.com">g1</source>
    </item>
    <item>
      <title>Terceira notícia - CNN Brasil</title>
      <link>https://news.google.com/rss/articles/ghi</link>
      <description>Resumo &amp;amp; análise</description>
      <source url="https://www.cnnbrasil.com.br">CNN Brasil</source>
    </item>
  </channel>
</rss>"##;

    #[test]
    fn test_parse_feed_maps_fields() {
        let articles = parse_feed(FEED, 10, true).unwrap();
        assert_eq!(articles.len(), 3);

        let first = &articles[0];
        assert_eq!(first.title, "Lira defende reforma tributária na Câmara");
        assert_eq!(first.description, "Lira defende reforma tributária na Câmara");
        assert_eq!(first.publisher, "Folha de S.Paulo");
        assert_eq!(first.url, "https://news.google.com/rss/articles/abc");
        assert_eq!(first.published.as_deref(), Some("Mon, 06 Oct 2025 14:00:00 GMT"));
    }

    #[test]
    fn test_parse_feed_missing_description_defaults_to_empty() {
        let articles = parse_feed(FEED, 10, true).unwrap();
        assert_eq!(articles[1].description, "");
        assert!(!articles[1].has_description());
        assert_eq!(articles[1].title, "Presidente da Câmara critica impostos");
    }

    #[test]
    fn test_parse_feed_keeps_suffix_when_disabled() {
        let articles = parse_feed(FEED, 10, false).unwrap();
        assert_eq!(articles[2].title, "Terceira notícia - CNN Brasil");
    }

    #[test]
    fn test_parse_feed_truncates() {
        let articles = parse_feed(FEED, 2, true).unwrap();
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[1].publisher, "g1");
    }

    #[test]
    fn test_parse_feed_without_items() {
        let xml = r#"<rss version="2.0"><channel><title>vazio</title></channel></rss>"#;
        assert!(parse_feed(xml, 10, true).unwrap().is_empty());
    }

    #[test]
    fn test_parse_feed_rejects_garbage() {
        assert!(matches!(parse_feed("<html>", 10, true), Err(NewsError::Feed(_))));
    }

    #[test]
    fn test_html_to_text() {
        assert_eq!(
            html_to_text(r#"<a href="x">Título</a>&nbsp;&nbsp;<font>Jornal</font>"#),
            "Título Jornal"
        );
        assert_eq!(html_to_text("texto simples"), "texto simples");
    }

    #[test]
    fn test_feed_url_parameters() {
        let news = GoogleNews::new(&NewsConfig::default());
        let url = news.feed_url("\"Arthur Lira\" deputado federal").unwrap();
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("q".into(), "\"Arthur Lira\" deputado federal".into())));
        assert!(pairs.contains(&("hl".into(), "pt".into())));
        assert!(pairs.contains(&("gl".into(), "BR".into())));
        assert!(pairs.contains(&("ceid".into(), "BR:pt".into())));
    }

    #[test]
    fn test_strip_publisher() {
        assert_eq!(strip_publisher("Notícia - g1", "g1"), "Notícia");
        assert_eq!(strip_publisher("Notícia  g1", "g1"), "Notícia");
        assert_eq!(strip_publisher("g1", "g1"), "g1");
        assert_eq!(strip_publisher("Notícia", ""), "Notícia");
    }
}
