//! Command-line interface definitions for Deputado News.
//!
//! Every option can also come from the YAML config file; flags given here
//! win over the file. The API key can be provided through the environment.

use crate::news::QueryStyle;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the Deputado News application.
///
/// # Examples
///
/// ```sh
/// # Interactive session over a roster spreadsheet
/// deputado_news --roster deputado.xls
///
/// # One-shot analysis, writing artifacts to ./out
/// deputado_news --roster deputados.csv --query "lira" -o ./out
///
/// # Free-text subject, no roster
/// deputado_news --query "Arthur Lira" --query-style federal
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Roster file (.csv, .xls, .xlsx or .ods) with a "Nome Parlamentar" or "Nome" column
    #[arg(short, long)]
    pub roster: Option<PathBuf>,

    /// Run once for this name and exit instead of starting the interactive loop
    #[arg(short, long)]
    pub query: Option<String>,

    /// Optional path to a config.yaml file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory for the word cloud image and reports
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    /// Gemini model name
    #[arg(long)]
    pub model: Option<String>,

    /// How the news search query is phrased
    #[arg(long, value_enum)]
    pub query_style: Option<QueryStyle>,

    /// Maximum number of articles to fetch
    #[arg(long)]
    pub max_results: Option<usize>,

    /// Drop keyword lemmas shorter than this many characters
    #[arg(long)]
    pub min_lemma_len: Option<usize>,

    /// Lemma dictionary (lemma<TAB>form per line) to extend the built-in table
    #[arg(long)]
    pub lemma_dictionary: Option<PathBuf>,

    /// TrueType/OpenType font used to draw the word cloud
    #[arg(long)]
    pub font: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "deputado_news",
            "--roster",
            "./deputado.xls",
            "--query",
            "lira",
        ]);

        assert_eq!(cli.roster, Some(PathBuf::from("./deputado.xls")));
        assert_eq!(cli.query.as_deref(), Some("lira"));
        assert!(cli.output_dir.is_none());
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from([
            "deputado_news",
            "-r",
            "/tmp/deputados.csv",
            "-o",
            "/tmp/out",
            "-c",
            "/tmp/config.yaml",
        ]);

        assert_eq!(cli.roster, Some(PathBuf::from("/tmp/deputados.csv")));
        assert_eq!(cli.output_dir, Some(PathBuf::from("/tmp/out")));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/config.yaml")));
    }

    #[test]
    fn test_query_style_values() {
        let cli = Cli::parse_from(["deputado_news", "--query-style", "deputado"]);
        assert_eq!(cli.query_style, Some(QueryStyle::Deputado));
        assert!(Cli::try_parse_from(["deputado_news", "--query-style", "senador"]).is_err());
    }
}
