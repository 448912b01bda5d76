//! # Deputado News
//!
//! Looks up a Brazilian legislator, fetches recent news about them, asks
//! Gemini for a summary and draws a word cloud of the coverage.
//!
//! ## Usage
//!
//! ```sh
//! deputado_news --roster deputados.csv            # interactive
//! deputado_news --roster deputados.csv -q lira    # one-shot
//! deputado_news -q "Tabata Amaral"                # free-text subject
//! ```
//!
//! ## Architecture
//!
//! 1. **Selection**: resolve the typed name against the roster (or take it verbatim)
//! 2. **Fetching**: Google News RSS search restricted to Portuguese/Brazil
//! 3. **Aggregation**: corpus for keywords, prompt block for the summary
//! 4. **Artifacts**: summary, keyword stream and word cloud, each failing on its own
//! 5. **Output**: terminal report plus JSON and Markdown files

use clap::Parser;
use std::error::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod aggregate;
mod api;
mod cache;
mod cli;
mod cloud;
mod config;
mod error;
mod keywords;
mod models;
mod news;
mod outputs;
mod pipeline;
mod roster;
mod session;
mod utils;

use api::{GeminiClient, Summarizer};
use cli::Cli;
use cloud::render::RasterRenderer;
use cloud::CloudRenderer;
use config::{AppConfig, OutputConfig};
use keywords::Extractor;
use models::AnalysisReport;
use news::google::GoogleNews;
use news::NewsFetcher;
use outputs::{json, markdown, terminal};
use pipeline::Pipeline;
use session::{Action, Feedback, Session};
use utils::ensure_writable_dir;

const HELP: &str = "Type a name to search for it. Commands:
  :load <file>   load a roster (.csv, .xls, .xlsx, .ods)
  :analyze       analyze the selected name again
  :reset         forget the roster and selection
  :help          show this text
  :quit          exit";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    if let Ok(path) = dotenvy::dotenv() {
        debug!(path = %path.display(), "Loaded .env");
    }

    let start_time = std::time::Instant::now();
    info!("deputado_news starting up");

    let args = Cli::parse();
    debug!(?args.roster, ?args.query, ?args.config, "Parsed CLI arguments");

    let mut config = AppConfig::load(args.config.as_deref())?;
    config.apply_cli(&args);

    if let Err(e) = ensure_writable_dir(&config.output.directory).await {
        error!(
            path = %config.output.directory.display(),
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let pipeline = Pipeline::new(
        GoogleNews::new(&config.news),
        GeminiClient::new(&config.summarizer, args.gemini_api_key.clone()),
        Extractor::from_config(&config.keywords),
        RasterRenderer::new(config.cloud.clone()),
        config.news.query_style,
        config.output.directory.clone(),
    );
    let mut session = Session::new();

    if let Some(path) = &args.roster {
        let feedback = session.handle(Action::LoadRoster(path.clone()), &pipeline).await;
        println!("{}", terminal::render_feedback(&feedback));
        if let (Feedback::Failed { message }, Some(_)) = (&feedback, &args.query) {
            return Err(message.clone().into());
        }
    }

    match &args.query {
        Some(query) => {
            let feedback = run_query(&mut session, query, &pipeline, &config.output).await;
            one_shot_result(&feedback)?;
        }
        None => interactive(&mut session, &pipeline, &config.output).await?,
    }

    let elapsed = start_time.elapsed();
    info!(?elapsed, secs = elapsed.as_secs(), "Execution complete");
    Ok(())
}

/// Exit status of a one-shot run: anything short of a report is an error.
fn one_shot_result(feedback: &Feedback) -> Result<(), Box<dyn Error>> {
    match feedback {
        Feedback::Report(_) => Ok(()),
        Feedback::NotFound { query } => Err(format!("no name matches \"{query}\"").into()),
        Feedback::Ambiguous { total, .. } => {
            Err(format!("{total} names match; use a more specific --query").into())
        }
        Feedback::Failed { message } => Err(message.clone().into()),
        other => Err(format!("no analysis was run ({other:?})").into()),
    }
}

/// Select `query` and, if it names exactly one subject, analyze it.
async fn run_query<N, S, R>(
    session: &mut Session,
    query: &str,
    pipeline: &Pipeline<N, S, R>,
    output: &OutputConfig,
) -> Feedback
where
    N: NewsFetcher,
    S: Summarizer,
    R: CloudRenderer,
{
    let feedback = session.handle(Action::Query(query.to_string()), pipeline).await;
    println!("{}", terminal::render_feedback(&feedback));
    if !matches!(feedback, Feedback::Selected { .. }) {
        return feedback;
    }
    analyze(session, pipeline, output).await
}

async fn analyze<N, S, R>(session: &mut Session, pipeline: &Pipeline<N, S, R>, output: &OutputConfig) -> Feedback
where
    N: NewsFetcher,
    S: Summarizer,
    R: CloudRenderer,
{
    let feedback = session.handle(Action::Analyze, pipeline).await;
    println!("{}", terminal::render_feedback(&feedback));
    if let Feedback::Report(report) = &feedback {
        write_reports(report, output).await;
    }
    feedback
}

/// Write the enabled report files; failures are logged, never fatal.
#[instrument(level = "info", skip_all, fields(subject = %report.subject))]
async fn write_reports(report: &AnalysisReport, output: &OutputConfig) {
    if output.write_json {
        match json::write_report(report, &output.directory).await {
            Ok(path) => println!("JSON report: {}", path.display()),
            Err(e) => error!(error = %e, "Failed to write JSON report"),
        }
    }
    if output.write_markdown {
        match markdown::write_report(report, &output.directory).await {
            Ok(path) => println!("Markdown report: {}", path.display()),
            Err(e) => error!(error = %e, "Failed to write Markdown report"),
        }
    }
}

/// Line-driven loop over stdin until `:quit` or end of input.
async fn interactive<N, S, R>(
    session: &mut Session,
    pipeline: &Pipeline<N, S, R>,
    output: &OutputConfig,
) -> Result<(), Box<dyn Error>>
where
    N: NewsFetcher,
    S: Summarizer,
    R: CloudRenderer,
{
    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
        match command {
            ":quit" | ":q" => break,
            ":help" => println!("{HELP}"),
            ":load" if !rest.trim().is_empty() => {
                let feedback = session
                    .handle(Action::LoadRoster(rest.trim().into()), pipeline)
                    .await;
                println!("{}", terminal::render_feedback(&feedback));
            }
            ":load" => println!("Usage: :load <file>"),
            ":analyze" => {
                analyze(session, pipeline, output).await;
            }
            ":reset" => {
                let feedback = session.handle(Action::Reset, pipeline).await;
                println!("{}", terminal::render_feedback(&feedback));
            }
            other if other.starts_with(':') => {
                warn!(command = other, "Unknown command");
                println!("Unknown command {other}. Type :help for the list.");
            }
            _ => {
                run_query(session, line, pipeline, output).await;
            }
        }
        debug!(state = session.state().name(), "Awaiting input");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::fakes::*;

    fn fakes() -> Pipeline<FixedNews, CannedSummarizer, RecordingRenderer> {
        pipeline(
            FixedNews {
                articles: vec![article("Reforma", "Plenário vota reforma tributária")],
                ..FixedNews::default()
            },
            CannedSummarizer::default(),
            RecordingRenderer::default(),
        )
    }

    fn no_files() -> OutputConfig {
        OutputConfig {
            write_json: false,
            write_markdown: false,
            ..OutputConfig::default()
        }
    }

    async fn roster_session(p: &Pipeline<FixedNews, CannedSummarizer, RecordingRenderer>) -> (Session, tempfile::NamedTempFile) {
        use std::io::Write;
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all("Nome\nArthur Lira\nArthur Maia\nTabata Amaral\n".as_bytes()).unwrap();
        let mut session = Session::new();
        session.handle(Action::LoadRoster(file.path().to_path_buf()), p).await;
        (session, file)
    }

    #[tokio::test]
    async fn test_one_shot_unmatched_name_is_an_error() {
        let p = fakes();
        let (mut session, _file) = roster_session(&p).await;
        let feedback = run_query(&mut session, "ninguém", &p, &no_files()).await;
        assert!(matches!(feedback, Feedback::NotFound { .. }));
        assert!(one_shot_result(&feedback).is_err());
        assert_eq!(p.news_calls(), 0);
    }

    #[tokio::test]
    async fn test_one_shot_ambiguous_name_is_an_error() {
        let p = fakes();
        let (mut session, _file) = roster_session(&p).await;
        let feedback = run_query(&mut session, "arthur", &p, &no_files()).await;
        assert!(matches!(feedback, Feedback::Ambiguous { total: 2, .. }));
        let err = one_shot_result(&feedback).unwrap_err();
        assert!(err.to_string().contains("2 names match"));
    }

    #[tokio::test]
    async fn test_one_shot_unique_name_succeeds() {
        let p = fakes();
        let (mut session, _file) = roster_session(&p).await;
        let feedback = run_query(&mut session, "tabata", &p, &no_files()).await;
        assert!(matches!(feedback, Feedback::Report(_)));
        assert!(one_shot_result(&feedback).is_ok());
        assert_eq!(p.news_calls(), 1);
    }

    #[test]
    fn test_one_shot_failure_is_an_error() {
        let feedback = Feedback::Failed {
            message: "please type a name to search for".to_string(),
        };
        assert_eq!(
            one_shot_result(&feedback).unwrap_err().to_string(),
            "please type a name to search for"
        );
    }
}
