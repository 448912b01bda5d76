//! Markdown rendering of an analysis report.

use crate::models::{AnalysisReport, ArtifactOutcome};
use crate::outputs::{report_stem, TOP_KEYWORDS};
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

fn outcome_note<T>(outcome: &ArtifactOutcome<T>) -> Option<String> {
    match outcome {
        ArtifactOutcome::Ready { .. } => None,
        ArtifactOutcome::Skipped { reason } => Some(format!("_Not available: {reason}._")),
        ArtifactOutcome::Failed { error } => Some(format!("> **Error:** {error}")),
    }
}

/// Render `report` as a standalone Markdown document.
pub fn report_to_markdown(report: &AnalysisReport) -> String {
    let mut md = format!("# {}\n\n", report.subject);
    md.push_str(&format!(
        "_Query:_ `{}` · _Generated:_ {}\n\n",
        report.query, report.generated_at
    ));

    md.push_str("## Summary\n\n");
    match &report.summary {
        ArtifactOutcome::Ready { value } => md.push_str(&format!("{}\n\n", value.trim())),
        other => md.push_str(&format!("{}\n\n", outcome_note(other).unwrap_or_default())),
    }

    md.push_str("## Keywords\n\n");
    match &report.keywords {
        ArtifactOutcome::Ready { value } => {
            md.push_str("| Keyword | Count |\n|---------|-------|\n");
            for (keyword, count) in value.frequencies().into_iter().take(TOP_KEYWORDS) {
                md.push_str(&format!("| {keyword} | {count} |\n"));
            }
            md.push('\n');
        }
        other => md.push_str(&format!("{}\n\n", outcome_note(other).unwrap_or_default())),
    }

    md.push_str("## Word cloud\n\n");
    match &report.cloud {
        ArtifactOutcome::Ready { value } => {
            let file = value
                .file_name()
                .map(|f| f.to_string_lossy().into_owned())
                .unwrap_or_else(|| value.display().to_string());
            md.push_str(&format!("![Word cloud for {}]({file})\n\n", report.subject));
        }
        other => md.push_str(&format!("{}\n\n", outcome_note(other).unwrap_or_default())),
    }

    md.push_str(&format!("## Sources ({})\n\n", report.articles.len()));
    if report.articles.is_empty() {
        md.push_str("_No articles found._\n");
    }
    for article in &report.articles {
        let title = if article.title.is_empty() { "(untitled)" } else { article.title.as_str() };
        md.push_str(&format!("- [{title}]({})", article.url));
        if !article.publisher.is_empty() {
            md.push_str(&format!(" · {}", article.publisher));
        }
        if let Some(published) = &article.published {
            md.push_str(&format!(" · {published}"));
        }
        md.push('\n');
    }
    md
}

/// Write `report` to `{output_dir}/{slug}_{date}.md`.
#[instrument(level = "info", skip_all, fields(output_dir = %output_dir.display()))]
pub async fn write_report(report: &AnalysisReport, output_dir: &Path) -> Result<PathBuf, Box<dyn Error>> {
    fs::create_dir_all(output_dir).await?;
    let path = output_dir.join(format!("{}.md", report_stem(report)));
    fs::write(&path, report_to_markdown(report)).await?;
    info!(path = %path.display(), "Wrote Markdown report");
    Ok(path)
}
