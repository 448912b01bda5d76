//! Plain-text rendering for the interactive loop.
//!
//! Everything here goes to stdout; logs go to stderr.

use crate::models::{AnalysisReport, ArtifactOutcome};
use crate::outputs::TOP_KEYWORDS;
use crate::session::Feedback;

fn outcome_line<T>(label: &str, outcome: &ArtifactOutcome<T>) -> Option<String> {
    match outcome {
        ArtifactOutcome::Ready { .. } => None,
        ArtifactOutcome::Skipped { reason } => Some(format!("{label}: {reason}")),
        ArtifactOutcome::Failed { error } => Some(format!("{label} failed: {error}")),
    }
}

pub fn render_report(report: &AnalysisReport) -> String {
    let mut out = format!("=== {} ===\n\n", report.subject);

    out.push_str("Summary\n-------\n");
    match &report.summary {
        ArtifactOutcome::Ready { value } => out.push_str(value.trim()),
        other => out.push_str(&outcome_line("Summary", other).unwrap_or_default()),
    }
    out.push_str("\n\n");

    out.push_str("Top keywords\n------------\n");
    match &report.keywords {
        ArtifactOutcome::Ready { value } => {
            let top = value.frequencies();
            let width = top.iter().take(TOP_KEYWORDS).map(|(k, _)| k.chars().count()).max().unwrap_or(0);
            for (keyword, count) in top.into_iter().take(TOP_KEYWORDS) {
                out.push_str(&format!("  {keyword:<width$}  {count}\n"));
            }
        }
        other => {
            out.push_str(&outcome_line("Keywords", other).unwrap_or_default());
            out.push('\n');
        }
    }
    out.push('\n');

    match &report.cloud {
        ArtifactOutcome::Ready { value } => out.push_str(&format!("Word cloud: {}\n\n", value.display())),
        other => out.push_str(&format!("{}\n\n", outcome_line("Word cloud", other).unwrap_or_default())),
    }

    out.push_str(&format!("Sources ({})\n-------\n", report.articles.len()));
    for (i, article) in report.articles.iter().enumerate() {
        out.push_str(&format!("{:>2}. {}", i + 1, article.title));
        if !article.publisher.is_empty() {
            out.push_str(&format!(" ({})", article.publisher));
        }
        out.push_str(&format!("\n    {}\n", article.url));
    }
    out
}

/// One-shot text for a session response. Reports use [`render_report`].
pub fn render_feedback(feedback: &Feedback) -> String {
    match feedback {
        Feedback::RosterLoaded { rows, name_column } => {
            format!("Roster loaded: {rows} names (column \"{name_column}\").")
        }
        Feedback::Selected { subject } => format!("Selected: {subject}"),
        Feedback::NotFound { query } => format!("No name matches \"{query}\". Try another search."),
        Feedback::Ambiguous { candidates, total } => {
            let mut out = format!("{total} names match; refine your search:\n");
            for name in candidates {
                out.push_str(&format!("  - {name}\n"));
            }
            if *total > candidates.len() {
                out.push_str(&format!("  … and {} more\n", total - candidates.len()));
            }
            out
        }
        Feedback::Report(report) => render_report(report),
        Feedback::NothingToAnalyze => "Select a name first.".to_string(),
        Feedback::Failed { message } => format!("Error: {message}"),
        Feedback::Cleared => "Session cleared.".to_string(),
    }
}
