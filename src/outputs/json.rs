//! JSON report output.
//!
//! The whole [`AnalysisReport`] is serialized as is, including the status of
//! each artifact, so a failed summary shows up as
//! `{"status": "failed", "error": "..."}` rather than disappearing.

use crate::models::AnalysisReport;
use crate::outputs::report_stem;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

/// Write `report` to `{output_dir}/{slug}_{date}.json`.
///
/// # Returns
///
/// The path written, or an error if directory creation or file writing fails.
#[instrument(level = "info", skip_all, fields(output_dir = %output_dir.display()))]
pub async fn write_report(report: &AnalysisReport, output_dir: &Path) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(report)?;

    if let Err(e) = fs::create_dir_all(output_dir).await {
        error!(error = %e, "Failed to create output dir");
        return Err(e.into());
    }

    let path = output_dir.join(format!("{}.json", report_stem(report)));
    fs::write(&path, json).await?;
    info!(path = %path.display(), "Wrote JSON report");

    Ok(path)
}
