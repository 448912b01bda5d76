//! Output generation for an [`AnalysisReport`].
//!
//! # Submodules
//!
//! - [`json`]: writes the report as JSON for other tools
//! - [`markdown`]: renders the report as a Markdown document
//! - [`terminal`]: plain-text rendering for the interactive loop
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── nuvem_arthur_lira.png             # word cloud (written by the renderer)
//! ├── arthur_lira_2025-05-06.json       # report
//! └── arthur_lira_2025-05-06.md         # report
//! ```

pub mod json;
pub mod markdown;
pub mod terminal;

use crate::models::AnalysisReport;
use crate::utils::subject_slug;
use chrono::{DateTime, Local, NaiveDate};

/// How many keywords the text reports list.
pub const TOP_KEYWORDS: usize = 15;

/// Local date the report was generated on, falling back to today.
pub fn report_date(report: &AnalysisReport) -> NaiveDate {
    DateTime::parse_from_rfc3339(&report.generated_at)
        .map(|d| d.date_naive())
        .unwrap_or_else(|_| Local::now().date_naive())
}

/// File stem shared by the JSON and Markdown reports: `{slug}_{date}`.
pub fn report_stem(report: &AnalysisReport) -> String {
    format!("{}_{}", subject_slug(&report.subject), report_date(report))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_stem_uses_report_date() {
        assert_eq!(report_stem(&fixtures::report()), "arthur_lira_2025-05-06");
    }

    #[test]
    fn test_report_date_falls_back_to_today() {
        let mut report = fixtures::report();
        report.generated_at = "not a date".to_string();
        assert_eq!(report_date(&report), Local::now().date_naive());
    }
}
