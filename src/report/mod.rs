//! Comparison reporting: [`ComparisonReport`] built from a run, rendered as a
//! console table ([`render_text`]) or JSON ([`ComparisonReport::to_json`]).

pub mod summary;
pub mod text;

pub use summary::{ComparisonReport, LanguageReport, PredictorSummary, ReportRow, SampleReport};
pub use text::{render_text, verdict_label};

use crate::config::ReportFormat;

/// Render `report` in the requested format.
pub fn render(report: &ComparisonReport, format: ReportFormat, show_summary: bool) -> serde_json::Result<String> {
    match format {
        ReportFormat::Text => Ok(render_text(report, show_summary)),
        ReportFormat::Json => report.to_json(),
    }
}
