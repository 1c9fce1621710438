//! Console rendering of a [`ComparisonReport`].

use std::fmt::Write;

use crate::eval::Verdict;
use crate::report::summary::{ComparisonReport, PredictorSummary, ReportRow};

const WIDTH: usize = 80;

/// Short outcome label.  An undecidable row is never labelled "not EOT".
pub fn verdict_label(row: &ReportRow) -> String {
    match row.verdict {
        Verdict::EndOfTurn => "EOT".into(),
        Verdict::NotEndOfTurn => "not EOT".into(),
        Verdict::Undecidable => "undecidable".into(),
        Verdict::Error => format!("error: {}", row.error.as_deref().unwrap_or("unknown")),
    }
}

fn format_row(row: &ReportRow, name_width: usize) -> String {
    let label = format!("{}:", row.predictor);
    match (row.probability, row.latency_ms) {
        (Some(p), Some(ms)) => format!(
            "  • {label:<name_width$} {p:.4} ({ms:.2}ms) - {}",
            verdict_label(row)
        ),
        _ => format!("  • {label:<name_width$} {}", verdict_label(row)),
    }
}

fn format_summary(s: &PredictorSummary) -> String {
    let mut out = format!("  • {}: ", s.name);
    if s.description.is_empty() {
        let _ = write!(out, "[{}]", s.scope);
    } else {
        let _ = write!(out, "{} [{}]", s.description, s.scope);
    }
    let _ = write!(
        out,
        "\n      {} evaluated: {} EOT, {} not EOT, {} undecidable, {} errors",
        s.evaluations, s.end_of_turn, s.not_end_of_turn, s.undecidable, s.errors
    );
    if let (Some(mean), Some(max)) = (s.mean_latency_ms, s.max_latency_ms) {
        let _ = write!(out, "; latency mean {mean:.2}ms, max {max:.2}ms");
    }
    out
}

/// Plain-text report, optionally followed by the per-predictor summary.
pub fn render_text(report: &ComparisonReport, show_summary: bool) -> String {
    let heavy = "=".repeat(WIDTH);
    let light = "─".repeat(WIDTH);

    let name_width = report
        .languages
        .iter()
        .flat_map(|l| &l.samples)
        .flat_map(|s| &s.rows)
        .map(|r| r.predictor.chars().count() + 1)
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    let _ = writeln!(out, "{heavy}\nTurn Detection Model Comparison\n{heavy}");

    for lang in &report.languages {
        let _ = writeln!(
            out,
            "\n{light}\nTesting: {} ({})\n{light}",
            lang.name,
            lang.tag.to_uppercase()
        );
        for sample in &lang.samples {
            let _ = writeln!(out, "\nSample {}: \"{}\"", sample.index, sample.utterance);
            for row in &sample.rows {
                let _ = writeln!(out, "{}", format_row(row, name_width));
            }
        }
    }

    if show_summary && !report.summary.is_empty() {
        let _ = writeln!(out, "\n{heavy}\nModel Summary:");
        for s in &report.summary {
            let _ = writeln!(out, "{}", format_summary(s));
        }
    }
    let _ = writeln!(out, "{heavy}");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::summary::{LanguageReport, SampleReport};

    fn row(predictor: &str, probability: Option<f32>, verdict: Verdict, error: Option<&str>) -> ReportRow {
        ReportRow {
            predictor: predictor.into(),
            probability,
            threshold: None,
            latency_ms: probability.map(|_| 12.3456),
            verdict,
            error: error.map(str::to_string),
        }
    }

    fn summary(name: &str) -> PredictorSummary {
        PredictorSummary {
            name: name.into(),
            description: "Supports 23+ languages".into(),
            scope: "all languages".into(),
            evaluations: 4,
            end_of_turn: 1,
            not_end_of_turn: 1,
            undecidable: 1,
            errors: 1,
            mean_latency_ms: Some(10.0),
            max_latency_ms: Some(15.5),
        }
    }

    fn report() -> ComparisonReport {
        ComparisonReport {
            languages: vec![LanguageReport {
                tag: "vi".into(),
                name: "Vietnamese".into(),
                samples: vec![SampleReport {
                    index: 1,
                    utterance: "Em đang cần".into(),
                    rows: vec![
                        row("Namo", Some(0.07312), Verdict::NotEndOfTurn, None),
                        row("LiveKit", Some(0.5), Verdict::Undecidable, None),
                        row("Broken", None, Verdict::Error, Some("inference timed out")),
                        row("Yes", Some(0.91), Verdict::EndOfTurn, None),
                    ],
                }],
            }],
            summary: vec![summary("Namo")],
        }
    }

    #[test]
    fn rows_use_fixed_precision() {
        let text = render_text(&report(), false);
        assert!(text.contains("Testing: Vietnamese (VI)"));
        assert!(text.contains("Sample 1: \"Em đang cần\""));
        assert!(text.contains("0.0731 (12.35ms) - not EOT"));
        assert!(text.contains("0.9100 (12.35ms) - EOT"));
    }

    #[test]
    fn undecidable_is_never_not_eot() {
        let text = render_text(&report(), false);
        let line = text.lines().find(|l| l.contains("LiveKit")).unwrap();
        assert!(line.ends_with("- undecidable"));
        assert!(!line.contains("not EOT"));
    }

    #[test]
    fn errors_show_cause() {
        let text = render_text(&report(), false);
        let line = text.lines().find(|l| l.contains("Broken")).unwrap();
        assert!(line.ends_with("error: inference timed out"));
    }

    #[test]
    fn summary_is_optional() {
        assert!(!render_text(&report(), false).contains("Model Summary"));

        let text = render_text(&report(), true);
        assert!(text.contains("Model Summary:"));
        assert!(text.contains("Namo: Supports 23+ languages [all languages]"));
        assert!(text.contains("1 undecidable, 1 errors; latency mean 10.00ms, max 15.50ms"));
    }
}
