//! Report model built from a [`ComparisonRun`].
//!
//! Rows are grouped language → sample in run order; one
//! [`PredictorSummary`] per registered predictor aggregates its outcomes.

use serde::Serialize;

use crate::eval::{ComparisonRun, EvaluationResult, Verdict};

/// One predictor's measurement on one sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub predictor: String,
    pub probability: Option<f32>,
    pub threshold: Option<f32>,
    pub latency_ms: Option<f64>,
    pub verdict: Verdict,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&EvaluationResult> for ReportRow {
    fn from(r: &EvaluationResult) -> Self {
        Self {
            predictor: r.predictor().to_string(),
            probability: r.probability(),
            threshold: r.threshold(),
            latency_ms: r.latency_ms(),
            verdict: r.verdict(),
            error: r.error().map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleReport {
    /// 1-based.
    pub index: usize,
    pub utterance: String,
    pub rows: Vec<ReportRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanguageReport {
    pub tag: String,
    pub name: String,
    pub samples: Vec<SampleReport>,
}

/// Aggregate outcome of one predictor across the run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictorSummary {
    pub name: String,
    pub description: String,
    pub scope: String,
    pub evaluations: usize,
    pub end_of_turn: usize,
    pub not_end_of_turn: usize,
    pub undecidable: usize,
    pub errors: usize,
    /// Over scores that completed.
    pub mean_latency_ms: Option<f64>,
    pub max_latency_ms: Option<f64>,
}

impl PredictorSummary {
    fn collect<'a>(
        name: &str,
        description: &str,
        scope: String,
        results: impl Iterator<Item = &'a EvaluationResult>,
    ) -> Self {
        let mut summary = Self {
            name: name.to_string(),
            description: description.to_string(),
            scope,
            evaluations: 0,
            end_of_turn: 0,
            not_end_of_turn: 0,
            undecidable: 0,
            errors: 0,
            mean_latency_ms: None,
            max_latency_ms: None,
        };

        let mut latencies = Vec::new();
        for r in results {
            summary.evaluations += 1;
            match r.verdict() {
                Verdict::EndOfTurn => summary.end_of_turn += 1,
                Verdict::NotEndOfTurn => summary.not_end_of_turn += 1,
                Verdict::Undecidable => summary.undecidable += 1,
                Verdict::Error => summary.errors += 1,
            }
            if let Some(ms) = r.latency_ms() {
                latencies.push(ms);
            }
        }

        if !latencies.is_empty() {
            summary.mean_latency_ms = Some(latencies.iter().sum::<f64>() / latencies.len() as f64);
            summary.max_latency_ms = latencies.iter().copied().reduce(f64::max);
        }
        summary
    }
}

/// Everything the text and JSON renderers need.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonReport {
    pub languages: Vec<LanguageReport>,
    pub summary: Vec<PredictorSummary>,
}

impl ComparisonReport {
    pub fn from_run(run: &ComparisonRun) -> Self {
        let languages = run
            .languages()
            .iter()
            .map(|lang| {
                let mut samples: Vec<SampleReport> = Vec::new();
                for r in run.for_language(&lang.tag) {
                    match samples.last_mut() {
                        Some(s) if s.index == r.sample_index() => s.rows.push(r.into()),
                        _ => samples.push(SampleReport {
                            index: r.sample_index(),
                            utterance: r.utterance().to_string(),
                            rows: vec![r.into()],
                        }),
                    }
                }
                LanguageReport {
                    tag: lang.tag.clone(),
                    name: lang.name.clone(),
                    samples,
                }
            })
            .collect();

        let summary = run
            .predictors()
            .iter()
            .map(|p| {
                PredictorSummary::collect(
                    &p.name,
                    &p.description,
                    p.scope.to_string(),
                    run.for_predictor(&p.name),
                )
            })
            .collect();

        Self { languages, summary }
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
