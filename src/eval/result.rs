//! Measurement records produced by the evaluation engine.
//!
//! An [`EvaluationResult`] can only be built through its constructors, which
//! derive `is_end_of_turn` from probability and threshold.  Once built it is
//! never modified; a new engine run produces a new [`ComparisonRun`].

use serde::Serialize;

use crate::predictor::LanguageScope;

// ---------------------------------------------------------------------------
// Decision rule
// ---------------------------------------------------------------------------

/// `probability >= threshold`, or `None` when either operand is missing.
///
/// A missing threshold is *undecidable*: it never defaults to `false`.
pub fn decide(probability: Option<f32>, threshold: Option<f32>) -> Option<bool> {
    match (probability, threshold) {
        (Some(p), Some(t)) => Some(p >= t),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Verdict
// ---------------------------------------------------------------------------

/// Display-oriented classification of a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    EndOfTurn,
    NotEndOfTurn,
    /// Scored, but no threshold for the language.
    Undecidable,
    /// The predictor failed.
    Error,
}

// ---------------------------------------------------------------------------
// EvaluationResult
// ---------------------------------------------------------------------------

/// One measurement of one predictor on one sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationResult {
    language: String,
    sample_index: usize,
    utterance: String,
    predictor: String,
    probability: Option<f32>,
    threshold: Option<f32>,
    is_end_of_turn: Option<bool>,
    latency_ms: Option<f64>,
    error: Option<String>,
}

/// Identifies the (language, sample, predictor) a result belongs to.
#[derive(Debug, Clone)]
pub(crate) struct ResultKey {
    pub language: String,
    pub sample_index: usize,
    pub utterance: String,
    pub predictor: String,
}

impl EvaluationResult {
    /// Successful score; `threshold` may still be undefined.
    pub(crate) fn scored(
        key: ResultKey,
        probability: f32,
        threshold: Option<f32>,
        latency_ms: f64,
    ) -> Self {
        Self {
            language: key.language,
            sample_index: key.sample_index,
            utterance: key.utterance,
            predictor: key.predictor,
            probability: Some(probability),
            threshold,
            is_end_of_turn: decide(Some(probability), threshold),
            latency_ms: Some(latency_ms.max(0.0)),
            error: None,
        }
    }

    /// Score succeeded but the threshold lookup failed.
    pub(crate) fn threshold_failed(
        key: ResultKey,
        probability: f32,
        latency_ms: f64,
        error: String,
    ) -> Self {
        Self {
            error: Some(error),
            ..Self::scored(key, probability, None, latency_ms)
        }
    }

    /// Scoring failed: nothing but the failure cause is recorded.
    pub(crate) fn failed(key: ResultKey, error: String) -> Self {
        Self {
            language: key.language,
            sample_index: key.sample_index,
            utterance: key.utterance,
            predictor: key.predictor,
            probability: None,
            threshold: None,
            is_end_of_turn: None,
            latency_ms: None,
            error: Some(error),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// 1-based position of the utterance within its language block.
    pub fn sample_index(&self) -> usize {
        self.sample_index
    }

    pub fn utterance(&self) -> &str {
        &self.utterance
    }

    pub fn predictor(&self) -> &str {
        &self.predictor
    }

    pub fn probability(&self) -> Option<f32> {
        self.probability
    }

    pub fn threshold(&self) -> Option<f32> {
        self.threshold
    }

    pub fn is_end_of_turn(&self) -> Option<bool> {
        self.is_end_of_turn
    }

    /// Wall-clock time of the scoring call; `None` when scoring failed.
    pub fn latency_ms(&self) -> Option<f64> {
        self.latency_ms
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn verdict(&self) -> Verdict {
        match (self.probability, self.is_end_of_turn) {
            (None, _) => Verdict::Error,
            (Some(_), Some(true)) => Verdict::EndOfTurn,
            (Some(_), Some(false)) => Verdict::NotEndOfTurn,
            (Some(_), None) if self.error.is_some() => Verdict::Error,
            (Some(_), None) => Verdict::Undecidable,
        }
    }
}

// ---------------------------------------------------------------------------
// ComparisonRun
// ---------------------------------------------------------------------------

/// Registration details of a predictor that took part in a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictorInfo {
    pub name: String,
    pub description: String,
    pub scope: LanguageScope,
}

/// A language block as it was evaluated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanguageInfo {
    pub tag: String,
    pub name: String,
    pub sample_count: usize,
}

/// Every result of one engine run, in language → sample → predictor order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRun {
    languages: Vec<LanguageInfo>,
    predictors: Vec<PredictorInfo>,
    results: Vec<EvaluationResult>,
}

impl ComparisonRun {
    pub(crate) fn new(
        languages: Vec<LanguageInfo>,
        predictors: Vec<PredictorInfo>,
        results: Vec<EvaluationResult>,
    ) -> Self {
        Self {
            languages,
            predictors,
            results,
        }
    }

    pub fn languages(&self) -> &[LanguageInfo] {
        &self.languages
    }

    pub fn predictors(&self) -> &[PredictorInfo] {
        &self.predictors
    }

    pub fn results(&self) -> &[EvaluationResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Look up the result for `(language, sample_index, predictor)`.
    pub fn get(&self, language: &str, sample_index: usize, predictor: &str) -> Option<&EvaluationResult> {
        self.results.iter().find(|r| {
            r.language == language && r.sample_index == sample_index && r.predictor == predictor
        })
    }

    pub fn for_predictor<'a>(&'a self, predictor: &'a str) -> impl Iterator<Item = &'a EvaluationResult> + 'a {
        self.results.iter().filter(move |r| r.predictor == predictor)
    }

    pub fn for_language<'a>(&'a self, language: &'a str) -> impl Iterator<Item = &'a EvaluationResult> + 'a {
        self.results.iter().filter(move |r| r.language == language)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> ResultKey {
        ResultKey {
            language: "en".into(),
            sample_index: 1,
            utterance: "Hello, how are you?".into(),
            predictor: "stub".into(),
        }
    }

    #[test]
    fn decide_is_non_strict() {
        assert_eq!(decide(Some(0.92), Some(0.8)), Some(true));
        assert_eq!(decide(Some(0.5), Some(0.8)), Some(false));
        assert_eq!(decide(Some(0.8), Some(0.8)), Some(true));
    }

    #[test]
    fn decide_without_threshold_is_undecidable() {
        assert_eq!(decide(Some(0.99), None), None);
        assert_eq!(decide(None, Some(0.5)), None);
        assert_eq!(decide(None, None), None);
    }

    #[test]
    fn scored_derives_decision() {
        let r = EvaluationResult::scored(key(), 0.92, Some(0.8), 12.5);
        assert_eq!(r.is_end_of_turn(), Some(true));
        assert_eq!(r.verdict(), Verdict::EndOfTurn);
        assert_eq!(r.latency_ms(), Some(12.5));
        assert!(r.error().is_none());
    }

    #[test]
    fn scored_without_threshold_is_undecidable_not_false() {
        let r = EvaluationResult::scored(key(), 0.3, None, 1.0);
        assert_eq!(r.probability(), Some(0.3));
        assert_eq!(r.is_end_of_turn(), None);
        assert_eq!(r.verdict(), Verdict::Undecidable);
    }

    #[test]
    fn threshold_failure_keeps_probability() {
        let r = EvaluationResult::threshold_failed(key(), 0.7, 3.0, "boom".into());
        assert_eq!(r.probability(), Some(0.7));
        assert_eq!(r.threshold(), None);
        assert_eq!(r.is_end_of_turn(), None);
        assert_eq!(r.latency_ms(), Some(3.0));
        assert_eq!(r.verdict(), Verdict::Error);
    }

    #[test]
    fn failed_result_has_no_measurements() {
        let r = EvaluationResult::failed(key(), "backend down".into());
        assert_eq!(r.probability(), None);
        assert_eq!(r.threshold(), None);
        assert_eq!(r.is_end_of_turn(), None);
        assert_eq!(r.latency_ms(), None);
        assert_eq!(r.error(), Some("backend down"));
        assert_eq!(r.verdict(), Verdict::Error);
    }

    #[test]
    fn negative_latency_is_clamped() {
        let r = EvaluationResult::scored(key(), 0.5, Some(0.5), -0.001);
        assert_eq!(r.latency_ms(), Some(0.0));
    }

    #[test]
    fn run_lookup_by_key() {
        let mut other = key();
        other.predictor = "other".into();
        let run = ComparisonRun::new(
            vec![],
            vec![],
            vec![
                EvaluationResult::scored(key(), 0.9, Some(0.5), 1.0),
                EvaluationResult::failed(other, "x".into()),
            ],
        );
        assert_eq!(run.len(), 2);
        assert_eq!(run.get("en", 1, "other").unwrap().verdict(), Verdict::Error);
        assert!(run.get("en", 2, "stub").is_none());
        assert_eq!(run.for_predictor("stub").count(), 1);
        assert_eq!(run.for_language("en").count(), 2);
        assert_eq!(run.for_language("vi").count(), 0);
    }
}
