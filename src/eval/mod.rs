//! Comparison runs: fixtures in, one [`EvaluationResult`] per applicable
//! (sample, predictor) pair out.

pub mod engine;
pub mod fixture;
pub mod result;

pub use engine::{ConfigurationError, EvaluationEngine};
pub use fixture::{is_known_language, language_name, samples_from_config, LanguageSample, KNOWN_LANGUAGES};
pub use result::{decide, ComparisonRun, EvaluationResult, LanguageInfo, PredictorInfo, Verdict};
