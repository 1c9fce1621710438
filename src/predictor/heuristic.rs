//! Rule-based end-of-turn baseline.
//!
//! [`HeuristicPredictor`] needs no model and no network.  It looks only at
//! the last user turn:
//!
//! | Signal                                   | Probability |
//! |------------------------------------------|-------------|
//! | ends with `?` / `？`                      | 0.95        |
//! | ends with other terminal punctuation      | 0.90        |
//! | last word is a continuation word          | 0.10        |
//! | short fragment (≤ 2 words / ≤ 3 CJK chars)| 0.45        |
//! | anything else                             | 0.60        |
//!
//! It exists as a cheap reference row in the comparison, not as a serious
//! detector.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::config::PredictorConfig;
use crate::predictor::context::ChatContext;
use crate::predictor::detector::{check_context, EotPredictor, InferenceError};

const QUESTION_MARKS: &[char] = &['?', '？'];
const TERMINAL_PUNCTUATION: &[char] = &['.', '!', '。', '！', '…', '~'];

/// Words that, in final position, signal the speaker is not done.
struct ContinuationWords {
    /// Whitespace-delimited languages, compared case-insensitively.
    words: &'static [&'static str],
    /// Unsegmented scripts, compared as suffixes.
    suffixes: &'static [&'static str],
}

static CONTINUATIONS: &[ContinuationWords] = &[
    // en
    ContinuationWords {
        words: &[
            "and", "but", "or", "so", "because", "the", "a", "an", "to", "with", "my", "of",
            "for", "need", "want", "um", "uh",
        ],
        suffixes: &[],
    },
    // vi
    ContinuationWords {
        words: &[
            "và", "nhưng", "hoặc", "thì", "là", "của", "cần", "muốn", "để", "với", "đang", "về",
        ],
        suffixes: &[],
    },
    // zh
    ContinuationWords {
        words: &[],
        suffixes: &["的", "和", "但是", "因为", "所以", "我想", "我要", "在", "然后"],
    },
];

/// Thresholds used when the config provides none.
const DEFAULT_THRESHOLDS: &[(&str, f32)] = &[("en", 0.5), ("vi", 0.5), ("zh", 0.5)];

/// Punctuation- and keyword-driven baseline predictor.
///
/// # Example
/// ```rust
/// use eot_compare::predictor::{ChatContext, EotPredictor, HeuristicPredictor};
///
/// # let rt = tokio::runtime::Runtime::new().unwrap();
/// # rt.block_on(async {
/// let predictor = HeuristicPredictor::new();
/// let p = predictor.score(&ChatContext::from_user("Mình muốn")).await.unwrap();
/// assert!(p < 0.5);
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct HeuristicPredictor {
    thresholds: BTreeMap<String, f32>,
}

impl HeuristicPredictor {
    /// Baseline with the built-in thresholds.
    pub fn new() -> Self {
        Self {
            thresholds: DEFAULT_THRESHOLDS
                .iter()
                .map(|(tag, t)| (tag.to_string(), *t))
                .collect(),
        }
    }

    /// Baseline using `config.thresholds`, or the built-in table when empty.
    pub fn from_config(config: &PredictorConfig) -> Self {
        if config.thresholds.is_empty() {
            Self::new()
        } else {
            Self {
                thresholds: config.thresholds.clone(),
            }
        }
    }

    /// The scoring rule, exposed for direct use on plain text.
    pub fn probability_for(text: &str) -> f32 {
        let text = text.trim();
        if text.is_empty() {
            return 0.0;
        }

        if text.ends_with(QUESTION_MARKS) {
            return 0.95;
        }
        if text.ends_with(TERMINAL_PUNCTUATION) {
            return 0.90;
        }

        let lowered = text.to_lowercase();
        let last_word = lowered
            .split_whitespace()
            .last()
            .unwrap_or("")
            .trim_matches(|c: char| c == ',' || c == '，' || c == '、');

        let continues = CONTINUATIONS.iter().any(|c| {
            c.words.contains(&last_word) || c.suffixes.iter().any(|s| lowered.ends_with(s))
        });
        if continues || text.ends_with([',', '，', '、']) {
            return 0.10;
        }

        let is_short = if text.chars().any(is_cjk) {
            text.chars().filter(|c| !c.is_whitespace()).count() <= 3
        } else {
            text.split_whitespace().count() <= 2
        };
        if is_short {
            0.45
        } else {
            0.60
        }
    }
}

impl Default for HeuristicPredictor {
    fn default() -> Self {
        Self::new()
    }
}

fn is_cjk(c: char) -> bool {
    matches!(c as u32, 0x4E00..=0x9FFF | 0x3400..=0x4DBF | 0x3040..=0x30FF | 0xAC00..=0xD7AF)
}

#[async_trait]
impl EotPredictor for HeuristicPredictor {
    async fn score(&self, ctx: &ChatContext) -> Result<f32, InferenceError> {
        check_context(ctx)?;
        let text = ctx.last_user_text().unwrap_or_default();
        Ok(Self::probability_for(text))
    }

    async fn decision_threshold(&self, language: &str) -> Result<Option<f32>, InferenceError> {
        Ok(self.thresholds.get(language).copied())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn questions_score_highest() {
        assert_eq!(HeuristicPredictor::probability_for("Hello, how are you?"), 0.95);
        assert_eq!(HeuristicPredictor::probability_for("今天天气怎么样？"), 0.95);
        assert_eq!(HeuristicPredictor::probability_for("Xin chào, bạn khỏe không?"), 0.95);
    }

    #[test]
    fn terminal_punctuation_scores_high() {
        assert_eq!(HeuristicPredictor::probability_for("Thanks."), 0.90);
        assert_eq!(HeuristicPredictor::probability_for("好的。"), 0.90);
    }

    #[test]
    fn continuation_words_score_low() {
        assert_eq!(HeuristicPredictor::probability_for("Em đang cần"), 0.10);
        assert_eq!(HeuristicPredictor::probability_for("Mình muốn"), 0.10);
        assert_eq!(HeuristicPredictor::probability_for("I went there and"), 0.10);
        assert_eq!(HeuristicPredictor::probability_for("我觉得因为"), 0.10);
        assert_eq!(HeuristicPredictor::probability_for("So, um,"), 0.10);
    }

    #[test]
    fn short_fragments_are_uncertain() {
        assert_eq!(HeuristicPredictor::probability_for("Có nhé"), 0.45);
        assert_eq!(HeuristicPredictor::probability_for("Ok"), 0.45);
    }

    #[test]
    fn longer_unpunctuated_text_leans_complete() {
        assert_eq!(
            HeuristicPredictor::probability_for("I need help with my computer"),
            0.60
        );
        assert_eq!(HeuristicPredictor::probability_for("我需要电脑方面的帮助"), 0.60);
    }

    #[test]
    fn blank_text_scores_zero() {
        assert_eq!(HeuristicPredictor::probability_for("   "), 0.0);
    }

    #[tokio::test]
    async fn scoring_is_deterministic_and_bounded() {
        let predictor = HeuristicPredictor::new();
        for text in ["Vay ở đâu", "Ok", "你好，你好吗？", "Anh đang bận nhé, gọi lại sau cho anh"] {
            let ctx = ChatContext::from_user(text);
            let a = predictor.score(&ctx).await.unwrap();
            let b = predictor.score(&ctx).await.unwrap();
            assert_eq!(a.to_bits(), b.to_bits());
            assert!((0.0..=1.0).contains(&a));
        }
    }

    #[tokio::test]
    async fn empty_context_is_an_error() {
        let err = HeuristicPredictor::new()
            .score(&ChatContext::new())
            .await
            .unwrap_err();
        assert_eq!(err, InferenceError::EmptyContext);
    }

    #[tokio::test]
    async fn config_thresholds_override_defaults() {
        let config = PredictorConfig::heuristic("baseline", &[("vi", 0.3)]);
        let predictor = HeuristicPredictor::from_config(&config);
        assert_eq!(predictor.decision_threshold("vi").await, Ok(Some(0.3)));
        assert_eq!(predictor.decision_threshold("en").await, Ok(None));
    }

    #[tokio::test]
    async fn empty_config_thresholds_use_defaults() {
        let config = PredictorConfig::heuristic("baseline", &[]);
        let predictor = HeuristicPredictor::from_config(&config);
        assert_eq!(predictor.decision_threshold("zh").await, Ok(Some(0.5)));
        assert_eq!(predictor.decision_threshold("ja").await, Ok(None));
    }
}
