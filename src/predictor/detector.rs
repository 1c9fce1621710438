//! Core `EotPredictor` trait and its error type.
//!
//! Every end-of-turn model the harness compares is driven through this trait
//! and nothing else, whether it is a remote detector or the built-in baseline.

use async_trait::async_trait;
use thiserror::Error;

use crate::predictor::context::ChatContext;

// ---------------------------------------------------------------------------
// InferenceError
// ---------------------------------------------------------------------------

/// A predictor failed to produce a probability or threshold.
///
/// The evaluation engine contains these per measurement; they never abort a
/// run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InferenceError {
    /// `score` was called with no turns at all.
    #[error("conversation context is empty")]
    EmptyContext,

    /// The context is non-empty but unusable (e.g. last turn is not the user's).
    #[error("malformed conversation context: {0}")]
    MalformedContext(String),

    /// Backend could not be reached or answered with an error status.
    #[error("inference backend unavailable: {0}")]
    Unavailable(String),

    /// The call did not complete within the per-call timeout.
    #[error("inference timed out")]
    Timeout,

    /// The backend answered but the payload could not be interpreted.
    #[error("failed to parse inference response: {0}")]
    Parse(String),

    /// The backend produced a probability outside `[0, 1]`.
    #[error("probability {0} is outside [0, 1]")]
    OutOfRange(f32),
}

impl From<reqwest::Error> for InferenceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            InferenceError::Timeout
        } else if e.is_decode() {
            InferenceError::Parse(e.to_string())
        } else {
            InferenceError::Unavailable(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// EotPredictor trait
// ---------------------------------------------------------------------------

/// Capability contract every end-of-turn model satisfies.
///
/// Implementors must be `Send + Sync` so one instance can be shared behind an
/// `Arc<dyn EotPredictor>` across all samples it applies to.
#[async_trait]
pub trait EotPredictor: Send + Sync {
    /// Probability in `[0, 1]` that the user's turn has ended.
    ///
    /// `ctx` must be non-empty and end with a user turn.
    async fn score(&self, ctx: &ChatContext) -> Result<f32, InferenceError>;

    /// Probability cutoff for `language`, or `None` when the predictor has no
    /// calibrated threshold for it.  Must be free of side effects.
    async fn decision_threshold(&self, language: &str) -> Result<Option<f32>, InferenceError>;

    /// Whether the model is able to handle `language` at all.
    fn supports_language(&self, _language: &str) -> bool {
        true
    }
}

// Compile-time assertion: Box<dyn EotPredictor> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn EotPredictor>) {}
};

/// Validate the shape of `ctx` the way every backend expects it.
pub fn check_context(ctx: &ChatContext) -> Result<(), InferenceError> {
    if ctx.is_empty() {
        return Err(InferenceError::EmptyContext);
    }
    if !ctx.ends_with_user() {
        let role = ctx.last().map(|t| t.role.to_string()).unwrap_or_default();
        return Err(InferenceError::MalformedContext(format!(
            "last turn must be from the user, got {role}"
        )));
    }
    Ok(())
}

/// Reject probabilities outside `[0, 1]` (including NaN).
pub fn check_probability(p: f32) -> Result<f32, InferenceError> {
    if (0.0..=1.0).contains(&p) {
        Ok(p)
    } else {
        Err(InferenceError::OutOfRange(p))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predictor::context::ChatRole;

    struct Fixed(f32);

    #[async_trait]
    impl EotPredictor for Fixed {
        async fn score(&self, ctx: &ChatContext) -> Result<f32, InferenceError> {
            check_context(ctx)?;
            Ok(self.0)
        }

        async fn decision_threshold(&self, _language: &str) -> Result<Option<f32>, InferenceError> {
            Ok(Some(0.5))
        }
    }

    #[tokio::test]
    async fn default_supports_every_language() {
        let p = Fixed(0.3);
        assert!(p.supports_language("en"));
        assert!(p.supports_language("xx"));
    }

    #[tokio::test]
    async fn empty_context_is_rejected() {
        let p = Fixed(0.3);
        let err = p.score(&ChatContext::new()).await.unwrap_err();
        assert_eq!(err, InferenceError::EmptyContext);
    }

    #[tokio::test]
    async fn agent_terminated_context_is_malformed() {
        let mut ctx = ChatContext::from_user("hello");
        ctx.add_message(ChatRole::Agent, "hi there");
        let err = Fixed(0.3).score(&ctx).await.unwrap_err();
        assert!(matches!(err, InferenceError::MalformedContext(_)));
        assert!(err.to_string().contains("agent"));
    }

    #[test]
    fn probability_bounds_are_inclusive() {
        assert_eq!(check_probability(0.0), Ok(0.0));
        assert_eq!(check_probability(1.0), Ok(1.0));
        assert!(matches!(check_probability(1.01), Err(InferenceError::OutOfRange(_))));
        assert!(matches!(check_probability(-0.1), Err(InferenceError::OutOfRange(_))));
        assert!(check_probability(f32::NAN).is_err());
    }

    #[test]
    fn predictor_is_object_safe() {
        let _: Box<dyn EotPredictor> = Box::new(Fixed(0.1));
    }
}
