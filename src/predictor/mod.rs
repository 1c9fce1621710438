//! End-of-turn predictors.
//!
//! This module provides:
//! * [`EotPredictor`]: async trait every model is driven through.
//! * [`ChatContext`]: the dialogue a predictor scores.
//! * [`RemotePredictor`]: turn-detector model behind an HTTP inference server.
//! * [`HeuristicPredictor`]: punctuation/keyword baseline with no model.
//! * [`PredictorHandle`] / [`LanguageScope`]: named, language-scoped registrations.
//! * [`build_handles`]: registrations from `[[predictors]]` config entries.
//! * [`InferenceError`]: failures of a single scoring or threshold call.

pub mod context;
pub mod detector;
pub mod handle;
pub mod heuristic;
pub mod registry;
pub mod remote;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use context::{ChatContext, ChatRole, ChatTurn, DEFAULT_HISTORY_TURNS};
pub use detector::{check_context, check_probability, EotPredictor, InferenceError};
pub use handle::{LanguageScope, PredictorHandle};
pub use heuristic::HeuristicPredictor;
pub use registry::{build_handle, build_handles};
pub use remote::RemotePredictor;
