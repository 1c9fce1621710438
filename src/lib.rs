//! End-of-turn detector comparison harness.
//!
//! Runs a fixed set of multilingual utterances through several end-of-turn
//! predictors, records probability, latency and the thresholded decision for
//! every applicable (sample, predictor) pair, and reports the results side by
//! side.
//!
//! * [`config`]: `harness.toml` settings and platform paths.
//! * [`predictor`]: the [`predictor::EotPredictor`] trait and its backends.
//! * [`eval`]: fixtures, the evaluation engine and its result records.
//! * [`report`]: text and JSON rendering of a run.

pub mod config;
pub mod eval;
pub mod predictor;
pub mod report;
