//! Configuration module for the EOT comparison harness.
//!
//! Provides `HarnessConfig` (top-level settings), sub-configs for the engine,
//! report, fixtures and predictors, `AppPaths` for cross-platform
//! directories, and TOML persistence via `HarnessConfig::load` /
//! `HarnessConfig::save`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{
    default_languages, default_predictors, EngineConfig, HarnessConfig, LanguageConfig,
    PredictorConfig, PredictorKind, ReportConfig, ReportFormat,
};
