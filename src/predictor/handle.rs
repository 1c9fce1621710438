//! Named, language-scoped predictor registrations.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;

use crate::predictor::detector::EotPredictor;

// ---------------------------------------------------------------------------
// LanguageScope
// ---------------------------------------------------------------------------

/// Which samples a registered predictor is applied to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LanguageScope {
    /// General multilingual predictor: evaluated for every sample.
    Any,
    /// Specialised predictor: evaluated only for these language tags.
    Only(BTreeSet<String>),
}

impl LanguageScope {
    /// Scope bound to exactly one language.
    pub fn single(tag: impl Into<String>) -> Self {
        LanguageScope::Only(BTreeSet::from([tag.into()]))
    }

    /// Build from an optional tag list; `None` means [`LanguageScope::Any`].
    pub fn from_tags<I, S>(tags: Option<I>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        match tags {
            None => LanguageScope::Any,
            Some(tags) => LanguageScope::Only(tags.into_iter().map(Into::into).collect()),
        }
    }

    pub fn applies_to(&self, language: &str) -> bool {
        match self {
            LanguageScope::Any => true,
            LanguageScope::Only(tags) => tags.contains(language),
        }
    }
}

impl std::fmt::Display for LanguageScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LanguageScope::Any => f.write_str("all languages"),
            LanguageScope::Only(tags) => {
                let list: Vec<&str> = tags.iter().map(String::as_str).collect();
                f.write_str(&list.join(", "))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// PredictorHandle
// ---------------------------------------------------------------------------

/// A predictor registered with the engine under a display name.
#[derive(Clone)]
pub struct PredictorHandle {
    name: String,
    description: String,
    scope: LanguageScope,
    predictor: Arc<dyn EotPredictor>,
}

impl PredictorHandle {
    /// Register `predictor` for every language.
    pub fn new(name: impl Into<String>, predictor: Arc<dyn EotPredictor>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            scope: LanguageScope::Any,
            predictor,
        }
    }

    pub fn with_scope(mut self, scope: LanguageScope) -> Self {
        self.scope = scope;
        self
    }

    /// Free-text coverage note shown in the report summary.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn scope(&self) -> &LanguageScope {
        &self.scope
    }

    pub fn predictor(&self) -> &Arc<dyn EotPredictor> {
        &self.predictor
    }

    pub fn applies_to(&self, language: &str) -> bool {
        self.scope.applies_to(language)
    }
}

impl std::fmt::Debug for PredictorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictorHandle")
            .field("name", &self.name)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}
