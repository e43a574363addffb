//! Resolution of required template variables from cache or prompt.
use serde::Deserialize;

use crate::cache::Store;
use crate::error::PromptError;
use crate::prompt::AnswerProvider;

/// Declaration of a required variable and its resolution policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Requirement {
    /// Human-readable description shown in the prompt.
    pub description: String,
    /// Persist the answer to the cache.
    pub cacheable: bool,
    /// Reuse a cached answer when one exists.
    pub from_cache: bool,
}

impl Requirement {
    #[must_use]
    pub fn new(description: impl Into<String>, cacheable: bool, from_cache: bool) -> Self {
        Self {
            description: description.into(),
            cacheable,
            from_cache,
        }
    }
}

/// Format the prompt shown for a requirement description.
#[must_use]
pub fn question_for(description: &str) -> String {
    format!("Please enter {description}: ")
}

/// Resolves requirement values against a cache store and an answer provider.
pub struct Resolver<'a> {
    store: &'a dyn Store,
    answers: &'a dyn AnswerProvider,
}

impl std::fmt::Debug for Resolver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("store", &"<dyn Store>")
            .field("answers", &"<dyn AnswerProvider>")
            .finish()
    }
}

impl<'a> Resolver<'a> {
    #[must_use]
    pub fn new(store: &'a dyn Store, answers: &'a dyn AnswerProvider) -> Self {
        Self { store, answers }
    }

    /// Resolve `key`, returning the cached value when the policy allows it
    /// and prompting otherwise.
    ///
    /// Cache failures never abort resolution: an unreadable cache counts as
    /// a miss and a failed write only loses persistence of the answer.
    ///
    /// # Errors
    ///
    /// Returns an error if the user cannot be prompted or aborts input.
    pub fn resolve(&self, key: &str, requirement: &Requirement) -> Result<String, PromptError> {
        if requirement.from_cache {
            match self.store.get(key) {
                Ok(Some(value)) => {
                    tracing::debug!("{key}: using cached value");
                    return Ok(value);
                }
                Ok(None) => tracing::debug!("{key}: not cached"),
                Err(e) => tracing::warn!("{key}: ignoring unreadable cache ({e})"),
            }
        }

        let value = self.answers.ask(&question_for(&requirement.description))?;

        if requirement.cacheable {
            match self.store.write(key, &value) {
                Ok(()) => tracing::debug!("{key}: cached"),
                Err(e) => tracing::warn!("{key}: answer not cached ({e})"),
            }
        }
        Ok(value)
    }
}
