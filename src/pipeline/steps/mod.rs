//! The fixed set of named record transformations and the registry that
//! resolves configured step names against it.

pub mod categorize;
pub mod enrich;
pub mod normalize;
pub mod validate;

use crate::config::{UnknownStepPolicy, ValidationRules};
use crate::constants;
use crate::error::{ConfigError, StepError};
use crate::types::Record;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

pub use categorize::Category;

/// A single named transformation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKind {
    Validate,
    Normalize,
    Categorize,
    Enrich,
}

impl StepKind {
    pub const ALL: [StepKind; 4] = [
        StepKind::Validate,
        StepKind::Normalize,
        StepKind::Categorize,
        StepKind::Enrich,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StepKind::Validate => constants::VALIDATE_STEP,
            StepKind::Normalize => constants::NORMALIZE_STEP,
            StepKind::Categorize => constants::CATEGORIZE_STEP,
            StepKind::Enrich => constants::ENRICH_STEP,
        }
    }

    /// Apply this step to `record` in place.
    ///
    /// `value` is a public field, so every step first refuses a record whose
    /// value is no longer a finite number. Beyond that only validate can fail.
    pub fn apply(&self, record: &mut Record, rules: &ValidationRules) -> Result<(), StepError> {
        if !record.value.is_finite() {
            return Err(StepError::Runtime {
                step: self.as_str().to_string(),
                message: format!("value {} is not a finite number", record.value),
            });
        }

        match self {
            StepKind::Validate => validate::validate(record, rules)?,
            StepKind::Normalize => normalize::normalize(record),
            StepKind::Categorize => {
                categorize::categorize(record);
            }
            StepKind::Enrich => enrich::enrich(record),
        }
        Ok(())
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StepKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StepRegistry::global()
            .get(s)
            .ok_or_else(|| ConfigError::UnknownStep(s.to_string()))
    }
}

/// Name to step lookup table, built once
#[derive(Debug, Clone)]
pub struct StepRegistry {
    steps: HashMap<&'static str, StepKind>,
}

static GLOBAL_REGISTRY: Lazy<StepRegistry> = Lazy::new(StepRegistry::new);

impl StepRegistry {
    pub fn new() -> Self {
        let steps = StepKind::ALL.iter().map(|step| (step.as_str(), *step)).collect();
        Self { steps }
    }

    pub fn global() -> &'static StepRegistry {
        &GLOBAL_REGISTRY
    }

    pub fn get(&self, name: &str) -> Option<StepKind> {
        self.steps.get(name).copied()
    }

    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.steps.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Turn configured step names into an ordered plan.
    ///
    /// Order and duplicates are preserved. Unknown names are dropped with a
    /// warning under [`UnknownStepPolicy::Skip`] and rejected under
    /// [`UnknownStepPolicy::Error`].
    pub fn resolve<S: AsRef<str>>(
        &self,
        names: &[S],
        policy: UnknownStepPolicy,
    ) -> Result<Vec<StepKind>, ConfigError> {
        let mut plan = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            match (self.get(name), policy) {
                (Some(step), _) => plan.push(step),
                (None, UnknownStepPolicy::Skip) => {
                    warn!(
                        "Skipping unknown processing step '{}' (known steps: {})",
                        name,
                        self.names().join(", ")
                    );
                }
                (None, UnknownStepPolicy::Error) => {
                    return Err(ConfigError::UnknownStep(name.to_string()));
                }
            }
        }
        Ok(plan)
    }
}

impl Default for StepRegistry {
    fn default() -> Self {
        Self::new()
    }
}
