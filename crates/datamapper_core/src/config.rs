//! Mapper configuration.

use serde::{Deserialize, Serialize};

/// When the mapper validates transfer values before storage conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationPolicy {
    /// Never validate automatically.
    Never,
    /// Validate types whose `requires_validation()` is `true`.
    #[default]
    Declared,
    /// Validate every transfer value.
    Always,
}

/// Behavior switches for one `DataMapper`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    pub validation: ValidationPolicy,
    /// Abort conversion when soft (log-only) validation fails.
    pub reject_invalid: bool,
}

impl MapperConfig {
    pub fn with_validation(mut self, validation: ValidationPolicy) -> Self {
        self.validation = validation;
        self
    }

    pub fn with_reject_invalid(mut self, reject_invalid: bool) -> Self {
        self.reject_invalid = reject_invalid;
        self
    }
}
