//! Wizard-level error taxonomy.
//!
//! Service-specific errors (`SttError`, `LlmError`, `ImageError`) stay in their
//! own modules; orchestrators collapse them into [`WizardError`] and from
//! there into the per-stage message strings stored in
//! [`WizardState`](crate::wizard::WizardState).

use thiserror::Error;

/// Every failure the wizard can surface to the user.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WizardError {
    /// An upstream artifact was absent when a stage was invoked.
    #[error("{0}")]
    MissingInput(&'static str),

    /// An external service threw or returned an explicit failure.
    #[error("{0}")]
    ServiceFailure(String),

    /// An upload was rejected (wrong type, too large, unreadable).
    #[error("{0}")]
    Validation(String),
}

impl WizardError {
    /// Human-readable message suitable for an error banner.
    pub fn message(&self) -> String {
        self.to_string()
    }
}
