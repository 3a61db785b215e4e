//! Typed domain error enums.
//!
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator. Causes coming from adapters are carried as rendered
//! strings so the domain layer stays free of infrastructure types.

use std::fmt;

use thiserror::Error;

// ── Handoff errors ────────────────────────────────────────────────────────────

/// Fatal failures of a handoff run. None of them is retried.
#[derive(Debug, Error)]
pub enum HandoffError {
    #[error("cannot query status of '{service}': {reason}")]
    Query { service: String, reason: String },

    #[error("'{service}' did not accept the abort request: {reason}")]
    Abort { service: String, reason: String },

    #[error("failed to publish {object}: {reason}")]
    Publish { object: String, reason: String },

    #[error("'{service}' did not accept the launch request: {reason}")]
    Launch { service: String, reason: String },

    #[error("cancelled by operator before '{service}' was aborted")]
    Cancelled { service: String },
}

/// A step of the handoff state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    CoordinatingShutdown,
    PublishingArtifacts,
    BuildingDescriptor,
    PublishingDescriptor,
    Launching,
}

impl Step {
    /// Every step in the order a handoff run passes through them.
    pub const ALL: [Step; 5] = [
        Step::CoordinatingShutdown,
        Step::PublishingArtifacts,
        Step::BuildingDescriptor,
        Step::PublishingDescriptor,
        Step::Launching,
    ];

    /// One-based position of this step within [`Step::ALL`].
    #[must_use]
    pub fn number(self) -> usize {
        Self::ALL.iter().position(|s| *s == self).map_or(0, |i| i + 1)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::CoordinatingShutdown => "coordinating shutdown",
            Self::PublishingArtifacts => "publishing artifacts",
            Self::BuildingDescriptor => "building descriptor",
            Self::PublishingDescriptor => "publishing descriptor",
            Self::Launching => "launching",
        })
    }
}

/// A handoff run that stopped in the `Failed` state.
#[derive(Debug, Error)]
#[error("{step}: {error}")]
pub struct HandoffFailure {
    pub step: Step,
    #[source]
    pub error: HandoffError,
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to configuration validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing setting: {key}\n\nAdd it to ~/.ltm-handoff/config.yaml or the file named by LTM_HANDOFF_CONFIG.")]
    Missing { key: String },

    #[error("Invalid value for {key}: {value}\n\n{hint}")]
    InvalidValue {
        key: String,
        value: String,
        hint: String,
    },
}
