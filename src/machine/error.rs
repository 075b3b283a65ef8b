//! Machine dispatch error types.

use crate::core::HookError;
use thiserror::Error;

/// Errors surfaced by `can`, `transition`, and `try_transition`.
#[derive(Debug, Error)]
pub enum FsmError {
    /// No active child handled the event and no table descriptor's guard
    /// passed for the current state.
    #[error("machine '{machine}': event '{event}' not allowed from state '{state}'")]
    TransitionNotAllowed {
        machine: String,
        event: String,
        state: String,
    },

    /// A guard, lifecycle hook, or subscriber failed. The original error
    /// is kept as the source; state already updated by earlier pipeline
    /// steps stays updated.
    #[error("machine '{machine}': hook failed during '{event}': {source}")]
    Hook {
        machine: String,
        event: String,
        #[source]
        source: HookError,
    },
}

impl FsmError {
    /// Whether this is the not-allowed variant, the only failure
    /// `try_transition` converts into `Ok(false)`.
    pub fn is_not_allowed(&self) -> bool {
        matches!(self, Self::TransitionNotAllowed { .. })
    }
}
